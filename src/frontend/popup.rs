use gloo_timers::callback::Timeout;
use web_sys::{window, Storage};
use yew::prelude::*;

use super::hooks::use_disclosure;
use crate::controls::POPUP_SHOW_DELAY_MS;

const POPUP_DISMISSED_KEY: &str = "atelier-popup-dismissed";

fn session_storage() -> Option<Storage> {
    window()?.session_storage().ok().flatten()
}

fn already_dismissed_this_session() -> bool {
    session_storage()
        .and_then(|storage| storage.get_item(POPUP_DISMISSED_KEY).ok().flatten())
        .is_some()
}

fn remember_dismissed() {
    if let Some(storage) = session_storage() {
        let _ = storage.set_item(POPUP_DISMISSED_KEY, "1");
    }
}

/// Studio-notes signup teaser. Appears once per browser session after a
/// fixed delay; unmounting before the delay fires cancels it.
#[function_component(PromoPopup)]
pub fn promo_popup() -> Html {
    let disclosure = use_disclosure::<()>();

    {
        let disclosure = disclosure.clone();
        use_effect_with((), move |_| {
            let timer = (!already_dismissed_this_session())
                .then(|| Timeout::new(POPUP_SHOW_DELAY_MS, move || disclosure.open()));
            move || drop(timer)
        });
    }

    let on_dismiss = {
        let disclosure = disclosure.clone();
        Callback::from(move |_| {
            remember_dismissed();
            disclosure.close();
        })
    };

    if !disclosure.is_open() {
        return Html::default();
    }

    html! {
        <aside class="promo-popup" role="dialog" aria-label="Studio notes signup">
            <p>{"Studio notes, four times a year. No launches, no noise."}</p>
            <a class="cta" href="#contact" data-interactive="" onclick={on_dismiss.clone()}>
                {"Get in touch"}
            </a>
            <button type="button" class="popup-dismiss" data-interactive="" onclick={on_dismiss}>
                {"No thanks"}
            </button>
        </aside>
    }
}
