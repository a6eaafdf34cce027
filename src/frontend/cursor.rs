use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{window, CssStyleDeclaration, Element, MouseEvent};
use yew::prelude::*;

use super::hooks::{media_query_matches, use_hover_press, UseHoverPressHandle};

/// Elements opt in to cursor affordances with this attribute; there is no
/// tag-name or role sniffing.
pub const INTERACTIVE_MARKER: &str = "data-interactive";

fn is_touch_device() -> bool {
    let Some(win) = window() else {
        return false;
    };

    win.navigator().max_touch_points() > 0 || media_query_matches("(pointer: coarse)")
}

fn body_style() -> Option<CssStyleDeclaration> {
    Some(window()?.document()?.body()?.style())
}

fn hide_native_cursor() {
    if let Some(style) = body_style() {
        let _ = style.set_property("cursor", "none");
    }
}

fn restore_native_cursor() {
    if let Some(style) = body_style() {
        let _ = style.remove_property("cursor");
    }
}

fn over_interactive_element(event: &MouseEvent) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.closest(&format!("[{INTERACTIVE_MARKER}]")).ok().flatten())
        .is_some()
}

fn attach_cursor_listeners(
    position: UseStateHandle<(f64, f64)>,
    hover_press: UseHoverPressHandle,
) -> Vec<EventListener> {
    let Some(document) = window().and_then(|win| win.document()) else {
        return Vec::new();
    };

    hide_native_cursor();

    let mut listeners = Vec::new();

    {
        let hover_press = hover_press.clone();
        listeners.push(EventListener::new(&document, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };

            position.set((f64::from(event.client_x()), f64::from(event.client_y())));
            hover_press.set_hovering(over_interactive_element(event));
        }));
    }

    listeners.push(EventListener::new(&document, "mousedown", move |_| {
        hover_press.press();
    }));

    listeners
}

/// Pointer-following cursor dot. Hides the native cursor while mounted and
/// restores it on teardown; on touch devices it attaches nothing and renders
/// nothing.
#[function_component(CustomCursor)]
pub fn custom_cursor() -> Html {
    let enabled = use_state_eq(|| !is_touch_device());
    let position = use_state_eq(|| (-100.0_f64, -100.0_f64));
    let hover_press = use_hover_press();

    // Re-evaluate when the pointer capability flips (convertibles).
    {
        let enabled = enabled.clone();
        use_effect_with((), move |_| {
            let query = window().and_then(|win| win.match_media("(pointer: coarse)").ok().flatten());
            let listener = query.map(|list| {
                EventListener::new(&list, "change", move |_| enabled.set(!is_touch_device()))
            });
            move || drop(listener)
        });
    }

    {
        let position = position.clone();
        let hover_press = hover_press.clone();
        use_effect_with(*enabled, move |enabled| {
            let listeners = enabled.then(|| attach_cursor_listeners(position, hover_press));
            move || {
                drop(listeners);
                restore_native_cursor();
            }
        });
    }

    if !*enabled {
        return Html::default();
    }

    let (x, y) = *position;
    let style = format!("--cursor-x: {x:.0}px; --cursor-y: {y:.0}px;");

    html! {
        <div
            class={classes!(
                "cursor-dot",
                hover_press.is_hovering().then_some("is-hovering"),
                hover_press.is_pressed().then_some("is-pressed"),
            )}
            style={style}
            aria-hidden="true"
        ></div>
    }
}
