use yew::prelude::*;

pub const PLACEHOLDER_IMAGE: &str = "/assets/placeholder.svg";

#[derive(Properties, PartialEq)]
pub struct FallbackImageProps {
    pub src: AttrValue,
    pub alt: AttrValue,
    #[prop_or(AttrValue::Static(PLACEHOLDER_IMAGE))]
    pub fallback: AttrValue,
    #[prop_or_default]
    pub class: Classes,
}

/// Image that degrades to a placeholder asset on load failure. The swap
/// happens once per source; a broken placeholder is left alone.
#[function_component(FallbackImage)]
pub fn fallback_image(props: &FallbackImageProps) -> Html {
    let failed = use_state_eq(|| false);

    {
        let failed = failed.clone();
        use_effect_with(props.src.clone(), move |_| failed.set(false));
    }

    let onerror = {
        let failed = failed.clone();
        Callback::from(move |_| {
            if !*failed {
                failed.set(true);
            }
        })
    };

    let src = if *failed {
        props.fallback.clone()
    } else {
        props.src.clone()
    };

    html! {
        <figure class={classes!("media", props.class.clone())}>
            <img src={src} alt={props.alt.clone()} loading="lazy" onerror={onerror} />
            if *failed {
                <figcaption class="media-note">{"image failed to load"}</figcaption>
            }
        </figure>
    }
}
