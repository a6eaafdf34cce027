use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, ScrollBehavior, ScrollToOptions};
use yew::prelude::*;

use super::api::{ApiClient, FetchConfig};
use super::contact::{ContactForm, Submitter};
use super::hooks::{
    prefers_reduced_motion, use_category_filter, use_disclosure, use_reveal, use_scroll_position,
    RevealOptions, UseCategoryFilterHandle, use_toggle_set,
};
use super::media::FallbackImage;
use super::notify::{use_notify, Notification};
use super::theme::use_theme;
use crate::content::{self, Post, Project};
use crate::controls::{ALL_CATEGORY, CAROUSEL_INTERVAL_MS, SKELETON_MIN_MS};

#[function_component(NavBar)]
pub fn nav_bar() -> Html {
    let scroll = use_scroll_position();
    let menu = use_disclosure::<()>();
    let (theme, on_toggle_theme) = use_theme();

    let on_toggle_menu = {
        let menu = menu.clone();
        Callback::from(move |_| menu.toggle())
    };

    let close_menu = {
        let menu = menu.clone();
        Callback::from(move |_| menu.close())
    };

    html! {
        <header
            class={classes!(
                "site-nav",
                scroll.scrolled.then_some("is-condensed"),
                scroll.nav_hidden().then_some("is-hidden"),
            )}
        >
            <a class="brand" href="#top" data-interactive="">{"atelier"}</a>
            <button
                class="menu-toggle"
                type="button"
                data-interactive=""
                aria-expanded={menu.is_open().to_string()}
                aria-controls="site-menu"
                onclick={on_toggle_menu}
            >
                {"Menu"}
            </button>
            <nav id="site-menu" class={classes!("site-menu", menu.is_open().then_some("is-open"))}>
                { for [("#work", "Work"), ("#shop", "Shop"), ("#journal", "Journal"), ("#contact", "Contact")]
                    .iter()
                    .map(|(href, label)| html! {
                        <a href={*href} data-interactive="" onclick={close_menu.clone()}>{*label}</a>
                    }) }
            </nav>
            <button
                class="theme-toggle"
                type="button"
                data-interactive=""
                aria-label={theme.toggle_label()}
                aria-pressed={theme.pressed().to_string()}
                onclick={on_toggle_theme}
            >
                <span aria-hidden="true">{theme.icon()}</span>
            </button>
        </header>
    }
}

fn scroll_to_top() {
    let Some(win) = window() else {
        return;
    };

    let options = ScrollToOptions::new();
    options.set_top(0.0);
    options.set_behavior(if prefers_reduced_motion() {
        ScrollBehavior::Auto
    } else {
        ScrollBehavior::Smooth
    });
    win.scroll_to_with_scroll_to_options(&options);
}

#[function_component(BackToTop)]
pub fn back_to_top() -> Html {
    let scroll = use_scroll_position();
    let onclick = Callback::from(|_| scroll_to_top());

    html! {
        <button
            class={classes!("back-to-top", scroll.show_back_to_top.then_some("is-visible"))}
            type="button"
            data-interactive=""
            aria-hidden={(!scroll.show_back_to_top).to_string()}
            onclick={onclick}
        >
            {"↑"}
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct RevealSectionProps {
    pub id: AttrValue,
    pub title: AttrValue,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub children: Html,
}

#[function_component(RevealSection)]
pub fn reveal_section(props: &RevealSectionProps) -> Html {
    let node = use_node_ref();
    let visible = use_reveal(node.clone(), RevealOptions::default());
    let heading_id = format!("{}-heading", props.id);

    html! {
        <section
            id={props.id.clone()}
            ref={node}
            class={classes!("section", "reveal", visible.then_some("is-revealed"), props.class.clone())}
            aria-labelledby={heading_id.clone()}
        >
            <h2 id={heading_id}>{props.title.clone()}</h2>
            { props.children.clone() }
        </section>
    }
}

#[function_component(Hero)]
pub fn hero() -> Html {
    let node = use_node_ref();
    let visible = use_reveal(node.clone(), RevealOptions::default());

    html! {
        <section id="top" ref={node} class={classes!("hero", "reveal", visible.then_some("is-revealed"))}>
            <h1>{"A small studio for brands that read well."}</h1>
            <p class="lede">{"Identity, web, and motion for people who sweat the details."}</p>
            <a class="cta" href="#contact" data-interactive="">{"Start a project"}</a>
        </section>
    }
}

struct SlideIndex(usize);

enum SlideAction {
    Advance,
    Jump(usize),
}

impl Reducible for SlideIndex {
    type Action = SlideAction;

    fn reduce(self: Rc<Self>, action: SlideAction) -> Rc<Self> {
        let len = content::HIGHLIGHTS.len();
        match action {
            SlideAction::Advance => Rc::new(Self((self.0 + 1) % len)),
            SlideAction::Jump(slide) => Rc::new(Self(slide % len)),
        }
    }
}

/// Quote carousel. Autoplay runs only while the element is on screen and
/// motion is allowed; dropping the interval handle stops it.
#[function_component(Carousel)]
pub fn carousel() -> Html {
    let node = use_node_ref();
    let visible = use_reveal(
        node.clone(),
        RevealOptions {
            root_margin: "0px".to_string(),
            threshold: 0.4,
            trigger_once: false,
        },
    );
    let index = use_reducer(|| SlideIndex(0));

    {
        let dispatcher = index.dispatcher();
        use_effect_with(visible, move |visible| {
            let autoplay = (*visible && !prefers_reduced_motion()).then(|| {
                Interval::new(CAROUSEL_INTERVAL_MS, move || {
                    dispatcher.dispatch(SlideAction::Advance)
                })
            });
            move || drop(autoplay)
        });
    }

    let current = index.0;
    let highlight = &content::HIGHLIGHTS[current];

    html! {
        <div ref={node} class="carousel" aria-roledescription="carousel">
            <blockquote class="carousel-slide">
                <p>{highlight.quote}</p>
                <footer>{highlight.author}</footer>
            </blockquote>
            <div class="carousel-dots" role="tablist">
                { for (0..content::HIGHLIGHTS.len()).map(|slide| {
                    let dispatcher = index.dispatcher();
                    html! {
                        <button
                            type="button"
                            role="tab"
                            data-interactive=""
                            class={classes!("dot", (slide == current).then_some("is-active"))}
                            aria-selected={(slide == current).to_string()}
                            aria-label={format!("Slide {}", slide + 1)}
                            onclick={Callback::from(move |_| dispatcher.dispatch(SlideAction::Jump(slide)))}
                        ></button>
                    }
                }) }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct FilterChipsProps {
    pub categories: &'static [&'static str],
    pub filter: UseCategoryFilterHandle,
}

#[function_component(FilterChips)]
pub fn filter_chips(props: &FilterChipsProps) -> Html {
    let chips = std::iter::once(ALL_CATEGORY).chain(props.categories.iter().copied());

    html! {
        <div class="filter-chips" role="group" aria-label="Filter by category">
            { for chips.map(|category| {
                let filter = props.filter.clone();
                let onclick = Callback::from(move |_| filter.select(category));
                html! {
                    <button
                        type="button"
                        data-interactive=""
                        class={classes!("chip", props.filter.is_selected(category).then_some("is-active"))}
                        aria-pressed={props.filter.is_selected(category).to_string()}
                        onclick={onclick}
                    >
                        {category}
                    </button>
                }
            }) }
        </div>
    }
}

#[function_component(WorkSection)]
pub fn work_section() -> Html {
    let filter = use_category_filter();
    let detail = use_disclosure::<Project>();
    let projects = filter.apply(content::PROJECTS, |project| project.category);

    let close_detail = {
        let detail = detail.clone();
        Callback::from(move |_| detail.close())
    };

    html! {
        <>
            <FilterChips categories={content::PROJECT_CATEGORIES} filter={filter.clone()} />
            if projects.is_empty() {
                <p class="empty-state">{"Nothing in this category yet."}</p>
            } else {
                <ul class="card-grid">
                    { for projects.iter().map(|project| {
                        let on_open = {
                            let detail = detail.clone();
                            let project = **project;
                            Callback::from(move |_| detail.open_with(project))
                        };
                        html! {
                            <li class="card" key={project.title}>
                                <FallbackImage src={project.image} alt={format!("{} preview", project.title)} />
                                <h3>
                                    <button type="button" class="card-link" data-interactive="" onclick={on_open}>
                                        {project.title}
                                    </button>
                                </h3>
                                <p class="muted">{project.summary}</p>
                                <span class="tag">{project.category}</span>
                            </li>
                        }
                    }) }
                </ul>
            }
            if detail.is_open() {
                if let Some(project) = detail.payload() {
                    <div class="modal-backdrop" onclick={close_detail.clone()}>
                        <div
                            class="modal"
                            role="dialog"
                            aria-modal="true"
                            aria-label={project.title}
                            onclick={Callback::from(|event: MouseEvent| event.stop_propagation())}
                        >
                            <FallbackImage src={project.image} alt={format!("{} preview", project.title)} />
                            <h3>{project.title}</h3>
                            <p>{project.summary}</p>
                            <a href={project.url} data-interactive="" target="_blank" rel="noopener noreferrer">
                                {"Visit project"}
                            </a>
                            <button type="button" class="modal-close" data-interactive="" onclick={close_detail}>
                                {"Close"}
                            </button>
                        </div>
                    </div>
                }
            }
        </>
    }
}

#[function_component(ShopSection)]
pub fn shop_section() -> Html {
    let filter = use_category_filter();
    let likes = use_toggle_set();
    let wishlist = use_toggle_set();
    let notify = use_notify();
    let products = filter.apply(content::PRODUCTS, |product| product.category);

    html! {
        <>
            <div class="shop-bar">
                <FilterChips categories={content::PRODUCT_CATEGORIES} filter={filter.clone()} />
                if !wishlist.is_empty() {
                    <span class="muted">{format!("Wishlist ({})", wishlist.len())}</span>
                }
            </div>
            if products.is_empty() {
                <p class="empty-state">{"Nothing in this category yet."}</p>
            } else {
                <ul class="card-grid">
                    { for products.iter().map(|product| {
                        let liked = likes.contains(product.id);
                        let saved = wishlist.contains(product.id);
                        let on_like = {
                            let likes = likes.clone();
                            let id = product.id;
                            Callback::from(move |_| likes.toggle(id))
                        };
                        let on_save = {
                            let wishlist = wishlist.clone();
                            let notify = notify.clone();
                            let id = product.id;
                            let name = product.name;
                            Callback::from(move |_| {
                                if !wishlist.contains(id) {
                                    notify.push(Notification::info(format!("Saved {name} to your wishlist")));
                                }
                                wishlist.toggle(id);
                            })
                        };
                        html! {
                            <li class="card" key={product.id}>
                                <FallbackImage src={product.image} alt={product.name} />
                                <h3>{product.name}</h3>
                                <p class="price">{content::format_price(product.price_cents)}</p>
                                <div class="card-actions">
                                    <button
                                        type="button"
                                        data-interactive=""
                                        class={classes!("like", liked.then_some("is-liked"))}
                                        aria-pressed={liked.to_string()}
                                        aria-label={format!("Like {}", product.name)}
                                        onclick={on_like}
                                    >
                                        {"♥"}
                                    </button>
                                    <button
                                        type="button"
                                        data-interactive=""
                                        class={classes!("save", saved.then_some("is-saved"))}
                                        aria-pressed={saved.to_string()}
                                        onclick={on_save}
                                    >
                                        { if saved { "Saved" } else { "Save" } }
                                    </button>
                                </div>
                            </li>
                        }
                    }) }
                </ul>
            }
        </>
    }
}

#[derive(PartialEq)]
enum JournalPhase {
    Loading,
    Ready(Vec<Post>),
    Failed,
}

#[function_component(JournalSection)]
pub fn journal_section() -> Html {
    let client = use_context::<ApiClient>();
    let phase = use_state(|| JournalPhase::Loading);
    let reveal_timer = use_mut_ref(|| None::<Timeout>);

    {
        let phase = phase.clone();
        let reveal_timer = reveal_timer.clone();
        use_effect_with(client.clone(), move |client| {
            if let Some(client) = client.clone() {
                let started_at = js_sys::Date::now();
                spawn_local(async move {
                    let result = client
                        .fetch::<Vec<Post>>(
                            FetchConfig::get("/posts")
                                .param("per_page", "6")
                                .param("_embed", "1")
                                .cached(),
                        )
                        .await;

                    let (next, cached) = match result {
                        Ok(outcome) => (JournalPhase::Ready(outcome.data), outcome.cached),
                        Err(_) => (JournalPhase::Failed, false),
                    };

                    // The skeleton stays up for its minimum display window,
                    // except when the payload came straight from the cache.
                    let remaining = if cached {
                        0.0
                    } else {
                        SKELETON_MIN_MS - (js_sys::Date::now() - started_at)
                    };
                    if remaining > 0.0 {
                        let timer = {
                            let phase = phase.clone();
                            let slot = reveal_timer.clone();
                            Timeout::new(remaining as u32, move || {
                                phase.set(next);
                                slot.borrow_mut().take();
                            })
                        };
                        *reveal_timer.borrow_mut() = Some(timer);
                    } else {
                        phase.set(next);
                    }
                });
            }
            || ()
        });
    }

    {
        let reveal_timer = reveal_timer.clone();
        use_effect_with((), move |_| {
            move || {
                reveal_timer.borrow_mut().take();
            }
        });
    }

    match &*phase {
        JournalPhase::Loading => html! {
            <ul class="card-grid" aria-hidden="true">
                { for (0..3).map(|index: u32| html! { <li class="card skeleton" key={index.to_string()}></li> }) }
            </ul>
        },
        JournalPhase::Failed => html! {
            <p class="empty-state">{"The journal is unavailable right now."}</p>
        },
        JournalPhase::Ready(posts) if posts.is_empty() => html! {
            <p class="empty-state">{"No entries yet."}</p>
        },
        JournalPhase::Ready(posts) => html! {
            <ul class="card-grid">
                { for posts.iter().map(|post| {
                    let title = Html::from_html_unchecked(AttrValue::from(post.title.rendered.clone()));
                    let excerpt = Html::from_html_unchecked(AttrValue::from(post.excerpt.rendered.clone()));
                    let day = post.date.split('T').next().unwrap_or(post.date.as_str());
                    html! {
                        <li class="card" key={post.id.to_string()}>
                            if let Some(image) = post.jetpack_featured_media_url.clone() {
                                <FallbackImage src={image} alt="" />
                            }
                            <h3>{title}</h3>
                            <p class="muted">
                                {day.to_string()}
                                if let Some(minutes) = post.acf.as_ref().and_then(|extras| extras.reading_minutes) {
                                    {format!(" · {minutes} min read")}
                                }
                            </p>
                            <div class="excerpt">{excerpt}</div>
                        </li>
                    }
                }) }
            </ul>
        },
    }
}

#[derive(Properties, PartialEq)]
pub struct ContactSectionProps {
    pub submitter: Submitter,
}

#[function_component(ContactSection)]
pub fn contact_section(props: &ContactSectionProps) -> Html {
    html! {
        <div class="contact-layout">
            <p class="lede">{"Tell us about the project. We reply within two working days."}</p>
            <ContactForm submitter={props.submitter.clone()} />
        </div>
    }
}
