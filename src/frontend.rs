mod api;
mod contact;
mod cursor;
mod hooks;
mod media;
mod notify;
mod pages;
mod popup;
mod theme;

use web_sys::window;
use yew::prelude::*;

use crate::request_cache::ResponseCache;

use api::{api_base, ApiClient, FetchConfig};
use contact::{ContactMessage, Submitter};
use cursor::CustomCursor;
use notify::{use_notify, NotificationHost};
use pages::{
    BackToTop, Carousel, ContactSection, Hero, JournalSection, NavBar, RevealSection, ShopSection,
    WorkSection,
};
use popup::PromoPopup;

#[function_component(App)]
fn app() -> Html {
    html! {
        <NotificationHost>
            <Site />
        </NotificationHost>
    }
}

#[function_component(Site)]
fn site() -> Html {
    let notify = use_notify();
    let client = use_state(move || ApiClient::new(api_base(), ResponseCache::bounded_default(), notify));
    let submitter = {
        let client = (*client).clone();
        use_memo((), move |_| contact_submitter(client))
    };

    html! {
        <ContextProvider<ApiClient> context={(*client).clone()}>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <CustomCursor />
            <NavBar />
            <main id="content">
                <Hero />
                <RevealSection id="studio" title="Studio">
                    <p>
                        {"We are a three-person studio working on identity, web, and motion. \
                          Small roster, long engagements."}
                    </p>
                    <Carousel />
                </RevealSection>
                <RevealSection id="work" title="Selected work">
                    <WorkSection />
                </RevealSection>
                <RevealSection id="shop" title="Shop">
                    <ShopSection />
                </RevealSection>
                <RevealSection id="journal" title="Journal">
                    <JournalSection />
                </RevealSection>
                <RevealSection id="contact" title="Contact">
                    <ContactSection submitter={(*submitter).clone()} />
                </RevealSection>
            </main>
            <footer class="site-footer">
                <p class="muted">{"© 2026 Atelier Studio"}</p>
            </footer>
            <BackToTop />
            <PromoPopup />
        </ContextProvider<ApiClient>>
    }
}

// The submission endpoint contract is external; its failure shows in the
// form's own panel, so the call opts out of the toast.
fn contact_submitter(client: ApiClient) -> Submitter {
    Submitter::new(move |message: ContactMessage| {
        let client = client.clone();
        Box::pin(async move {
            let Some(endpoint) = option_env!("CONTACT_FORM_URL") else {
                return Err("contact submissions are not configured for this build".to_string());
            };

            let body = serde_json::to_string(&message)
                .map_err(|_| "failed to encode the message".to_string())?;

            client
                .submit(FetchConfig::post(endpoint, body).quiet())
                .await
                .map_err(|error| error.message)?;

            Ok(())
        })
    })
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
