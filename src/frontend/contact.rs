use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use serde::Serialize;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::controls::{SubmitStatus, SUBMIT_RESET_MS};

#[derive(Clone, PartialEq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub type SubmitFuture = Pin<Box<dyn Future<Output = Result<(), String>>>>;

/// Transport seam for form submission. The endpoint contract is owned
/// outside this crate; the app wires an implementation in at mount.
#[derive(Clone)]
pub struct Submitter(Rc<dyn Fn(ContactMessage) -> SubmitFuture>);

impl Submitter {
    pub fn new(send: impl Fn(ContactMessage) -> SubmitFuture + 'static) -> Self {
        Self(Rc::new(send))
    }

    pub fn send(&self, message: ContactMessage) -> SubmitFuture {
        (self.0)(message)
    }
}

impl PartialEq for Submitter {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Properties, PartialEq)]
pub struct ContactFormProps {
    pub submitter: Submitter,
}

#[function_component(ContactForm)]
pub fn contact_form(props: &ContactFormProps) -> Html {
    let name = use_state(String::new);
    let email = use_state(String::new);
    let message = use_state(String::new);
    let status = use_state_eq(|| SubmitStatus::Idle);
    let error = use_state_eq(|| None::<String>);
    let reset_timer = use_mut_ref(|| None::<Timeout>);

    {
        let reset_timer = reset_timer.clone();
        use_effect_with((), move |_| {
            move || {
                // Unmount cancels a pending auto-reset.
                reset_timer.borrow_mut().take();
            }
        });
    }

    let onsubmit = {
        let name = name.clone();
        let email = email.clone();
        let message = message.clone();
        let status = status.clone();
        let error = error.clone();
        let reset_timer = reset_timer.clone();
        let submitter = props.submitter.clone();

        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();

            if status.in_flight() {
                return;
            }

            let payload = ContactMessage {
                name: (*name).clone(),
                email: (*email).clone(),
                message: (*message).clone(),
            };

            status.set(SubmitStatus::Sending);
            error.set(None);

            let name = name.clone();
            let email = email.clone();
            let message = message.clone();
            let status = status.clone();
            let error = error.clone();
            let reset_timer = reset_timer.clone();
            let submitter = submitter.clone();

            spawn_local(async move {
                match submitter.send(payload).await {
                    Ok(()) => {
                        status.set(SubmitStatus::Sent);
                        name.set(String::new());
                        email.set(String::new());
                        message.set(String::new());
                    }
                    Err(text) => {
                        status.set(SubmitStatus::Failed);
                        error.set(Some(text));

                        let reset = {
                            let status = status.clone();
                            let error = error.clone();
                            let slot = reset_timer.clone();
                            Timeout::new(SUBMIT_RESET_MS, move || {
                                status.set(SubmitStatus::Idle);
                                error.set(None);
                                slot.borrow_mut().take();
                            })
                        };
                        *reset_timer.borrow_mut() = Some(reset);
                    }
                }
            });
        })
    };

    let oninput_name = {
        let name = name.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            name.set(input.value());
        })
    };

    let oninput_email = {
        let email = email.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            email.set(input.value());
        })
    };

    let oninput_message = {
        let message = message.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlTextAreaElement = event.target_unchecked_into();
            message.set(input.value());
        })
    };

    html! {
        <form class="contact-form" onsubmit={onsubmit}>
            <label>
                {"Name"}
                <input type="text" required=true value={(*name).clone()} oninput={oninput_name} />
            </label>
            <label>
                {"Email"}
                <input type="email" required=true value={(*email).clone()} oninput={oninput_email} />
            </label>
            <label>
                {"Message"}
                <textarea required=true value={(*message).clone()} oninput={oninput_message} />
            </label>
            <button type="submit" data-interactive="" disabled={status.in_flight()}>
                { if status.in_flight() { "Sending…" } else { "Send message" } }
            </button>
            if *status == SubmitStatus::Sent {
                <p class="form-note is-success" role="status">{"Thanks — we will be in touch."}</p>
            }
            if *status == SubmitStatus::Failed {
                <div class="form-note is-error" role="alert">
                    <p>{ error.as_deref().unwrap_or("something went wrong").to_string() }</p>
                </div>
            }
        </form>
    }
}
