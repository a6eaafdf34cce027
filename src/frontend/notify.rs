use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use yew::prelude::*;

use crate::controls::NOTIFICATION_DISMISS_MS;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

impl NotificationLevel {
    fn class(self) -> &'static str {
        match self {
            Self::Info => "is-info",
            Self::Error => "is-error",
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct NotifyHandle {
    push: Callback<Notification>,
}

impl NotifyHandle {
    pub fn push(&self, notification: Notification) {
        self.push.emit(notification);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push.emit(Notification::error(message));
    }

    pub fn noop() -> Self {
        Self {
            push: Callback::noop(),
        }
    }
}

#[hook]
pub fn use_notify() -> NotifyHandle {
    use_context::<NotifyHandle>().unwrap_or_else(NotifyHandle::noop)
}

#[derive(Clone, PartialEq)]
struct Toast {
    id: u64,
    notification: Notification,
}

#[derive(Default, PartialEq)]
struct ToastStack {
    toasts: Vec<Toast>,
}

enum ToastAction {
    Push(u64, Notification),
    Dismiss(u64),
}

impl Reducible for ToastStack {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: ToastAction) -> Rc<Self> {
        let mut toasts = self.toasts.clone();
        match action {
            ToastAction::Push(id, notification) => toasts.push(Toast { id, notification }),
            ToastAction::Dismiss(id) => toasts.retain(|toast| toast.id != id),
        }
        Rc::new(Self { toasts })
    }
}

#[derive(Properties, PartialEq)]
pub struct NotificationHostProps {
    #[prop_or_default]
    pub children: Html,
}

#[function_component(NotificationHost)]
pub fn notification_host(props: &NotificationHostProps) -> Html {
    let stack = use_reducer(ToastStack::default);
    let next_id = use_mut_ref(|| 0u64);
    let timers = use_mut_ref(HashMap::<u64, Timeout>::new);

    let push = {
        let dispatcher = stack.dispatcher();
        let timers = timers.clone();
        use_callback((), move |notification: Notification, _: &()| {
            let id = {
                let mut counter = next_id.borrow_mut();
                *counter += 1;
                *counter
            };

            dispatcher.dispatch(ToastAction::Push(id, notification));

            let dismiss = {
                let dispatcher = dispatcher.clone();
                let timers = timers.clone();
                Timeout::new(NOTIFICATION_DISMISS_MS, move || {
                    dispatcher.dispatch(ToastAction::Dismiss(id));
                    timers.borrow_mut().remove(&id);
                })
            };
            timers.borrow_mut().insert(id, dismiss);
        })
    };

    {
        let timers = timers.clone();
        use_effect_with((), move |_| {
            move || {
                // Unmount cancels every pending auto-dismiss.
                timers.borrow_mut().clear();
            }
        });
    }

    let handle = NotifyHandle { push };

    html! {
        <ContextProvider<NotifyHandle> context={handle}>
            { props.children.clone() }
            <div class="notification-stack" aria-live="polite">
                { for stack.toasts.iter().map(|toast| {
                    let ondismiss = {
                        let dispatcher = stack.dispatcher();
                        let timers = timers.clone();
                        let id = toast.id;
                        Callback::from(move |_| {
                            dispatcher.dispatch(ToastAction::Dismiss(id));
                            timers.borrow_mut().remove(&id);
                        })
                    };
                    html! {
                        <div
                            key={toast.id.to_string()}
                            class={classes!("notification", toast.notification.level.class())}
                            role="status"
                            onclick={ondismiss}
                        >
                            { toast.notification.message.clone() }
                        </div>
                    }
                }) }
            </div>
        </ContextProvider<NotifyHandle>>
    }
}
