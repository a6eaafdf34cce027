use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    window, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};
use yew::prelude::*;

use crate::controls::{CategoryFilter, Disclosure, RevealState, ScrollModel, ToggleSet, PRESS_PULSE_MS};

pub fn media_query_matches(query: &str) -> bool {
    window()
        .and_then(|win| win.match_media(query).ok().flatten())
        .map(|list| list.matches())
        .unwrap_or(false)
}

pub fn prefers_reduced_motion() -> bool {
    media_query_matches("(prefers-reduced-motion: reduce)")
}

fn current_scroll_y() -> f64 {
    window().and_then(|win| win.scroll_y().ok()).unwrap_or(0.0)
}

pub struct UseDisclosureHandle<T: Clone + PartialEq + 'static> {
    state: UseStateHandle<Disclosure<T>>,
}

impl<T: Clone + PartialEq + 'static> Clone for UseDisclosureHandle<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> PartialEq for UseDisclosureHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl<T: Clone + PartialEq + 'static> UseDisclosureHandle<T> {
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn payload(&self) -> Option<T> {
        self.state.payload().cloned()
    }

    pub fn open(&self) {
        self.apply(Disclosure::open);
    }

    pub fn open_with(&self, payload: T) {
        self.apply(move |disclosure| disclosure.open_with(payload));
    }

    pub fn close(&self) {
        self.apply(Disclosure::close);
    }

    pub fn toggle(&self) {
        self.apply(Disclosure::toggle);
    }

    fn apply(&self, mutate: impl FnOnce(&mut Disclosure<T>)) {
        let mut next = (*self.state).clone();
        mutate(&mut next);
        self.state.set(next);
    }
}

#[hook]
pub fn use_disclosure<T>() -> UseDisclosureHandle<T>
where
    T: Clone + PartialEq + 'static,
{
    let state = use_state(Disclosure::default);
    UseDisclosureHandle { state }
}

impl Reducible for ScrollModel {
    type Action = f64;

    fn reduce(self: Rc<Self>, y: f64) -> Rc<Self> {
        let mut next = *self;
        next.observe(y);
        if next == *self {
            self
        } else {
            Rc::new(next)
        }
    }
}

/// Window scroll booleans. The listener is passive and removed on teardown;
/// two instances of this hook are fully independent.
#[hook]
pub fn use_scroll_position() -> ScrollModel {
    let model = use_reducer_eq(|| ScrollModel::at(current_scroll_y()));

    {
        let dispatcher = model.dispatcher();
        use_effect_with((), move |_| {
            let listener = window().map(|win| {
                EventListener::new(&win, "scroll", move |_| dispatcher.dispatch(current_scroll_y()))
            });
            move || drop(listener)
        });
    }

    *model
}

#[derive(Clone, PartialEq)]
pub struct RevealOptions {
    pub root_margin: String,
    pub threshold: f64,
    pub trigger_once: bool,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            root_margin: "0px".to_string(),
            threshold: 0.15,
            trigger_once: true,
        }
    }
}

pub enum RevealAction {
    Notify(bool),
    Reset(bool),
}

impl Reducible for RevealState {
    type Action = RevealAction;

    fn reduce(self: Rc<Self>, action: RevealAction) -> Rc<Self> {
        match action {
            RevealAction::Notify(intersecting) => {
                let mut next = *self;
                next.observe(intersecting);
                if next == *self {
                    self
                } else {
                    Rc::new(next)
                }
            }
            RevealAction::Reset(trigger_once) => Rc::new(RevealState::new(trigger_once)),
        }
    }
}

struct RevealObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl RevealObserver {
    fn attach(
        element: &Element,
        options: &RevealOptions,
        dispatcher: UseReducerDispatcher<RevealState>,
    ) -> Option<Self> {
        let trigger_once = options.trigger_once;
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                let Ok(entry) = entries.get(0).dyn_into::<IntersectionObserverEntry>() else {
                    return;
                };

                let intersecting = entry.is_intersecting();
                dispatcher.dispatch(RevealAction::Notify(intersecting));

                // Once latched the flag can never clear again.
                if trigger_once && intersecting {
                    observer.unobserve(&entry.target());
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin);
        init.set_threshold(&JsValue::from_f64(options.threshold));

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init).ok()?;
        observer.observe(element);

        Some(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for RevealObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Visibility of the element behind `node`, driven by an intersection
/// observer. The observer is rebuilt when the options value changes and
/// disconnected on teardown.
#[hook]
pub fn use_reveal(node: NodeRef, options: RevealOptions) -> bool {
    let trigger_once = options.trigger_once;
    let state = use_reducer_eq(move || RevealState::new(trigger_once));
    let visible = state.visible;

    {
        let dispatcher = state.dispatcher();
        let current_trigger_once = state.trigger_once();
        use_effect_with((node, options), move |(node, options)| {
            if current_trigger_once != options.trigger_once {
                dispatcher.dispatch(RevealAction::Reset(options.trigger_once));
            }

            let observer = node
                .cast::<Element>()
                .and_then(|element| RevealObserver::attach(&element, options, dispatcher.clone()));
            move || drop(observer)
        });
    }

    visible
}

pub struct UseHoverPressHandle {
    hovering: UseStateHandle<bool>,
    pressed: UseStateHandle<bool>,
    pulse: Rc<RefCell<Option<Timeout>>>,
}

impl Clone for UseHoverPressHandle {
    fn clone(&self) -> Self {
        Self {
            hovering: self.hovering.clone(),
            pressed: self.pressed.clone(),
            pulse: self.pulse.clone(),
        }
    }
}

impl PartialEq for UseHoverPressHandle {
    fn eq(&self, other: &Self) -> bool {
        self.hovering == other.hovering && self.pressed == other.pressed
    }
}

impl UseHoverPressHandle {
    pub fn is_hovering(&self) -> bool {
        *self.hovering
    }

    pub fn is_pressed(&self) -> bool {
        *self.pressed
    }

    pub fn set_hovering(&self, hovering: bool) {
        self.hovering.set(hovering);
    }

    /// A press reads as pressed for [`PRESS_PULSE_MS`], then clears itself.
    /// Re-pressing replaces (and cancels) the pending pulse.
    pub fn press(&self) {
        self.pressed.set(true);

        let pressed = self.pressed.clone();
        let slot = self.pulse.clone();
        let pulse = Timeout::new(PRESS_PULSE_MS, move || {
            pressed.set(false);
            slot.borrow_mut().take();
        });
        *self.pulse.borrow_mut() = Some(pulse);
    }
}

#[hook]
pub fn use_hover_press() -> UseHoverPressHandle {
    let hovering = use_state_eq(|| false);
    let pressed = use_state_eq(|| false);
    let pulse = use_mut_ref(|| None::<Timeout>);

    {
        let pulse = pulse.clone();
        use_effect_with((), move |_| {
            move || {
                // Unmount cancels a pending pulse.
                pulse.borrow_mut().take();
            }
        });
    }

    UseHoverPressHandle {
        hovering,
        pressed,
        pulse,
    }
}

pub struct UseCategoryFilterHandle {
    state: UseStateHandle<CategoryFilter>,
}

impl Clone for UseCategoryFilterHandle {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl PartialEq for UseCategoryFilterHandle {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl UseCategoryFilterHandle {
    pub fn is_selected(&self, key: &str) -> bool {
        self.state.is_selected(key)
    }

    pub fn select(&self, key: impl Into<String>) {
        let mut next = (*self.state).clone();
        next.select(key);
        self.state.set(next);
    }

    pub fn apply<'a, T>(&self, items: &'a [T], category_of: impl Fn(&T) -> &str) -> Vec<&'a T> {
        self.state.apply(items, category_of)
    }
}

#[hook]
pub fn use_category_filter() -> UseCategoryFilterHandle {
    let state = use_state(CategoryFilter::default);
    UseCategoryFilterHandle { state }
}

pub struct UseToggleSetHandle {
    state: UseStateHandle<ToggleSet>,
}

impl Clone for UseToggleSetHandle {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl PartialEq for UseToggleSetHandle {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl UseToggleSetHandle {
    pub fn contains(&self, id: &str) -> bool {
        self.state.contains(id)
    }

    pub fn toggle(&self, id: &str) {
        let mut next = (*self.state).clone();
        next.toggle(id);
        self.state.set(next);
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

#[hook]
pub fn use_toggle_set() -> UseToggleSetHandle {
    let state = use_state(ToggleSet::default);
    UseToggleSetHandle { state }
}
