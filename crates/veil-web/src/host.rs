#![forbid(unsafe_code)]

//! Page wiring: listeners and timers around a [`Driver`].
//!
//! [`WebModals::attach`] installs one listener per page event (`click` and
//! `keydown` on the document, `resize` on the window, `readystatechange` on
//! the document) and re-arms a single `setTimeout` whenever the engine has
//! pending work.
//!
//! Lifecycle notifications are delivered after the engine is released, so a
//! listener may call [`WebModals`] again (open the next modal on `closed`,
//! for example). [`WebError::Busy`] only surfaces when a call is made from
//! inside a closure passed to [`WebModals::with`].
//!
//! Click targets are interned only when routing can use them later: an
//! element already known to the engine, or a `data-modal` trigger. Any
//! other target gets a handle for the duration of the click.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use veil_modal::convention::OPEN_MARKER_ATTRIBUTE;
use veil_modal::{Interaction, Key, ModalConfig, ModalKey, ModalOptions, ModalSystem};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, Event, EventTarget, KeyboardEvent};

use crate::dom::{PendingEvent, WebDocument};
use crate::driver::{Driver, timeout_millis};
use crate::error::{Result, WebError};

type Listener = Closure<dyn FnMut(Event)>;

struct Shared {
    driver: RefCell<Driver<WebDocument>>,
    timer: RefCell<Option<Closure<dyn FnMut()>>>,
    armed: RefCell<Option<i32>>,
}

impl Shared {
    /// Catch up, deliver notifications and re-arm the timer.
    fn pump(self: &Rc<Self>) {
        let pending = match self.driver.try_borrow_mut() {
            Ok(mut driver) => {
                driver.pump();
                driver.system_mut().document_mut().take_pending()
            }
            Err(_) => return,
        };
        self.settle(pending);
    }

    /// Deliver `pending` with the engine released, then re-arm for whatever
    /// is left, including work queued by the listeners.
    fn settle(self: &Rc<Self>, pending: Vec<PendingEvent>) {
        for event in pending {
            event.deliver();
        }
        let next = match self.driver.try_borrow() {
            Ok(driver) => driver.system().next_deadline(),
            Err(_) => return,
        };
        self.arm(next);
    }

    fn arm(self: &Rc<Self>, next: Option<Duration>) {
        let Ok(driver) = self.driver.try_borrow() else {
            return;
        };
        let window = driver.system().document().window().clone();
        drop(driver);

        if let Some(handle) = self.armed.borrow_mut().take() {
            window.clear_timeout_with_handle(handle);
        }
        let Some(delay) = next else {
            return;
        };

        let mut timer = self.timer.borrow_mut();
        if timer.is_none() {
            let weak = Rc::downgrade(self);
            *timer = Some(Closure::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.armed.borrow_mut().take();
                    shared.pump();
                }
            }));
        }
        let Some(callback) = timer.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            timeout_millis(delay),
        ) {
            Ok(handle) => *self.armed.borrow_mut() = Some(handle),
            Err(err) => tracing::warn!(error = ?err, "setTimeout failed"),
        }
    }

    fn route(self: &Rc<Self>, interaction: &Interaction) {
        let pending = match self.driver.try_borrow_mut() {
            Ok(mut driver) => {
                if let Err(err) = driver.dispatch(interaction) {
                    tracing::warn!(error = %err, ?interaction, "interaction failed");
                }
                driver.system_mut().document_mut().take_pending()
            }
            Err(_) => {
                tracing::warn!(?interaction, "interaction dropped: engine busy");
                return;
            }
        };
        self.settle(pending);
    }

    /// Route a click on `element`, interning it only as long as needed.
    fn click(self: &Rc<Self>, element: Element) {
        let (target, transient) = match self.driver.try_borrow() {
            Ok(driver) => {
                let doc = driver.system().document();
                match doc.find(&element) {
                    Some(node) => (node, false),
                    None => {
                        // Triggers stay interned: their handle rides along
                        // in the open notifications.
                        let keep = element.has_attribute(OPEN_MARKER_ATTRIBUTE);
                        (doc.intern(element), !keep)
                    }
                }
            }
            Err(_) => return,
        };
        self.route(&Interaction::Click { target });
        if transient && let Ok(driver) = self.driver.try_borrow() {
            driver.system().document().forget(target);
        }
    }
}

/// Modal engine attached to the live page.
pub struct WebModals {
    shared: Rc<Shared>,
    listeners: Vec<(EventTarget, &'static str, Listener)>,
}

impl std::fmt::Debug for WebModals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebModals")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl WebModals {
    /// Attach to the page with stock defaults.
    pub fn attach() -> Result<Self> {
        Self::attach_with_defaults(ModalConfig::default())
    }

    /// Attach to the page; new modals start from `defaults`.
    pub fn attach_with_defaults(defaults: ModalConfig) -> Result<Self> {
        let doc = WebDocument::from_window()?;
        let document: EventTarget = doc.raw().clone().into();
        let window: EventTarget = doc.window().clone().into();
        let system = ModalSystem::with_defaults(doc, defaults);

        let shared = Rc::new(Shared {
            driver: RefCell::new(Driver::new(system)),
            timer: RefCell::new(None),
            armed: RefCell::new(None),
        });
        let mut modals = Self {
            shared,
            listeners: Vec::new(),
        };

        modals.listen(&document, "click", |shared, event| {
            if let Some(element) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                shared.click(element);
            }
        })?;
        modals.listen(&document, "keydown", |shared, event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                let key = Key::from_name(&event.key());
                shared.route(&Interaction::KeyDown { key });
            }
        })?;
        modals.listen(&window, "resize", |shared, _| {
            shared.route(&Interaction::Resize);
        })?;
        modals.listen(&document, "readystatechange", |shared, _| {
            let result = match shared.driver.try_borrow_mut() {
                Ok(mut driver) => {
                    let system = driver.system_mut();
                    if !veil_dom::Document::is_ready(system.document()) {
                        return;
                    }
                    system.document_ready()
                }
                Err(_) => return,
            };
            if let Err(err) = result {
                tracing::warn!(error = %err, "modal failed to materialize");
            }
            shared.pump();
        })?;

        tracing::debug!("modal listeners installed");
        Ok(modals)
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        name: &'static str,
        handler: impl Fn(&Rc<Shared>, Event) + 'static,
    ) -> Result<()> {
        let weak = Rc::downgrade(&self.shared);
        let listener: Listener = Closure::new(move |event: Event| {
            if let Some(shared) = weak.upgrade() {
                handler(&shared, event);
            }
        });
        target
            .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
            .map_err(|err| WebError::Js(format!("{err:?}")))?;
        self.listeners.push((target.clone(), name, listener));
        Ok(())
    }

    /// Run `f` against the engine, then pump.
    ///
    /// Notifications raised while `f` runs are delivered after it returns.
    /// Calling back into `self` from inside `f` fails with
    /// [`WebError::Busy`].
    pub fn with<R>(&self, f: impl FnOnce(&mut ModalSystem<WebDocument>) -> R) -> Result<R> {
        let (result, pending) = {
            let mut driver = self
                .shared
                .driver
                .try_borrow_mut()
                .map_err(|_| WebError::Busy)?;
            driver.pump();
            let result = f(driver.system_mut());
            (result, driver.system_mut().document_mut().take_pending())
        };
        self.shared.settle(pending);
        Ok(result)
    }

    pub fn create(&self, options: ModalOptions) -> Result<ModalKey> {
        self.with(|sys| sys.create(options))?.map_err(WebError::from)
    }

    pub fn open(&self, key: ModalKey) -> Result<bool> {
        self.with(|sys| sys.open(key, None))?.map_err(WebError::from)
    }

    pub fn close(&self, key: ModalKey) -> Result<bool> {
        self.with(|sys| sys.close(key))?.map_err(WebError::from)
    }

    pub fn destroy(&self, key: ModalKey) -> Result<()> {
        self.with(|sys| sys.destroy(key))?.map_err(WebError::from)
    }
}

impl Drop for WebModals {
    fn drop(&mut self) {
        for (target, name, listener) in self.listeners.drain(..) {
            let _ = target.remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
        if let Some(handle) = self.shared.armed.borrow_mut().take()
            && let Ok(driver) = self.shared.driver.try_borrow()
        {
            driver
                .system()
                .document()
                .window()
                .clear_timeout_with_handle(handle);
        }
    }
}
