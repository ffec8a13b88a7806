#![forbid(unsafe_code)]

//! The modal engine.
//!
//! [`ModalSystem`] owns the host document and everything shared between
//! modals: the registry, the transition gate, the backdrop and the task
//! scheduler. Modals are addressed by [`ModalKey`].
//!
//! # Lifecycle
//!
//! ```text
//!  Closed --open()--> Opening --(duration)--> Open
//!    ^                                          |
//!    +----(duration)---- Closing <--close()-----+
//! ```
//!
//! `open` is dropped while a close-trigger window is active, and `close` is
//! dropped until the last open has finished (see [`TransitionGate`]).
//! Dropped triggers return `Ok(false)`.
//!
//! Every delayed effect goes through the scheduler, so nothing happens until
//! the host calls [`ModalSystem::advance`]. Notifications queued with zero
//! delay fire on the next `advance`, never inside the call that queued them.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use veil_dom::MemoryDocument;
//! use veil_modal::{ModalOptions, ModalPhase, ModalSystem};
//!
//! let mut modals = ModalSystem::new(MemoryDocument::new());
//! let key = modals
//!     .create(ModalOptions::new().id("hello").title("Hi").transition_duration_ms(300))
//!     .unwrap();
//!
//! assert!(modals.open(key, None).unwrap());
//! modals.advance(Duration::from_millis(300));
//! assert_eq!(modals.phase(key), Some(ModalPhase::Open));
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown key | Modal destroyed or never created | `UnknownModal` |
//! | Not materialized | DOM call before the document is ready | `NotMaterialized` |
//! | Node gone | Delayed task after a manual removal | Task is a no-op on that node |

use std::time::Duration;

use serde_json::Value;
use veil_dom::{Document, NodeId};

use crate::convention::{BACKDROP_VISIBLE_CLASS, CLOSING_CLASS, TRANSITION_ATTRIBUTE};
use crate::error::{ModalError, Result};
use crate::event::{ModalEvent, ModalEventKind};
use crate::gate::{TransitionGate, TransitionKind};
use crate::options::{ModalConfig, ModalOptions, resolve};
use crate::registry::{Instance, ModalKey, ModalPhase, Registry};
use crate::responsive;
use crate::schedule::Scheduler;
use crate::template::{self, DomHandles, TemplateRegions, millis};

/// Deferred engine work.
#[derive(Debug, Clone)]
pub(crate) enum Task {
    /// Dispatch a notification.
    Notify(ModalEvent, NodeId),
    /// End of the open animation.
    FinishOpen {
        key: ModalKey,
        root: NodeId,
        id: String,
        target: Option<NodeId>,
    },
    /// End of the close animation.
    FinishClose {
        key: ModalKey,
        root: NodeId,
        id: String,
    },
    /// Re-enable opening after a close.
    ReleaseTrigger,
    /// Remove a destroyed modal's root.
    Detach { root: NodeId },
}

/// Engine state shared by every modal on a page.
pub struct ModalSystem<D: Document> {
    pub(crate) doc: D,
    pub(crate) registry: Registry,
    pub(crate) gate: TransitionGate,
    pub(crate) scheduler: Scheduler<Task>,
    pub(crate) backdrop: Option<NodeId>,
    pub(crate) ready: bool,
    constructed: u64,
    defaults: ModalConfig,
    events: Vec<ModalEvent>,
}

impl<D: Document> std::fmt::Debug for ModalSystem<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalSystem")
            .field("registry", &self.registry)
            .field("gate", &self.gate)
            .field("scheduler", &self.scheduler)
            .field("backdrop", &self.backdrop)
            .field("ready", &self.ready)
            .finish_non_exhaustive()
    }
}

impl<D: Document> ModalSystem<D> {
    /// Create a system over `doc` with the stock defaults.
    ///
    /// If the document is already ready, interactions are routed
    /// immediately and modals materialize on creation.
    pub fn new(doc: D) -> Self {
        Self::with_defaults(doc, ModalConfig::default())
    }

    /// Create a system whose modals start from `defaults` instead of the
    /// stock configuration. The identifier in `defaults` is ignored.
    pub fn with_defaults(doc: D, defaults: ModalConfig) -> Self {
        let ready = doc.is_ready();
        Self {
            doc,
            registry: Registry::new(),
            gate: TransitionGate::new(),
            scheduler: Scheduler::new(),
            backdrop: None,
            ready,
            constructed: 0,
            defaults,
            events: Vec::new(),
        }
    }

    // --- Construction ---------------------------------------------------

    /// Register a new modal.
    ///
    /// Builds its DOM right away when the document is ready, and opens it
    /// when `autoOpen` is set. On failure nothing is registered.
    pub fn create(&mut self, options: ModalOptions) -> Result<ModalKey> {
        self.constructed += 1;
        let mut defaults = self.defaults.clone();
        defaults.id = ModalConfig::generated_id(self.constructed);
        let config = resolve(&defaults, &options);

        if self.registry.contains_id(&config.id) {
            return Err(ModalError::DuplicateIdentifier(config.id));
        }

        let mut instance = Instance::new(config);
        if self.ready {
            instance.handles = Some(self.materialize(&instance.config)?);
        }
        let auto_open = self.ready && instance.config.auto_open;
        let key = self.registry.insert(instance)?;
        tracing::debug!(key = %key, ready = self.ready, "modal created");

        if auto_open {
            self.open(key, None)?;
        }
        Ok(key)
    }

    /// Register a new modal from JSON options.
    pub fn create_from_json(&mut self, options: &str) -> Result<ModalKey> {
        let options = ModalOptions::from_json(options)?;
        self.create(options)
    }

    /// The document reached its interactive state.
    ///
    /// Starts routing interactions and materializes every modal created
    /// before, in registration order. A modal that fails is unregistered,
    /// the rest proceed, and the first error is returned. Later calls do
    /// nothing.
    pub fn document_ready(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }
        self.ready = true;
        tracing::debug!(pending = self.registry.len(), "document ready");

        let mut first_error = None;
        for key in self.registry.keys() {
            let Some(instance) = self.registry.get(key) else {
                continue;
            };
            if instance.handles.is_some() {
                continue;
            }
            let config = instance.config.clone();
            match self.materialize(&config) {
                Ok(handles) => {
                    if let Some(instance) = self.registry.get_mut(key) {
                        instance.handles = Some(handles);
                    }
                    if config.auto_open
                        && let Err(err) = self.open(key, None)
                    {
                        first_error.get_or_insert(err);
                    }
                }
                Err(err) => {
                    tracing::debug!(id = %config.id, error = %err, "materialization failed");
                    self.registry.remove(key);
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn materialize(&mut self, config: &ModalConfig) -> Result<DomHandles> {
        let backdrop = match self.backdrop {
            Some(backdrop) => backdrop,
            None => {
                let backdrop = template::ensure_backdrop(&mut self.doc);
                self.backdrop = Some(backdrop);
                backdrop
            }
        };
        template::materialize(&mut self.doc, backdrop, config)
    }

    // --- Lifecycle ------------------------------------------------------

    /// Show the modal. `target` is the element that triggered it, if any.
    ///
    /// Returns `Ok(false)` when the trigger was dropped by the gate.
    pub fn open(&mut self, key: ModalKey, target: Option<NodeId>) -> Result<bool> {
        let (handles, config) = self.snapshot(key)?;
        if !self.gate.try_begin(TransitionKind::Open) {
            tracing::trace!(id = %config.id, "open dropped: close trigger pending");
            return Ok(false);
        }
        self.set_phase(key, ModalPhase::Opening);

        let root = handles.root;
        let duration = config.transition_duration();
        if let Some(backdrop) = self.backdrop {
            self.doc.set_style(
                backdrop,
                "transition-duration",
                &millis(config.transition_duration_ms),
            );
            self.doc.add_class(backdrop, BACKDROP_VISIBLE_CLASS);
        }
        self.notify_next_turn(ModalEventKind::BeforeOpen, key, &config.id, root, target);
        self.doc.set_style(root, "display", "block");
        responsive::apply(&mut self.doc, root, &config);

        self.scheduler.schedule(
            duration,
            Task::FinishOpen {
                key,
                root,
                id: config.id.clone(),
                target,
            },
        );
        tracing::debug!(id = %config.id, ?duration, "modal opening");
        Ok(true)
    }

    /// Hide the modal.
    ///
    /// Returns `Ok(false)` when the trigger was dropped by the gate. Closing a
    /// modal that is not shown still runs the close sequence.
    pub fn close(&mut self, key: ModalKey) -> Result<bool> {
        let (handles, config) = self.snapshot(key)?;
        if !self.gate.try_begin(TransitionKind::Close) {
            tracing::trace!(id = %config.id, "close dropped: open in progress");
            return Ok(false);
        }
        self.set_phase(key, ModalPhase::Closing);

        let root = handles.root;
        self.notify_next_turn(ModalEventKind::BeforeClose, key, &config.id, root, None);
        if let Some(backdrop) = self.backdrop {
            self.doc.remove_class(backdrop, BACKDROP_VISIBLE_CLASS);
        }
        self.doc.add_class(root, CLOSING_CLASS);

        let duration = config.transition_duration();
        self.scheduler.schedule(
            duration,
            Task::FinishClose {
                key,
                root,
                id: config.id.clone(),
            },
        );
        self.scheduler
            .schedule(config.trigger_reset_delay(), Task::ReleaseTrigger);
        tracing::debug!(id = %config.id, ?duration, "modal closing");
        Ok(true)
    }

    /// Unregister the modal now and remove its DOM after its transition.
    ///
    /// Pending tasks of the modal still run. No notification is emitted.
    pub fn destroy(&mut self, key: ModalKey) -> Result<()> {
        let instance = self
            .registry
            .remove(key)
            .ok_or_else(|| ModalError::UnknownModal(key.to_string()))?;
        if let Some(handles) = instance.handles {
            self.scheduler.schedule(
                instance.config.transition_duration(),
                Task::Detach { root: handles.root },
            );
        }
        tracing::debug!(id = %instance.config.id, "modal destroyed");
        Ok(())
    }

    // --- Setters --------------------------------------------------------

    /// Replace the content markup.
    pub fn set_content(&mut self, key: ModalKey, content: &str) -> Result<()> {
        let (handles, config) = self.snapshot(key)?;
        let holder = TemplateRegions::resolve(&self.doc, handles.root)
            .content
            .ok_or(ModalError::MissingContentRegion(config.id))?;
        self.doc.set_inner_html(holder, content);
        self.config_mut(key)?.content = content.to_owned();
        Ok(())
    }

    /// Replace the title markup.
    pub fn set_title(&mut self, key: ModalKey, title: &str) -> Result<()> {
        let (handles, config) = self.snapshot(key)?;
        let holder = TemplateRegions::resolve(&self.doc, handles.root)
            .title_text
            .ok_or(ModalError::MissingTitleRegion(config.id))?;
        self.doc.set_inner_html(holder, title);
        self.config_mut(key)?.title = title.to_owned();
        Ok(())
    }

    /// Set or clear (`None`) the inline height and width.
    pub fn set_size(&mut self, key: ModalKey, height: Option<u32>, width: Option<u32>) -> Result<()> {
        let (handles, _) = self.snapshot(key)?;
        template::apply_size(&mut self.doc, handles.root, height, width);
        let config = self.config_mut(key)?;
        config.height = height;
        config.width = width;
        Ok(())
    }

    /// Rename the modal. Fails without changes if `id` is taken.
    pub fn set_id(&mut self, key: ModalKey, id: &str) -> Result<()> {
        let (handles, _) = self.snapshot(key)?;
        self.registry.rename(key, id)?;
        self.doc.set_id(handles.root, id);
        Ok(())
    }

    /// Swap the template markup of a live modal.
    ///
    /// Title and content are reapplied where the new template has regions
    /// for them; the close button is rebuilt.
    pub fn set_template(&mut self, key: ModalKey, markup: &str) -> Result<()> {
        let (handles, mut config) = self.snapshot(key)?;
        template::parse_class_list(&config.close_btn_class)?;

        config.template = markup.to_owned();
        let root = handles.root;
        self.doc.set_inner_html(root, markup);
        let regions = TemplateRegions::resolve(&self.doc, root);
        template::populate(&mut self.doc, &regions, &config);
        let close_button = if config.add_close_btn {
            Some(template::build_close_button(
                &mut self.doc,
                root,
                regions.title,
                &config,
            )?)
        } else {
            None
        };

        if let Some(instance) = self.registry.get_mut(key) {
            instance.config.template = config.template;
            instance.handles = Some(DomHandles { root, close_button });
        }
        Ok(())
    }

    /// Change the transition name stamped on the root.
    pub fn set_transition(&mut self, key: ModalKey, transition: &str) -> Result<()> {
        let (handles, _) = self.snapshot(key)?;
        self.doc
            .set_attribute(handles.root, TRANSITION_ATTRIBUTE, transition);
        self.config_mut(key)?.transition = transition.to_owned();
        Ok(())
    }

    /// Toggle closing by backdrop click.
    pub fn set_close_by_overlay(&mut self, key: ModalKey, enabled: bool) -> Result<()> {
        self.config_mut(key)?.close_by_overlay = enabled;
        Ok(())
    }

    /// Dynamically typed setter, for script hosts.
    ///
    /// `name` is the camelCase option key.
    pub fn set_option(&mut self, key: ModalKey, name: &str, value: &Value) -> Result<()> {
        let text = |value: &Value| {
            value
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| ModalError::InvalidType {
                    key: name.to_owned(),
                    reason: "expected a string".to_owned(),
                })
        };
        match name {
            "id" => {
                let id = value.as_str().ok_or(ModalError::InvalidIdentifierType)?;
                self.set_id(key, id)
            }
            "closeByOverlay" => {
                let enabled = value.as_bool().ok_or_else(|| ModalError::InvalidType {
                    key: name.to_owned(),
                    reason: "expected a boolean".to_owned(),
                })?;
                self.set_close_by_overlay(key, enabled)
            }
            "title" => self.set_title(key, &text(value)?),
            "content" => self.set_content(key, &text(value)?),
            "template" => self.set_template(key, &text(value)?),
            "transition" => self.set_transition(key, &text(value)?),
            _ => Err(ModalError::InvalidType {
                key: name.to_owned(),
                reason: "option cannot be changed after creation".to_owned(),
            }),
        }
    }

    // --- Time -----------------------------------------------------------

    /// Move virtual time forward, running every task that becomes due.
    pub fn advance(&mut self, elapsed: Duration) {
        let deadline = self.scheduler.now().saturating_add(elapsed);
        while let Some(task) = self.scheduler.pop_due(deadline) {
            self.run(task);
        }
        self.scheduler.settle(deadline);
    }

    /// Time until the next pending task, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    fn run(&mut self, task: Task) {
        tracing::trace!(?task, now = ?self.scheduler.now(), "task due");
        match task {
            Task::Notify(event, root) => self.emit(event, root),
            Task::FinishOpen {
                key,
                root,
                id,
                target,
            } => {
                self.emit(
                    ModalEvent {
                        kind: ModalEventKind::Open,
                        key,
                        id,
                        target,
                    },
                    root,
                );
                self.gate.end(TransitionKind::Open);
                self.finish_phase(key, ModalPhase::Opening, ModalPhase::Open);
            }
            Task::FinishClose { key, root, id } => {
                self.doc.remove_class(root, CLOSING_CLASS);
                self.doc.set_style(root, "display", "none");
                self.emit(
                    ModalEvent {
                        kind: ModalEventKind::Closed,
                        key,
                        id,
                        target: None,
                    },
                    root,
                );
                self.finish_phase(key, ModalPhase::Closing, ModalPhase::Closed);
            }
            Task::ReleaseTrigger => self.gate.end(TransitionKind::Close),
            Task::Detach { root } => {
                if !self.doc.remove(root) {
                    tracing::trace!(root = %root, "destroyed modal already detached");
                }
                self.doc.release(root);
            }
        }
    }

    // --- Notifications --------------------------------------------------

    fn notify_next_turn(
        &mut self,
        kind: ModalEventKind,
        key: ModalKey,
        id: &str,
        root: NodeId,
        target: Option<NodeId>,
    ) {
        let event = ModalEvent {
            kind,
            key,
            id: id.to_owned(),
            target,
        };
        self.scheduler
            .schedule(Duration::ZERO, Task::Notify(event, root));
    }

    fn emit(&mut self, event: ModalEvent, root: NodeId) {
        tracing::debug!(id = %event.id, event = %event.kind, "notify");
        self.doc.dispatch_custom_event(root, &event.to_custom_event());
        self.events.push(event);
    }

    /// Take every notification emitted so far.
    pub fn drain_events(&mut self) -> Vec<ModalEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Queries --------------------------------------------------------

    /// Whether interactions are routed and modals materialize.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn instance(&self, key: ModalKey) -> Option<&Instance> {
        self.registry.get(key)
    }

    #[must_use]
    pub fn phase(&self, key: ModalKey) -> Option<ModalPhase> {
        self.registry.get(key).map(Instance::phase)
    }

    #[must_use]
    pub fn config(&self, key: ModalKey) -> Option<&ModalConfig> {
        self.registry.get(key).map(Instance::config)
    }

    #[must_use]
    pub fn handles(&self, key: ModalKey) -> Option<DomHandles> {
        self.registry.get(key).and_then(|i| i.handles)
    }

    /// Key of the live modal with DOM identifier `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<ModalKey> {
        self.registry.find_by_id(id).map(Instance::key)
    }

    /// Live modal keys in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<ModalKey> {
        self.registry.keys()
    }

    /// The registry of live modals.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The first modal, in registration order, whose root is displayed.
    #[must_use]
    pub fn displayed(&self) -> Option<ModalKey> {
        self.registry
            .iter()
            .find(|i| i.handles.is_some_and(|h| self.doc.is_displayed(h.root)))
            .map(Instance::key)
    }

    /// The shared backdrop, once created.
    #[must_use]
    pub fn backdrop(&self) -> Option<NodeId> {
        self.backdrop
    }

    /// Whether the backdrop currently shows a modal.
    #[must_use]
    pub fn backdrop_visible(&self) -> bool {
        self.backdrop
            .is_some_and(|b| self.doc.has_class(b, BACKDROP_VISIBLE_CLASS))
    }

    #[must_use]
    pub fn gate(&self) -> &TransitionGate {
        &self.gate
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    /// Tear down the engine and return the document.
    pub fn into_document(self) -> D {
        self.doc
    }

    // --- Internals ------------------------------------------------------

    fn snapshot(&self, key: ModalKey) -> Result<(DomHandles, ModalConfig)> {
        let instance = self
            .registry
            .get(key)
            .ok_or_else(|| ModalError::UnknownModal(key.to_string()))?;
        let handles = instance
            .handles
            .ok_or_else(|| ModalError::NotMaterialized(instance.config.id.clone()))?;
        Ok((handles, instance.config.clone()))
    }

    fn config_mut(&mut self, key: ModalKey) -> Result<&mut ModalConfig> {
        self.registry
            .get_mut(key)
            .map(|i| &mut i.config)
            .ok_or_else(|| ModalError::UnknownModal(key.to_string()))
    }

    fn set_phase(&mut self, key: ModalKey, phase: ModalPhase) {
        if let Some(instance) = self.registry.get_mut(key) {
            instance.phase = phase;
        }
    }

    fn finish_phase(&mut self, key: ModalKey, from: ModalPhase, to: ModalPhase) {
        if let Some(instance) = self.registry.get_mut(key)
            && instance.phase == from
        {
            instance.phase = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_dom::MemoryDocument;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn system() -> ModalSystem<MemoryDocument> {
        ModalSystem::new(MemoryDocument::new())
    }

    #[test]
    fn generated_ids_count_constructions() {
        let mut sys = system();
        let a = sys.create(ModalOptions::new()).unwrap();
        let _ = sys.create(ModalOptions::new().id("named")).unwrap();
        let c = sys.create(ModalOptions::new()).unwrap();
        assert_eq!(sys.config(a).map(|c| c.id.as_str()), Some("modal1"));
        assert_eq!(sys.config(c).map(|c| c.id.as_str()), Some("modal3"));
    }

    #[test]
    fn defaults_are_per_system() {
        let mut defaults = ModalConfig::default();
        defaults.transition = "slide".into();
        let mut sys = ModalSystem::with_defaults(MemoryDocument::new(), defaults);
        let key = sys.create(ModalOptions::new()).unwrap();
        let root = sys.handles(key).unwrap().root;
        assert_eq!(
            sys.document().attribute(root, "data-transition").as_deref(),
            Some("slide")
        );
    }

    #[test]
    fn not_ready_defers_dom() {
        let mut sys = ModalSystem::new(MemoryDocument::loading());
        let key = sys.create(ModalOptions::new().id("later")).unwrap();
        assert_eq!(sys.handles(key), None);
        assert_eq!(
            sys.open(key, None),
            Err(ModalError::NotMaterialized("later".into()))
        );
        assert!(sys.backdrop().is_none());

        sys.document_ready().unwrap();
        assert!(sys.handles(key).is_some());
        assert!(sys.document().element_by_id("later").is_some());
    }

    #[test]
    fn open_waits_for_advance() {
        let mut sys = system();
        let key = sys.create(ModalOptions::new().transition_duration_ms(100)).unwrap();

        assert_eq!(sys.open(key, None), Ok(true));
        assert!(sys.drain_events().is_empty());
        assert!(sys.document().dispatched().is_empty());
        assert_eq!(sys.phase(key), Some(ModalPhase::Opening));

        sys.advance(Duration::ZERO);
        let kinds: Vec<_> = sys.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ModalEventKind::BeforeOpen]);

        sys.advance(ms(100));
        let kinds: Vec<_> = sys.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ModalEventKind::Open]);
        assert_eq!(sys.phase(key), Some(ModalPhase::Open));
        assert!(sys.gate().closable());
    }

    #[test]
    fn backdrop_gets_transition_duration() {
        let mut sys = system();
        let key = sys.create(ModalOptions::new().transition_duration_ms(250)).unwrap();
        sys.open(key, None).unwrap();
        let backdrop = sys.backdrop().unwrap();
        assert_eq!(
            sys.document().style(backdrop, "transition-duration").as_deref(),
            Some("250ms")
        );
        assert!(sys.backdrop_visible());
    }

    #[test]
    fn unknown_key_after_destroy() {
        let mut sys = system();
        let key = sys.create(ModalOptions::new()).unwrap();
        sys.destroy(key).unwrap();
        assert!(matches!(sys.open(key, None), Err(ModalError::UnknownModal(_))));
        assert!(matches!(sys.destroy(key), Err(ModalError::UnknownModal(_))));
        assert!(matches!(
            sys.set_close_by_overlay(key, false),
            Err(ModalError::UnknownModal(_))
        ));
    }

    #[test]
    fn set_option_types() {
        let mut sys = system();
        let key = sys.create(ModalOptions::new().id("x")).unwrap();

        assert_eq!(
            sys.set_option(key, "id", &Value::from(3)),
            Err(ModalError::InvalidIdentifierType)
        );
        assert!(matches!(
            sys.set_option(key, "closeByOverlay", &Value::from("no")),
            Err(ModalError::InvalidType { .. })
        ));
        sys.set_option(key, "closeByOverlay", &Value::from(false)).unwrap();
        assert_eq!(sys.config(key).map(|c| c.close_by_overlay), Some(false));

        sys.set_option(key, "id", &Value::from("y")).unwrap();
        assert_eq!(sys.find("y"), Some(key));
        assert!(matches!(
            sys.set_option(key, "width", &Value::from(10)),
            Err(ModalError::InvalidType { .. })
        ));
    }

    #[test]
    fn auto_open_on_create() {
        let mut sys = system();
        let key = sys.create(ModalOptions::new().auto_open(true)).unwrap();
        assert_eq!(sys.phase(key), Some(ModalPhase::Opening));
        assert_eq!(sys.displayed(), Some(key));
    }

    #[test]
    fn create_from_json_reports_type_errors() {
        let mut sys = system();
        assert_eq!(
            sys.create_from_json(r#"{"id": false}"#),
            Err(ModalError::InvalidIdentifierType)
        );
        let key = sys.create_from_json(r#"{"id": "j", "unknown": 1}"#).unwrap();
        assert_eq!(sys.find("j"), Some(key));
    }
}
