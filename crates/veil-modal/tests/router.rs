//! Interaction routing tests: clicks, Escape and resize.

#![forbid(unsafe_code)]

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing_subscriber::fmt::MakeWriter;
use veil_dom::{Document, MemoryDocument, NodeId};
use veil_modal::{
    Interaction, Key, ModalError, ModalEventKind, ModalKey, ModalOptions, ModalPhase, ModalSystem,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn system() -> ModalSystem<MemoryDocument> {
    ModalSystem::new(MemoryDocument::new())
}

fn click(sys: &mut ModalSystem<MemoryDocument>, target: NodeId) -> veil_modal::Result<()> {
    sys.handle_interaction(&Interaction::Click { target })
}

fn escape(sys: &mut ModalSystem<MemoryDocument>) {
    sys.handle_interaction(&Interaction::KeyDown { key: Key::Escape })
        .expect("escape never fails");
}

/// A `<button>` in the page body with the given attributes.
fn page_button(sys: &mut ModalSystem<MemoryDocument>, attrs: &[(&str, &str)]) -> NodeId {
    let doc = sys.document_mut();
    let button = doc.create_element("button");
    for (name, value) in attrs {
        doc.set_attribute(button, name, value);
    }
    let body = doc.body();
    doc.append_child(body, button);
    button
}

fn open_fully(sys: &mut ModalSystem<MemoryDocument>, key: ModalKey) {
    sys.open(key, None).expect("live modal");
    sys.advance(ms(400));
}

// =============================================================================
// Clicks
// =============================================================================

#[test]
fn data_modal_click_opens_with_target() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new().id("login")).unwrap();
    let trigger = page_button(&mut sys, &[("data-modal", "login")]);

    click(&mut sys, trigger).unwrap();
    assert_eq!(sys.phase(key), Some(ModalPhase::Opening));

    sys.advance(ms(400));
    let events = sys.drain_events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.target == Some(trigger)));
    assert_eq!(events[1].kind, ModalEventKind::Open);
}

#[test]
fn data_modal_click_for_unknown_modal_fails() {
    let mut sys = system();
    sys.create(ModalOptions::new().id("real")).unwrap();
    let trigger = page_button(&mut sys, &[("data-modal", "ghost")]);

    assert_eq!(
        click(&mut sys, trigger),
        Err(ModalError::UnknownModal("ghost".into()))
    );
}

#[test]
fn close_marker_closes_displayed_modal() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new()).unwrap();
    let closer = page_button(&mut sys, &[("class", "modal-close")]);
    open_fully(&mut sys, key);

    click(&mut sys, closer).unwrap();
    assert_eq!(sys.phase(key), Some(ModalPhase::Closing));
}

#[test]
fn close_button_closes_its_own_modal() {
    let mut sys = system();
    let key = sys
        .create(ModalOptions::new().close_btn("<i>x</i>"))
        .unwrap();
    open_fully(&mut sys, key);

    let button = sys.handles(key).unwrap().close_button.unwrap();
    let icon = sys.document().children(button)[0];
    click(&mut sys, icon).unwrap();
    assert_eq!(sys.phase(key), Some(ModalPhase::Closing));
}

#[test]
fn close_button_with_marker_class_closes_once() {
    let mut sys = system();
    let key = sys
        .create(ModalOptions::new().id("a").close_btn_class("modal-close"))
        .unwrap();
    open_fully(&mut sys, key);
    sys.drain_events();

    let button = sys.handles(key).unwrap().close_button.unwrap();
    click(&mut sys, button).unwrap();
    sys.advance(ms(1000));

    let kinds: Vec<_> = sys.drain_events().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ModalEventKind::BeforeClose, ModalEventKind::Closed]);
    assert_eq!(sys.phase(key), Some(ModalPhase::Closed));
    assert!(sys.next_deadline().is_none());
}

#[test]
fn rebuilt_close_button_still_closes() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new()).unwrap();
    sys.set_template(key, "<div></div>").unwrap();
    open_fully(&mut sys, key);

    let button = sys.handles(key).unwrap().close_button.unwrap();
    click(&mut sys, button).unwrap();
    assert_eq!(sys.phase(key), Some(ModalPhase::Closing));
}

#[test]
fn backdrop_click_respects_close_by_overlay() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new().close_by_overlay(false)).unwrap();
    open_fully(&mut sys, key);
    let backdrop = sys.backdrop().unwrap();

    click(&mut sys, backdrop).unwrap();
    assert_eq!(sys.phase(key), Some(ModalPhase::Open));

    sys.set_close_by_overlay(key, true).unwrap();
    click(&mut sys, backdrop).unwrap();
    assert_eq!(sys.phase(key), Some(ModalPhase::Closing));
}

#[test]
fn click_inside_modal_body_does_nothing() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new().content("<p>text</p>")).unwrap();
    open_fully(&mut sys, key);

    let root = sys.handles(key).unwrap().root;
    let paragraph = sys.document().query_selector(root, ".modal-content p").unwrap();
    click(&mut sys, paragraph).unwrap();
    assert_eq!(sys.phase(key), Some(ModalPhase::Open));
}

#[test]
fn displayed_modal_is_first_in_registration_order() {
    let mut sys = system();
    let a = sys.create(ModalOptions::new()).unwrap();
    let b = sys.create(ModalOptions::new()).unwrap();
    open_fully(&mut sys, b);
    assert_eq!(sys.displayed(), Some(b));

    open_fully(&mut sys, a);
    assert_eq!(sys.displayed(), Some(a));

    let backdrop = sys.backdrop().unwrap();
    click(&mut sys, backdrop).unwrap();
    assert_eq!(sys.phase(a), Some(ModalPhase::Closing));
    assert_eq!(sys.phase(b), Some(ModalPhase::Open));
}

// =============================================================================
// Keyboard
// =============================================================================

#[test]
fn escape_closes_when_allowed() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new()).unwrap();
    open_fully(&mut sys, key);

    sys.handle_interaction(&Interaction::KeyDown {
        key: Key::from_name("Enter"),
    })
    .unwrap();
    assert_eq!(sys.phase(key), Some(ModalPhase::Open));

    escape(&mut sys);
    assert_eq!(sys.phase(key), Some(ModalPhase::Closing));
}

#[test]
fn escape_ignored_when_disabled() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new().escape_close(false)).unwrap();
    open_fully(&mut sys, key);
    escape(&mut sys);
    assert_eq!(sys.phase(key), Some(ModalPhase::Open));
}

#[test]
fn escape_without_visible_backdrop_is_ignored() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new()).unwrap();
    escape(&mut sys);
    assert_eq!(sys.phase(key), Some(ModalPhase::Closed));
    assert!(sys.next_deadline().is_none());
}

// =============================================================================
// Resize
// =============================================================================

#[test]
fn resize_follows_the_viewport() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new().width(600)).unwrap();
    let root = sys.handles(key).unwrap().root;
    open_fully(&mut sys, key);
    assert_eq!(sys.document().style(root, "width").as_deref(), Some("600px"));

    sys.document_mut().set_viewport_width(500);
    sys.handle_interaction(&Interaction::Resize).unwrap();
    assert_eq!(sys.document().style(root, "width").as_deref(), Some("450px"));

    sys.document_mut().set_viewport_width(1280);
    sys.handle_interaction(&Interaction::Resize).unwrap();
    assert_eq!(sys.document().style(root, "width").as_deref(), Some("600px"));
}

#[test]
fn resize_while_hidden_is_ignored() {
    let mut sys = system();
    let key = sys.create(ModalOptions::new().width(600)).unwrap();
    let root = sys.handles(key).unwrap().root;

    sys.document_mut().set_viewport_width(300);
    sys.handle_interaction(&Interaction::Resize).unwrap();
    assert_eq!(sys.document().style(root, "width").as_deref(), Some("600px"));
}

// =============================================================================
// Readiness and logging
// =============================================================================

#[test]
fn interactions_before_ready_are_ignored() {
    let mut sys = ModalSystem::new(MemoryDocument::loading());
    sys.create(ModalOptions::new().id("x")).unwrap();
    let trigger = page_button(&mut sys, &[("data-modal", "ghost")]);

    assert_eq!(click(&mut sys, trigger), Ok(()));

    sys.document_ready().unwrap();
    assert!(click(&mut sys, trigger).is_err());
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn unknown_data_modal_is_logged() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut sys = system();
        let trigger = page_button(&mut sys, &[("data-modal", "ghost")]);
        let _ = click(&mut sys, trigger);
    });

    let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("ghost"), "{output}");
}
