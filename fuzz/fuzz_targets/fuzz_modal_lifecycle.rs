#![no_main]

use std::collections::HashSet;
use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veil_dom::{Document, MemoryDocument};
use veil_modal::{Interaction, Key, ModalOptions, ModalSystem};

#[derive(Debug, Arbitrary)]
enum Op {
    Create { id: Option<u8>, duration: u16, width: Option<u16>, auto_open: bool },
    Open(u8),
    Close(u8),
    Destroy(u8),
    Rename(u8, u8),
    SetSize(u8, Option<u16>, Option<u16>),
    SetTemplate(u8, bool),
    Advance(u16),
    ClickBackdrop,
    Escape,
    Resize(u16),
    Ready,
}

#[derive(Debug, Arbitrary)]
struct Script {
    start_ready: bool,
    ops: Vec<Op>,
}

fuzz_target!(|script: Script| {
    let doc = if script.start_ready {
        MemoryDocument::new()
    } else {
        MemoryDocument::loading()
    };
    let mut sys = ModalSystem::new(doc);

    for op in script.ops.into_iter().take(256) {
        let keys = sys.keys();
        let pick = |i: u8| keys.get(usize::from(i) % keys.len().max(1)).copied();
        match op {
            Op::Create { id, duration, width, auto_open } => {
                let mut options = ModalOptions::new()
                    .transition_duration_ms(u64::from(duration % 2_000))
                    .auto_open(auto_open);
                if let Some(id) = id {
                    options = options.id(format!("m{}", id % 8));
                }
                if let Some(width) = width {
                    options = options.width(u32::from(width));
                }
                let _ = sys.create(options);
            }
            Op::Open(i) => {
                if let Some(key) = pick(i) {
                    let _ = sys.open(key, None);
                }
            }
            Op::Close(i) => {
                if let Some(key) = pick(i) {
                    let _ = sys.close(key);
                }
            }
            Op::Destroy(i) => {
                if let Some(key) = pick(i) {
                    let _ = sys.destroy(key);
                }
            }
            Op::Rename(i, n) => {
                if let Some(key) = pick(i) {
                    let _ = sys.set_id(key, &format!("m{}", n % 8));
                }
            }
            Op::SetSize(i, h, w) => {
                if let Some(key) = pick(i) {
                    let _ = sys.set_size(key, h.map(u32::from), w.map(u32::from));
                }
            }
            Op::SetTemplate(i, with_header) => {
                if let Some(key) = pick(i) {
                    let markup = if with_header {
                        r#"<header class="modal-title"><p></p></header>"#
                    } else {
                        "<div></div>"
                    };
                    let _ = sys.set_template(key, markup);
                }
            }
            Op::Advance(ms) => sys.advance(Duration::from_millis(u64::from(ms))),
            Op::ClickBackdrop => {
                if let Some(backdrop) = sys.backdrop() {
                    let _ = sys.handle_interaction(&Interaction::Click { target: backdrop });
                }
            }
            Op::Escape => {
                let _ = sys.handle_interaction(&Interaction::KeyDown { key: Key::Escape });
            }
            Op::Resize(width) => {
                sys.document_mut().set_viewport_width(u32::from(width));
                let _ = sys.handle_interaction(&Interaction::Resize);
            }
            Op::Ready => {
                sys.document_mut().set_ready();
                let _ = sys.document_ready();
            }
        }

        let ids: HashSet<&str> = sys.registry().iter().map(|i| i.id()).collect();
        assert_eq!(ids.len(), sys.registry().len(), "identifiers must stay unique");
        let doc = sys.document();
        assert!(
            doc.query_selector_all(doc.body(), "#modalBackground").len() <= 1,
            "at most one backdrop"
        );
    }
});
