#![no_main]

use libfuzzer_sys::fuzz_target;
use veil_modal::{ModalError, ModalOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    match ModalOptions::from_json(text) {
        Ok(_)
        | Err(ModalError::MalformedOptions(_))
        | Err(ModalError::InvalidIdentifierType)
        | Err(ModalError::InvalidType { .. }) => {}
        Err(other) => panic!("unexpected option error: {other}"),
    }
});
