#![forbid(unsafe_code)]

//! Modal configuration and the option resolver.
//!
//! [`ModalConfig`] is the fully resolved configuration of one modal.
//! [`ModalOptions`] carries user overrides: every field is optional and
//! only fields that exist in the configuration can be expressed, so
//! [`resolve`] is an allow-list merge. Nested values (`attributes`) are
//! replaced wholesale, never merged key by key.
//!
//! Overrides can also arrive as JSON (for example from a `data-*` blob or a
//! script host). Unknown keys are ignored, a non-string `id` is rejected with
//! [`ModalError::InvalidIdentifierType`], and any other type mismatch with
//! [`ModalError::InvalidType`] naming the key.
//!
//! # Example
//!
//! ```
//! use veil_modal::options::{resolve, ModalConfig, ModalOptions};
//!
//! let defaults = ModalConfig::with_id("modal1");
//! let options = ModalOptions::new().title("Hi").width(320);
//! let config = resolve(&defaults, &options);
//!
//! assert_eq!(config.id, "modal1");
//! assert_eq!(config.title, "Hi");
//! assert_eq!(config.width, Some(320));
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::convention::{DEFAULT_CLOSE_BUTTON, DEFAULT_ID_PREFIX, DEFAULT_TEMPLATE};
use crate::error::{ModalError, Result};

/// Floor for re-enabling triggers after a close starts.
pub const MIN_TRIGGER_RESET: Duration = Duration::from_millis(600);

/// Fully resolved configuration of one modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalConfig {
    /// Synthesize a close button.
    pub add_close_btn: bool,
    /// Extra `data-*` attributes stamped on the root (key without prefix).
    pub attributes: BTreeMap<String, String>,
    /// Open as soon as the modal is materialized.
    pub auto_open: bool,
    /// Close when the backdrop itself is clicked.
    pub close_by_overlay: bool,
    /// Close button inner markup.
    pub close_btn: String,
    /// Space-separated extra classes for the close button.
    pub close_btn_class: String,
    /// Content markup.
    pub content: String,
    /// Space-separated extra classes for the root.
    pub custom_class: String,
    /// Close on the Escape key.
    pub escape_close: bool,
    /// Keep the header fixed while content scrolls.
    pub header_fixed: bool,
    /// Explicit height in pixels.
    pub height: Option<u32>,
    /// DOM identifier; unique among live modals.
    pub id: String,
    /// Recompute width against the viewport on open and resize.
    pub responsive: bool,
    /// Pixels kept free between the modal and the viewport edges.
    pub responsive_brink: u32,
    /// Structural markup skeleton.
    pub template: String,
    /// Title markup.
    pub title: String,
    /// Transition tag consumed by the stylesheet.
    pub transition: String,
    /// Open/close animation length in milliseconds.
    #[serde(rename = "transitionDuration")]
    pub transition_duration_ms: u64,
    /// Explicit width in pixels.
    pub width: Option<u32>,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            add_close_btn: true,
            attributes: BTreeMap::new(),
            auto_open: false,
            close_by_overlay: true,
            close_btn: DEFAULT_CLOSE_BUTTON.to_owned(),
            close_btn_class: String::new(),
            content: String::new(),
            custom_class: String::new(),
            escape_close: true,
            header_fixed: false,
            height: None,
            id: String::new(),
            responsive: true,
            responsive_brink: 50,
            template: DEFAULT_TEMPLATE.to_owned(),
            title: String::new(),
            transition: "fade".to_owned(),
            transition_duration_ms: 400,
            width: None,
        }
    }
}

impl ModalConfig {
    /// Defaults with the given identifier.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Generated identifier for the `ordinal`-th constructed modal (1-based).
    #[must_use]
    pub fn generated_id(ordinal: u64) -> String {
        format!("{DEFAULT_ID_PREFIX}{ordinal}")
    }

    /// Open/close animation length.
    #[must_use]
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    /// Delay after a close starts before triggers are accepted again.
    #[must_use]
    pub fn trigger_reset_delay(&self) -> Duration {
        self.transition_duration().max(MIN_TRIGGER_RESET)
    }
}

/// Deserialize a present field (even `null`) as `Some(..)`.
fn explicit<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// User overrides. `None` keeps the default.
///
/// `height` and `width` are doubly optional: `Some(None)` explicitly unsets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModalOptions {
    pub add_close_btn: Option<bool>,
    pub attributes: Option<BTreeMap<String, String>>,
    pub auto_open: Option<bool>,
    pub close_by_overlay: Option<bool>,
    pub close_btn: Option<String>,
    pub close_btn_class: Option<String>,
    pub content: Option<String>,
    pub custom_class: Option<String>,
    pub escape_close: Option<bool>,
    pub header_fixed: Option<bool>,
    #[serde(deserialize_with = "explicit")]
    pub height: Option<Option<u32>>,
    pub id: Option<String>,
    pub responsive: Option<bool>,
    pub responsive_brink: Option<u32>,
    pub template: Option<String>,
    pub title: Option<String>,
    pub transition: Option<String>,
    #[serde(rename = "transitionDuration")]
    pub transition_duration_ms: Option<u64>,
    #[serde(deserialize_with = "explicit")]
    pub width: Option<Option<u32>>,
}

impl ModalOptions {
    /// Every recognized option key.
    pub const KEYS: &'static [&'static str] = &[
        "addCloseBtn",
        "attributes",
        "autoOpen",
        "closeByOverlay",
        "closeBtn",
        "closeBtnClass",
        "content",
        "customClass",
        "escapeClose",
        "headerFixed",
        "height",
        "id",
        "responsive",
        "responsiveBrink",
        "template",
        "title",
        "transition",
        "transitionDuration",
        "width",
    ];

    /// Empty overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ModalError::MalformedOptions(e.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Build overrides from a JSON value.
    ///
    /// Anything other than an object yields empty overrides.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Ok(Self::default());
        };
        if map.get("id").is_some_and(|id| !id.is_string()) {
            return Err(ModalError::InvalidIdentifierType);
        }
        serde_json::from_value(value.clone()).map_err(|err| {
            // Re-check keys one at a time to name the offender.
            let offender = map.iter().find(|(key, v)| {
                let single = Value::Object([((*key).clone(), (*v).clone())].into_iter().collect());
                serde_json::from_value::<Self>(single).is_err()
            });
            match offender {
                Some((key, _)) => ModalError::InvalidType {
                    key: key.clone(),
                    reason: err.to_string(),
                },
                None => ModalError::MalformedOptions(err.to_string()),
            }
        })
    }

    pub fn add_close_btn(mut self, value: bool) -> Self {
        self.add_close_btn = Some(value);
        self
    }

    /// Replace the `data-*` attribute map.
    pub fn attributes<K, V>(mut self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes = Some(
            attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn auto_open(mut self, value: bool) -> Self {
        self.auto_open = Some(value);
        self
    }

    pub fn close_by_overlay(mut self, value: bool) -> Self {
        self.close_by_overlay = Some(value);
        self
    }

    pub fn close_btn(mut self, markup: impl Into<String>) -> Self {
        self.close_btn = Some(markup.into());
        self
    }

    pub fn close_btn_class(mut self, classes: impl Into<String>) -> Self {
        self.close_btn_class = Some(classes.into());
        self
    }

    pub fn content(mut self, markup: impl Into<String>) -> Self {
        self.content = Some(markup.into());
        self
    }

    pub fn custom_class(mut self, classes: impl Into<String>) -> Self {
        self.custom_class = Some(classes.into());
        self
    }

    pub fn escape_close(mut self, value: bool) -> Self {
        self.escape_close = Some(value);
        self
    }

    pub fn header_fixed(mut self, value: bool) -> Self {
        self.header_fixed = Some(value);
        self
    }

    pub fn height(mut self, px: u32) -> Self {
        self.height = Some(Some(px));
        self
    }

    pub fn width(mut self, px: u32) -> Self {
        self.width = Some(Some(px));
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn responsive(mut self, value: bool) -> Self {
        self.responsive = Some(value);
        self
    }

    pub fn responsive_brink(mut self, px: u32) -> Self {
        self.responsive_brink = Some(px);
        self
    }

    pub fn template(mut self, markup: impl Into<String>) -> Self {
        self.template = Some(markup.into());
        self
    }

    pub fn title(mut self, markup: impl Into<String>) -> Self {
        self.title = Some(markup.into());
        self
    }

    pub fn transition(mut self, name: impl Into<String>) -> Self {
        self.transition = Some(name.into());
        self
    }

    pub fn transition_duration_ms(mut self, ms: u64) -> Self {
        self.transition_duration_ms = Some(ms);
        self
    }
}

/// Merge `overrides` over `defaults`.
#[must_use]
pub fn resolve(defaults: &ModalConfig, overrides: &ModalOptions) -> ModalConfig {
    let mut config = defaults.clone();
    let o = overrides.clone();

    if let Some(v) = o.add_close_btn {
        config.add_close_btn = v;
    }
    if let Some(v) = o.attributes {
        config.attributes = v;
    }
    if let Some(v) = o.auto_open {
        config.auto_open = v;
    }
    if let Some(v) = o.close_by_overlay {
        config.close_by_overlay = v;
    }
    if let Some(v) = o.close_btn {
        config.close_btn = v;
    }
    if let Some(v) = o.close_btn_class {
        config.close_btn_class = v;
    }
    if let Some(v) = o.content {
        config.content = v;
    }
    if let Some(v) = o.custom_class {
        config.custom_class = v;
    }
    if let Some(v) = o.escape_close {
        config.escape_close = v;
    }
    if let Some(v) = o.header_fixed {
        config.header_fixed = v;
    }
    if let Some(v) = o.height {
        config.height = v;
    }
    if let Some(v) = o.id {
        config.id = v;
    }
    if let Some(v) = o.responsive {
        config.responsive = v;
    }
    if let Some(v) = o.responsive_brink {
        config.responsive_brink = v;
    }
    if let Some(v) = o.template {
        config.template = v;
    }
    if let Some(v) = o.title {
        config.title = v;
    }
    if let Some(v) = o.transition {
        config.transition = v;
    }
    if let Some(v) = o.transition_duration_ms {
        config.transition_duration_ms = v;
    }
    if let Some(v) = o.width {
        config.width = v;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_values() {
        let config = ModalConfig::with_id("modal1");
        assert!(config.add_close_btn);
        assert!(config.close_by_overlay);
        assert!(config.escape_close);
        assert!(config.responsive);
        assert!(!config.auto_open);
        assert!(!config.header_fixed);
        assert_eq!(config.close_btn, "&#10006");
        assert_eq!(config.responsive_brink, 50);
        assert_eq!(config.transition, "fade");
        assert_eq!(config.transition_duration(), Duration::from_millis(400));
        assert_eq!(config.height, None);
        assert_eq!(config.width, None);
        assert_eq!(config.template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn generated_ids_are_sequential() {
        assert_eq!(ModalConfig::generated_id(1), "modal1");
        assert_eq!(ModalConfig::generated_id(12), "modal12");
    }

    #[test]
    fn trigger_reset_has_a_floor() {
        let mut config = ModalConfig::default();
        config.transition_duration_ms = 100;
        assert_eq!(config.trigger_reset_delay(), Duration::from_millis(600));
        config.transition_duration_ms = 900;
        assert_eq!(config.trigger_reset_delay(), Duration::from_millis(900));
    }

    #[test]
    fn resolve_keeps_unset_fields() {
        let defaults = ModalConfig::with_id("modal3");
        let config = resolve(&defaults, &ModalOptions::new().escape_close(false));
        assert!(!config.escape_close);
        assert_eq!(config.id, "modal3");
        assert_eq!(config.transition, "fade");
    }

    #[test]
    fn attributes_replace_wholesale() {
        let mut defaults = ModalConfig::default();
        defaults.attributes.insert("keep".into(), "no".into());
        let config = resolve(&defaults, &ModalOptions::new().attributes([("role", "alert")]));
        assert_eq!(config.attributes.len(), 1);
        assert_eq!(config.attributes.get("role").map(String::as_str), Some("alert"));
    }

    #[test]
    fn json_unknown_keys_are_ignored() {
        let options =
            ModalOptions::from_json(r#"{"title":"Hi","bogus":42,"transitionDuration":300}"#)
                .expect("valid options");
        assert_eq!(options.title.as_deref(), Some("Hi"));
        assert_eq!(options.transition_duration_ms, Some(300));
    }

    #[test]
    fn json_null_unsets_dimensions() {
        let mut defaults = ModalConfig::default();
        defaults.width = Some(500);
        defaults.height = Some(200);
        let options = ModalOptions::from_json(r#"{"width":null}"#).expect("valid options");
        let config = resolve(&defaults, &options);
        assert_eq!(config.width, None);
        assert_eq!(config.height, Some(200));
    }

    #[test]
    fn json_non_string_id_is_rejected() {
        assert_eq!(
            ModalOptions::from_json_value(&json!({"id": 7})),
            Err(ModalError::InvalidIdentifierType)
        );
    }

    #[test]
    fn json_type_mismatch_names_the_key() {
        let err = ModalOptions::from_json_value(&json!({"title": "ok", "closeByOverlay": "yes"}))
            .expect_err("type mismatch");
        assert!(matches!(err, ModalError::InvalidType { ref key, .. } if key == "closeByOverlay"));
    }

    #[test]
    fn json_negative_duration_is_rejected() {
        let err = ModalOptions::from_json_value(&json!({"transitionDuration": -5}))
            .expect_err("negative duration");
        assert!(matches!(err, ModalError::InvalidType { ref key, .. } if key == "transitionDuration"));
    }

    #[test]
    fn json_non_object_is_empty() {
        assert_eq!(
            ModalOptions::from_json_value(&json!("title")),
            Ok(ModalOptions::default())
        );
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            ModalOptions::from_json("{"),
            Err(ModalError::MalformedOptions(_))
        ));
    }

    #[test]
    fn keys_cover_the_config() {
        let value = serde_json::to_value(ModalConfig::default()).expect("serializable");
        let Value::Object(map) = value else {
            panic!("config serializes to an object");
        };
        let mut serialized: Vec<&str> = map.keys().map(String::as_str).collect();
        serialized.sort_unstable();
        let mut keys = ModalOptions::KEYS.to_vec();
        keys.sort_unstable();
        assert_eq!(serialized, keys);
    }
}
