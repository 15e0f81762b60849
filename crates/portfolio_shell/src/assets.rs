//! Preloaded ASCII art and the `[[...]]` placeholders that reference it.

use std::collections::BTreeMap;

use crt_term::AssetResolver;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Placeholder identifier for the profile picture.
pub const PROFILE_ART_KEY: &str = "PROFILE_ART";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(PROFILE_ART|ICON:(.*?))\]\]").expect("placeholder pattern"));

/// Art keyed by placeholder identifier. Icon keys are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetCache {
    profile_art: Option<String>,
    icons: BTreeMap<String, String>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_profile_art(&mut self, art: impl Into<String>) {
        self.profile_art = Some(art.into());
    }

    /// Store icon art; it is printed on its own lines between the skill separator and the item.
    pub fn insert_icon(&mut self, key: &str, art: &str) {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        self.icons.insert(key, format!("\n{}\n", art.trim_matches('\n')));
    }

    pub fn profile_art(&self) -> Option<&str> {
        self.profile_art.as_deref()
    }

    pub fn icon(&self, key: &str) -> Option<&str> {
        self.icons.get(key).map(String::as_str)
    }

    pub fn icon_count(&self) -> usize {
        self.icons.len()
    }

    /// The icon key for a skill name: an exact match, or one name containing the other.
    pub fn icon_key_for(&self, name: &str) -> Option<&str> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }
        self.icons
            .keys()
            .find(|key| **key == name || name.contains(key.as_str()) || key.contains(&name))
            .map(String::as_str)
    }
}

impl AssetResolver for AssetCache {
    /// Unknown icons resolve to nothing; a missing profile picture does too.
    fn resolve(&self, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &Captures<'_>| match caps.get(2) {
                Some(key) => self
                    .icon(&key.as_str().to_lowercase())
                    .unwrap_or_default()
                    .to_string(),
                None => self.profile_art.clone().unwrap_or_default(),
            })
            .into_owned()
    }
}
