//! Line editor keybindings.
//!
//! Every [`EditorAction`] has a list of key ids. Overrides replace an action's whole list; when
//! two actions share a key, the one earlier in [`EditorAction::ALL`] wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    Submit,
    Tab,
    DeleteCharBackward,
    DeleteCharForward,
    CursorLeft,
    CursorRight,
    HistoryPrevious,
    HistoryNext,
    Copy,
    Paste,
}

impl EditorAction {
    pub const ALL: [EditorAction; 10] = [
        EditorAction::Submit,
        EditorAction::Tab,
        EditorAction::DeleteCharBackward,
        EditorAction::DeleteCharForward,
        EditorAction::CursorLeft,
        EditorAction::CursorRight,
        EditorAction::HistoryPrevious,
        EditorAction::HistoryNext,
        EditorAction::Copy,
        EditorAction::Paste,
    ];
}

/// Normalized key identifier: optional `ctrl+`, `alt+`, `meta+`, `shift+` prefixes (in that
/// order) followed by a lowercase key name, e.g. `"enter"`, `"ctrl+c"`, `"shift+insert"`.
pub type KeyId = String;

pub const DEFAULT_EDITOR_KEYBINDINGS: &[(EditorAction, &[&str])] = &[
    (EditorAction::Submit, &["enter"]),
    (EditorAction::Tab, &["tab"]),
    (EditorAction::DeleteCharBackward, &["backspace"]),
    (EditorAction::DeleteCharForward, &["delete"]),
    (EditorAction::CursorLeft, &["left"]),
    (EditorAction::CursorRight, &["right"]),
    (EditorAction::HistoryPrevious, &["up"]),
    (EditorAction::HistoryNext, &["down"]),
    (EditorAction::Copy, &["ctrl+c"]),
    (EditorAction::Paste, &["ctrl+v", "shift+insert"]),
];

/// Per-action overrides applied on top of [`DEFAULT_EDITOR_KEYBINDINGS`].
#[derive(Debug, Clone, Default)]
pub struct EditorKeybindingsConfig {
    overrides: HashMap<EditorAction, Vec<KeyId>>,
}

impl EditorKeybindingsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind<I, K>(&mut self, action: EditorAction, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys = keys.into_iter().map(|key| normalize_key_id(key.as_ref()));
        self.overrides.insert(action, keys.collect());
        self
    }
}

/// Canonical form of a key id so `"Shift+Ctrl+V"` and `"ctrl+shift+v"` compare equal.
pub fn normalize_key_id(key_id: &str) -> KeyId {
    let lowered = key_id.to_ascii_lowercase();
    let (modifiers, key) = match lowered.strip_suffix("++") {
        Some(rest) => (rest, "+"),
        None if lowered == "+" => ("", "+"),
        None => lowered.rsplit_once('+').unwrap_or(("", lowered.as_str())),
    };
    let held: Vec<&str> = modifiers.split('+').collect();
    let mut normalized: String = ["ctrl", "alt", "meta", "shift"]
        .into_iter()
        .filter(|modifier| held.contains(modifier))
        .map(|modifier| format!("{modifier}+"))
        .collect();
    normalized.push_str(key);
    normalized
}

/// Whether a normalized key id carries ctrl, alt or meta.
pub fn has_command_modifier(key_id: &str) -> bool {
    ["ctrl+", "alt+", "meta+"]
        .iter()
        .any(|prefix| key_id.starts_with(prefix))
}

#[derive(Debug)]
pub struct EditorKeybindingsManager {
    bindings: Vec<(EditorAction, Vec<KeyId>)>,
}

impl EditorKeybindingsManager {
    pub fn new(config: EditorKeybindingsConfig) -> Self {
        let bindings = EditorAction::ALL
            .into_iter()
            .map(|action| {
                let keys = config.overrides.get(&action).cloned().unwrap_or_else(|| {
                    default_keys(action)
                        .iter()
                        .map(|key| normalize_key_id(key))
                        .collect()
                });
                (action, keys)
            })
            .collect();
        Self { bindings }
    }

    pub fn matches(&self, key_id: &str, action: EditorAction) -> bool {
        let key_id = normalize_key_id(key_id);
        self.keys(action).iter().any(|key| *key == key_id)
    }

    pub fn action_for(&self, key_id: &str) -> Option<EditorAction> {
        let key_id = normalize_key_id(key_id);
        self.bindings
            .iter()
            .find(|(_, keys)| keys.contains(&key_id))
            .map(|(action, _)| *action)
    }

    pub fn keys(&self, action: EditorAction) -> &[KeyId] {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == action)
            .map(|(_, keys)| keys.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for EditorKeybindingsManager {
    fn default() -> Self {
        Self::new(EditorKeybindingsConfig::default())
    }
}

fn default_keys(action: EditorAction) -> &'static [&'static str] {
    DEFAULT_EDITOR_KEYBINDINGS
        .iter()
        .find(|(bound, _)| *bound == action)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// Shared keybindings so the shell and the editor resolve keys the same way.
pub type EditorKeybindingsHandle = Arc<Mutex<EditorKeybindingsManager>>;

pub fn default_editor_keybindings_handle() -> EditorKeybindingsHandle {
    Arc::new(Mutex::new(EditorKeybindingsManager::default()))
}

#[cfg(test)]
mod tests {
    use super::{
        has_command_modifier, normalize_key_id, EditorAction, EditorKeybindingsConfig,
        EditorKeybindingsManager,
    };

    #[test]
    fn default_bindings() {
        let manager = EditorKeybindingsManager::default();
        assert!(manager.matches("up", EditorAction::HistoryPrevious));
        assert!(manager.matches("down", EditorAction::HistoryNext));
        assert!(manager.matches("enter", EditorAction::Submit));
        assert!(manager.matches("Shift+Insert", EditorAction::Paste));
        assert_eq!(manager.action_for("tab"), Some(EditorAction::Tab));
        assert_eq!(manager.action_for("f5"), None);
        assert_eq!(manager.keys(EditorAction::Paste).len(), 2);
    }

    #[test]
    fn an_override_replaces_the_whole_list() {
        let mut config = EditorKeybindingsConfig::new();
        config.bind(EditorAction::Submit, ["Ctrl+J"]);
        let manager = EditorKeybindingsManager::new(config);
        assert!(manager.matches("ctrl+j", EditorAction::Submit));
        assert!(!manager.matches("enter", EditorAction::Submit));
    }

    #[test]
    fn earlier_actions_win_shared_keys() {
        let mut config = EditorKeybindingsConfig::new();
        config.bind(EditorAction::Paste, ["enter"]);
        let manager = EditorKeybindingsManager::new(config);
        assert_eq!(manager.action_for("enter"), Some(EditorAction::Submit));
    }

    #[test]
    fn key_ids_normalize_modifier_order_and_case() {
        assert_eq!(normalize_key_id("Shift+Ctrl+V"), "ctrl+shift+v");
        assert_eq!(normalize_key_id("ctrl++"), "ctrl++");
        assert_eq!(normalize_key_id("+"), "+");
        assert_eq!(normalize_key_id("Enter"), "enter");
        assert!(has_command_modifier("ctrl+c"));
        assert!(!has_command_modifier("shift+insert"));
    }
}
