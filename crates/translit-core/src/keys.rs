//! Shortcut string parsing.
//!
//! Shortcuts are stored as free text such as `"Ctrl+Shift+VK_Q"`. Parsing is
//! deliberately loose: the string is lowercased, the first `vk_<alnum>`
//! token becomes the key code, and every modifier name found anywhere in the
//! string is switched on. Separators are ignored.
//!
//! Modifier detection is plain substring matching, so a key code that
//! contains a modifier name (`VK_ALT`) also switches that modifier on.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static KEY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vk_[a-z0-9]+").expect("key code pattern is valid"));

/// Modifier keys, declared in their canonical rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    /// The platform's primary shortcut key (control or meta)
    Accel,
    Alt,
    Control,
    Meta,
    Shift,
}

impl Modifier {
    /// Every modifier, in canonical order.
    pub const ALL: [Modifier; 5] = [
        Modifier::Accel,
        Modifier::Alt,
        Modifier::Control,
        Modifier::Meta,
        Modifier::Shift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Accel => "accel",
            Modifier::Alt => "alt",
            Modifier::Control => "control",
            Modifier::Meta => "meta",
            Modifier::Shift => "shift",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key code plus the modifiers held with it.
///
/// The empty binding (no key, no modifiers) means the command is unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    key: String,
    modifiers: Vec<Modifier>,
}

impl KeyBinding {
    /// Creates a binding, normalizing the key to upper case and the
    /// modifiers to canonical order.
    pub fn new(key: impl Into<String>, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        let mut modifiers: Vec<Modifier> = modifiers.into_iter().collect();
        modifiers.sort();
        modifiers.dedup();
        Self {
            key: key.into().to_uppercase(),
            modifiers,
        }
    }

    /// The unbound binding.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    /// Key code in upper case, e.g. `VK_Q`. Empty when unbound.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Modifier list as the host expects it, e.g. `"control, shift"`.
    pub fn modifiers_string(&self) -> String {
        self.modifiers
            .iter()
            .map(Modifier::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(unbound)");
        }
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        f.write_str(&self.key)
    }
}

/// Parses a shortcut string. Returns `None` when no `vk_` key code is present.
pub fn parse_key_string(input: &str) -> Option<KeyBinding> {
    let lowered = input.to_lowercase();
    let key = KEY_CODE.find(&lowered)?.as_str().to_uppercase();

    let normalized = lowered.replace("ctrl", "control");
    let modifiers = Modifier::ALL
        .into_iter()
        .filter(|modifier| normalized.contains(modifier.as_str()))
        .collect();

    Some(KeyBinding { key, modifiers })
}
