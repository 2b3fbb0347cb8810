//! The fixed catalog of commands the extension exposes.

use std::fmt;

/// Which way a converter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Latin transliteration to the target script
    Forward,
    /// Target script back to Latin transliteration
    Reverse,
}

impl Direction {
    pub fn from_reversed(reversed: bool) -> Self {
        if reversed {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    pub fn is_reversed(&self) -> bool {
        *self == Direction::Reverse
    }
}

/// How an endpoint acts on the window it is bound in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndPointKind {
    /// Converts the whole current selection at once
    Batch,
    /// Toggles an input mode that converts keystrokes as they are typed
    Map,
}

impl fmt::Display for EndPointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndPointKind::Batch => f.write_str("batch"),
            EndPointKind::Map => f.write_str("map"),
        }
    }
}

/// One entry of the command catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTemplate {
    pub id: &'static str,
    pub kind: EndPointKind,
    pub direction: Direction,
}

impl CommandTemplate {
    /// Command identifier registered with the host, e.g. `cmd_fromtranslit`.
    pub fn command_id(&self) -> String {
        format!("cmd_{}", self.id)
    }

    /// Preference name holding the menu label.
    pub fn label_pref(&self) -> String {
        format!("commands.{}.label", self.id)
    }

    /// Preference name holding the shortcut string.
    pub fn shortcut_pref(&self) -> String {
        format!("commands.{}.shortcut", self.id)
    }
}

/// Commands in the order endpoints are built and shown.
pub const COMMAND_TEMPLATES: [CommandTemplate; 3] = [
    CommandTemplate {
        id: "fromtranslit",
        kind: EndPointKind::Batch,
        direction: Direction::Forward,
    },
    CommandTemplate {
        id: "totranslit",
        kind: EndPointKind::Batch,
        direction: Direction::Reverse,
    },
    CommandTemplate {
        id: "togglemode",
        kind: EndPointKind::Map,
        direction: Direction::Forward,
    },
];
