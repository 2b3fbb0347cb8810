//! Built command endpoints.

use std::fmt;
use std::sync::Arc;

use translit_core::{CommandTemplate, EndPointKind, KeyBinding};
use translit_layout::Converter;

/// One user-facing command: label, shortcut, action kind and converter.
///
/// Endpoints are immutable. A preference change produces a whole new list.
#[derive(Debug, Clone)]
pub struct EndPoint {
    command_id: String,
    label: String,
    binding: KeyBinding,
    kind: EndPointKind,
    converter: Arc<Converter>,
}

/// A complete endpoint list, shared by every window delegate.
pub type EndPoints = Arc<Vec<EndPoint>>;

impl EndPoint {
    pub fn new(
        template: &CommandTemplate,
        label: String,
        binding: KeyBinding,
        converter: Arc<Converter>,
    ) -> Self {
        Self {
            command_id: template.command_id(),
            label,
            binding,
            kind: template.kind,
            converter,
        }
    }

    /// Command identifier, e.g. `cmd_togglemode`.
    pub fn command_id(&self) -> &str {
        &self.command_id
    }

    /// Menu label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Keyboard shortcut; empty when the command is unbound.
    pub fn binding(&self) -> &KeyBinding {
        &self.binding
    }

    pub fn kind(&self) -> EndPointKind {
        self.kind
    }

    pub fn converter(&self) -> &Arc<Converter> {
        &self.converter
    }
}

impl fmt::Display for EndPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] \"{}\" {} ({} {:?})",
            self.command_id,
            self.kind,
            self.label,
            self.binding,
            self.converter.layout(),
            self.converter.direction()
        )
    }
}
