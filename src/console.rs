//! Forwarding of warnings and errors to the host's console.
//!
//! A host embedding the service installs [`ConsoleLayer`] next to its own
//! subscriber layers. The `translit` binary has no host console and logs to
//! stderr only.

use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::APP_NAME_PRETTY;

/// The host's user-visible message console.
pub trait HostConsole: Send + Sync {
    fn log_string_message(&self, message: &str);
}

/// Visitor to extract the message field from tracing events.
struct MessageVisitor {
    message: Option<String>,
}

impl MessageVisitor {
    fn new() -> Self {
        Self { message: None }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}

/// Tracing layer that copies warnings and errors to a [`HostConsole`].
pub struct ConsoleLayer {
    console: Arc<dyn HostConsole>,
}

impl ConsoleLayer {
    pub fn new(console: Arc<dyn HostConsole>) -> Self {
        Self { console }
    }
}

fn should_forward(level: Level) -> bool {
    matches!(level, Level::ERROR | Level::WARN)
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        if !should_forward(*event.metadata().level()) {
            return;
        }

        let mut visitor = MessageVisitor::new();
        event.record(&mut visitor);

        if let Some(message) = visitor.message {
            self.console
                .log_string_message(&format!("{}: {}", APP_NAME_PRETTY, message));
        }
    }
}
