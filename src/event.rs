use std::cell::RefCell;

use crate::tools::ToolKind;

/// Notifications a studio session broadcasts to its host.
///
/// `SaveFailed` is how asynchronous persistence failures surface: the
/// session's in-memory state is already updated and stays authoritative; the
/// host decides whether to badge the UI, retry, or ignore.
#[derive(Debug, Clone, PartialEq)]
pub enum StudioEvent {
    ToolChanged { kind: ToolKind },
    FrameCommitted { index: usize },
    FrameSelected { index: usize },
    SaveFailed { index: usize, reason: String },
    PlaybackStarted,
    PlaybackStopped,
}

pub trait EventHandler {
    fn handle_event(&mut self, event: &StudioEvent);
}

/// A simple broadcast bus for session events.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to receive all subsequent events.
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    /// Deliver an event to every registered handler.
    pub fn emit(&self, event: StudioEvent) {
        for handler in &mut *self.handlers.borrow_mut() {
            handler.handle_event(&event);
        }
    }
}
