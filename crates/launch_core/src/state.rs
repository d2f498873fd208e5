use tracing::debug;

use crate::ports::{CompletionToken, TaskHandle};

/// Where the launch screen currently is in its bootstrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingPermission,
    /// Subsystem initialization is waiting for the delayed task to fire.
    InitScheduled(TaskHandle),
    /// The initializer continues in the background.
    AwaitingCompletion(CompletionToken),
    /// The destination was opened for result on behalf of an API caller.
    AwaitingResult,
    Navigated,
    Fatal,
    Destroyed,
}

/// State owned by a single launch screen instance.
#[derive(Debug, Clone, Default)]
pub struct SequencerState {
    phase: Phase,
    canceled: bool,
    visible: bool,
    created: bool,
    finished: bool,
    permission_requested: bool,
}

impl SequencerState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Latched by a fatal initialization failure; never cleared.
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Set once a permission request was issued by this instance.
    pub fn is_permission_requested(&self) -> bool {
        self.permission_requested
    }

    pub fn pending_task(&self) -> Option<TaskHandle> {
        match self.phase {
            Phase::InitScheduled(handle) => Some(handle),
            _ => None,
        }
    }

    pub(crate) fn transition(&mut self, next: Phase) {
        if self.phase != next {
            debug!(from = ?self.phase, to = ?next, "launch phase changed");
        }
        self.phase = next;
    }

    pub(crate) fn cancel(&mut self) {
        self.canceled = true;
        self.transition(Phase::Fatal);
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn mark_created(&mut self) {
        self.created = true;
    }

    pub(crate) fn mark_permission_requested(&mut self) {
        self.permission_requested = true;
    }

    pub(crate) fn mark_finished(&mut self) {
        self.finished = true;
    }
}
