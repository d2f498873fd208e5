use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::InitError,
    request::{LaunchRequest, ScreenId, ScreenResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    CoarseLocation,
    FineLocation,
}

/// Handle of a delayed task issued by a [`DelayScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(pub u64);

/// Token an initializer hands back when it will finish later. The host returns
/// it through `LaunchSequencer::on_init_complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Initialization already finished.
    Ready,
    /// Initialization continues in the background.
    Pending(CompletionToken),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatalNotice {
    pub title: String,
    pub message: String,
}

impl FatalNotice {
    pub fn storage() -> Self {
        Self {
            title: "dialog_error_storage_title".to_string(),
            message: "dialog_error_storage_message".to_string(),
        }
    }
}

/// Runtime permission dialogs. The grant result arrives later through
/// `LaunchSequencer::on_permission_result`.
pub trait PermissionProvider {
    fn request(&self, kinds: &BTreeSet<PermissionKind>);
    fn check_granted(&self, kind: PermissionKind) -> bool;
}

/// Persistent application preferences. Implementations swallow their own I/O
/// failures.
pub trait ConfigStore {
    fn is_location_requested(&self) -> bool;
    fn set_location_requested(&self);
    fn is_first_launch(&self) -> bool;
    fn set_first_start_dialog_seen(&self);
    fn update_counters(&self);
}

pub trait SubsystemInitializer {
    fn init(&self) -> Result<InitOutcome, InitError>;
}

pub trait LocationSubsystem {
    fn on_entered_first_run(&self);
    fn is_active(&self) -> bool;
    fn start(&self);
}

/// Opens screens and closes the launch screen. A result for
/// `launch_for_result` arrives later through
/// `LaunchSequencer::on_destination_result`.
pub trait ScreenLauncher {
    fn launch(&self, destination: &ScreenId, payload: &LaunchRequest);
    fn launch_for_result(&self, destination: &ScreenId, payload: &LaunchRequest);
    fn finish(&self, result: Option<&ScreenResult>);
}

/// One-shot timers on the UI event loop. Expiry is reported through
/// `LaunchSequencer::on_timer_elapsed`.
pub trait DelayScheduler {
    fn schedule(&self, delay: Duration) -> TaskHandle;
    fn cancel(&self, handle: TaskHandle);
}

/// Blocking, non-cancelable error dialog with a single close action.
pub trait FatalAlert {
    fn show(&self, notice: &FatalNotice);
}

pub trait DisplayProbe {
    fn is_car_display_used(&self) -> bool;
}

pub(crate) fn location_granted(permissions: &dyn PermissionProvider) -> bool {
    permissions.check_granted(PermissionKind::FineLocation)
        || permissions.check_granted(PermissionKind::CoarseLocation)
}
