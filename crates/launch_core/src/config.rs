use std::time::Duration;

use crate::request::ScreenId;

pub const DEFAULT_INIT_DELAY: Duration = Duration::from_millis(100);
pub const DOWNLOAD_RESOURCES_SCREEN: &str = "download_resources";
pub const MAP_PLACEHOLDER_SCREEN: &str = "map_placeholder";

#[derive(Clone, Debug)]
pub struct SequencerConfig {
    /// Pause before subsystem initialization so the first frame can render.
    pub init_delay: Duration,
    pub default_destination: ScreenId,
    /// Opened instead of anything else while a car display is attached.
    pub placeholder_destination: ScreenId,
}

impl SequencerConfig {
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    pub fn with_default_destination(mut self, destination: impl Into<ScreenId>) -> Self {
        self.default_destination = destination.into();
        self
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            init_delay: DEFAULT_INIT_DELAY,
            default_destination: ScreenId::new(DOWNLOAD_RESOURCES_SCREEN),
            placeholder_destination: ScreenId::new(MAP_PLACEHOLDER_SCREEN),
        }
    }
}
