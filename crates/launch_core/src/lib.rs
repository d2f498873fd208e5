pub mod config;
pub mod error;
pub mod ports;
pub mod request;
pub mod router;
pub mod sequencer;
pub mod state;

pub use crate::config::SequencerConfig;
pub use crate::error::{InitError, LaunchError};
pub use crate::request::{Category, LaunchRequest, ScreenId, ScreenResult};
pub use crate::router::{NavigationOutcome, Router};
pub use crate::sequencer::{Continuation, LaunchSequencer, LaunchSequencerBuilder};
pub use crate::state::{Phase, SequencerState};
