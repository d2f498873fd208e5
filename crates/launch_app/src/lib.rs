pub mod app;
pub mod host;
pub mod store;

pub use crate::app::{run, AppConfig};
pub use crate::host::{LaunchReport, Scenario, SimulatedHost};
pub use crate::store::FileConfigStore;
