use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use launch_core::{
    config::DEFAULT_INIT_DELAY, Category, LaunchRequest, LaunchSequencer, ScreenId,
    SequencerConfig,
};
use tracing::{info, warn};

use crate::{
    host::{InitMode, LaunchReport, Scenario, SimulatedHost},
    store::FileConfigStore,
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) init_delay: Duration,
    pub(crate) state_path: Option<PathBuf>,
    pub(crate) target: Option<ScreenId>,
    pub(crate) api_caller: bool,
    pub(crate) deep_link: Option<String>,
    pub(crate) scenario: Scenario,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(delay) = std::env::var("LAUNCH_INIT_DELAY_MS") {
            match delay.trim().parse::<u64>() {
                Ok(value) => config.init_delay = Duration::from_millis(value),
                Err(err) => warn!(%err, value = %delay, "ignoring LAUNCH_INIT_DELAY_MS"),
            }
        }
        if let Ok(path) = std::env::var("LAUNCH_STATE_PATH") {
            config.state_path = Some(PathBuf::from(path));
        }
        if let Ok(target) = std::env::var("LAUNCH_TARGET") {
            let target = target.trim();
            if !target.is_empty() {
                config.target = Some(ScreenId::new(target));
            }
        }
        if let Ok(uri) = std::env::var("LAUNCH_DEEP_LINK") {
            config.deep_link = Some(uri);
        }
        if let Some(value) = env_flag("LAUNCH_API_CALLER") {
            config.api_caller = value;
        }
        if let Some(value) = env_flag("LAUNCH_GRANT_LOCATION") {
            config.scenario.grant_location = value;
        }
        if let Some(value) = env_flag("LAUNCH_CAR_DISPLAY") {
            config.scenario.car_display = value;
        }
        if let Ok(mode) = std::env::var("LAUNCH_INIT_MODE") {
            match parse_init_mode(&mode) {
                Some(mode) => config.scenario.init_mode = mode,
                None => warn!(value = %mode, "ignoring LAUNCH_INIT_MODE"),
            }
        }
        if let Ok(code) = std::env::var("LAUNCH_RESULT_CODE") {
            match code.trim().parse::<i32>() {
                Ok(value) => config.scenario.result_code = value,
                Err(err) => warn!(%err, value = %code, "ignoring LAUNCH_RESULT_CODE"),
            }
        }
        Ok(config)
    }

    /// The request the platform would hand to the launch screen.
    pub(crate) fn inbound_request(&self) -> LaunchRequest {
        let mut inbound = if self.api_caller {
            LaunchRequest::new()
                .with_category(Category::Default)
                .with_action("api_request")
        } else {
            LaunchRequest::from_launcher()
        };
        if let Some(uri) = &self.deep_link {
            inbound = inbound.with_data(uri.clone());
        }
        match &self.target {
            Some(target) => LaunchRequest::for_launch_screen(Some(target.clone()), Some(inbound)),
            None => inbound,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            init_delay: DEFAULT_INIT_DELAY,
            state_path: None,
            target: None,
            api_caller: false,
            deep_link: None,
            scenario: Scenario::default(),
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(key, value = %raw, "ignoring unrecognised flag");
            None
        }
    }
}

fn parse_init_mode(raw: &str) -> Option<InitMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ready" => Some(InitMode::Ready),
        "pending" => Some(InitMode::Pending),
        "storage_error" => Some(InitMode::StorageError),
        _ => None,
    }
}

pub fn run(config: AppConfig) -> Result<LaunchReport> {
    let store = match &config.state_path {
        Some(path) => FileConfigStore::open(path).context("failed to open launch state")?,
        None => FileConfigStore::in_memory(),
    };
    let host = SimulatedHost::new(config.scenario.clone());
    let request = config.inbound_request();
    info!(
        api_caller = config.api_caller,
        target = ?config.target,
        "starting launch screen"
    );

    let mut sequencer = LaunchSequencer::builder(request)
        .with_config(SequencerConfig::default().with_init_delay(config.init_delay))
        .with_permissions(Box::new(host.clone()))
        .with_config_store(Box::new(store.clone()))
        .with_initializer(Box::new(host.clone()))
        .with_location(Box::new(host.clone()))
        .with_launcher(Box::new(host.clone()))
        .with_scheduler(Box::new(host.clone()))
        .with_fatal_alert(Box::new(host.clone()))
        .with_display_probe(Box::new(host.clone()))
        .build()
        .context("failed to assemble launch sequencer")?;

    let report = host.run(&mut sequencer);
    info!(
        phase = %report.final_phase,
        transitions = report.transitions.len(),
        launch_count = store.snapshot().launch_count,
        "launch screen closed"
    );
    Ok(report)
}
