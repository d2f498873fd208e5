use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use launch_core::ports::ConfigStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConfig {
    #[serde(default)]
    pub location_requested: bool,
    #[serde(default)]
    pub first_start_dialog_seen: bool,
    #[serde(default)]
    pub launch_count: u32,
    pub first_launch_at: Option<DateTime<Utc>>,
    pub last_launch_at: Option<DateTime<Utc>>,
}

/// Preferences kept in a JSON file. Without a path everything stays in memory.
#[derive(Clone, Debug)]
pub struct FileConfigStore {
    path: Option<PathBuf>,
    data: Arc<RwLock<PersistedConfig>>,
}

impl FileConfigStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Arc::new(RwLock::new(PersistedConfig::default())),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.is_file() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("unable to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("malformed launch state in {}", path.display()))?
        } else {
            PersistedConfig::default()
        };
        debug!(path = %path.display(), "launch state loaded");
        Ok(Self {
            path: Some(path),
            data: Arc::new(RwLock::new(data)),
        })
    }

    pub fn snapshot(&self) -> PersistedConfig {
        self.data.read().clone()
    }

    fn update(&self, apply: impl FnOnce(&mut PersistedConfig)) {
        let snapshot = {
            let mut data = self.data.write();
            apply(&mut data);
            data.clone()
        };
        if let Err(err) = self.persist(&snapshot) {
            warn!(%err, "unable to persist launch state");
        }
    }

    fn persist(&self, snapshot: &PersistedConfig) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn is_location_requested(&self) -> bool {
        self.data.read().location_requested
    }

    fn set_location_requested(&self) {
        self.update(|data| data.location_requested = true);
    }

    fn is_first_launch(&self) -> bool {
        self.data.read().launch_count <= 1
    }

    fn set_first_start_dialog_seen(&self) {
        self.update(|data| data.first_start_dialog_seen = true);
    }

    fn update_counters(&self) {
        let now = Utc::now();
        self.update(|data| {
            data.launch_count = data.launch_count.saturating_add(1);
            if data.first_launch_at.is_none() {
                data.first_launch_at = Some(now);
            }
            data.last_launch_at = Some(now);
        });
    }
}
