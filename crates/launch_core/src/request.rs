use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a screen the host knows how to open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(String);

impl ScreenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScreenId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Started from the home screen / app launcher.
    Launcher,
    Default,
    Browsable,
}

/// How the launch screen was entered. Created by the host, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub target: Option<ScreenId>,
    pub original: Option<Box<LaunchRequest>>,
    #[serde(default)]
    pub categories: BTreeSet<Category>,
    pub action: Option<String>,
    pub data: Option<String>,
    #[serde(default)]
    pub extras: BTreeMap<String, Value>,
}

impl LaunchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request the home-screen launcher produces.
    pub fn from_launcher() -> Self {
        Self::new().with_category(Category::Launcher)
    }

    /// Builds the request used to re-enter the launch screen from inside the
    /// app, optionally redirecting to `target` and carrying `original` along.
    pub fn for_launch_screen(target: Option<ScreenId>, original: Option<LaunchRequest>) -> Self {
        Self {
            target,
            original: original.map(Box::new),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<ScreenId>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_original(mut self, original: LaunchRequest) -> Self {
        self.original = Some(Box::new(original));
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.insert(category);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_data(mut self, uri: impl Into<String>) -> Self {
        self.data = Some(uri.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    pub fn is_from_launcher(&self) -> bool {
        self.has_category(Category::Launcher)
    }
}

/// Result code and payload returned by a screen opened for result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenResult {
    pub code: i32,
    pub payload: Option<LaunchRequest>,
}

impl ScreenResult {
    pub const OK: i32 = -1;
    pub const CANCELED: i32 = 0;

    pub fn new(code: i32, payload: Option<LaunchRequest>) -> Self {
        Self { code, payload }
    }
}
