use crate::error::{Result, TriageError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides `api.token`.
pub const TOKEN_ENV: &str = "TRIAGE_API_TOKEN";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ApiSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    /// Bearer token. `TRIAGE_API_TOKEN` wins when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            request_timeout_secs: default_request_timeout(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Token from the environment, else from the file. Blank values count as
    /// unset.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .or_else(|| self.token.clone())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_overdue_path")]
    pub overdue_submissions: String,
    #[serde(default = "default_notify_path")]
    pub notify: String,
    /// Must contain `{task_id}`.
    #[serde(default = "default_upload_path")]
    pub upload: String,
}

fn default_overdue_path() -> String {
    "/admin/overdue-submissions".to_string()
}

fn default_notify_path() -> String {
    "/admin/overdue-submissions/notify".to_string()
}

fn default_upload_path() -> String {
    "/admin/tasks/{task_id}/submissions".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            overdue_submissions: default_overdue_path(),
            notify: default_notify_path(),
            upload: default_upload_path(),
        }
    }
}

impl Endpoints {
    pub fn upload_for(&self, task_id: i64) -> String {
        self.upload.replace("{task_id}", &task_id.to_string())
    }
}

// ---------------------------------------------------------------------------
// ActionSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSettings {
    /// Upper bound for any single action; `0` disables it.
    #[serde(default = "default_action_timeout")]
    pub timeout_secs: u64,
}

fn default_action_timeout() -> u64 {
    120
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_action_timeout(),
        }
    }
}

impl ActionSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub api: ApiSettings,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub actions: ActionSettings,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            version: 1,
            api: ApiSettings::new(base_url),
            endpoints: Endpoints::default(),
            actions: ActionSettings::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TriageError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Load and refuse configs that have error-level warnings.
    pub fn load_valid(root: &Path) -> Result<Self> {
        let cfg = Self::load(root)?;
        let errors: Vec<String> = cfg
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect();
        if !errors.is_empty() {
            return Err(TriageError::InvalidConfig(errors.join("; ")));
        }
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut push = |level: WarnLevel, message: String| {
            warnings.push(ConfigWarning { level, message })
        };

        let base = self.api.base_url.trim();
        if base.is_empty() {
            push(WarnLevel::Error, "api.base_url is empty".to_string());
        } else if !(base.starts_with("http://") || base.starts_with("https://")) {
            push(
                WarnLevel::Error,
                format!("api.base_url '{base}' must start with http:// or https://"),
            );
        }

        if self.api.request_timeout_secs == 0 {
            push(
                WarnLevel::Warning,
                "api.request_timeout_secs is 0; requests may hang indefinitely".to_string(),
            );
        }

        for (name, path) in [
            ("overdue_submissions", &self.endpoints.overdue_submissions),
            ("notify", &self.endpoints.notify),
            ("upload", &self.endpoints.upload),
        ] {
            if !path.starts_with('/') {
                push(
                    WarnLevel::Warning,
                    format!("endpoints.{name} '{path}' should start with '/'"),
                );
            }
        }

        if !self.endpoints.upload.contains("{task_id}") {
            push(
                WarnLevel::Error,
                format!(
                    "endpoints.upload '{}' must contain the {{task_id}} placeholder",
                    self.endpoints.upload
                ),
            );
        }

        if self.actions.timeout().is_none() {
            push(
                WarnLevel::Warning,
                "actions.timeout_secs is 0; a hung request keeps its row locked".to_string(),
            );
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
