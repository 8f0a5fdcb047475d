use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_port")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3210,
            host: "0.0.0.0".into(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Upstream assistants backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    /// The key itself never lives in the config file.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Model backing lazily-created grounded agents.
    #[serde(default = "d_model")]
    pub model: String,
    /// System instructions given to every grounded agent.
    #[serde(default = "d_instructions")]
    pub instructions: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key_env: d_api_key_env(),
            model: d_model(),
            instructions: d_instructions(),
            timeout_ms: d_timeout_ms(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Run execution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Delay between run-status polls, in milliseconds.
    #[serde(default = "d_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Wall-clock budget for one run, in milliseconds. Enforced locally;
    /// the upstream run is not cancelled when the budget runs out.
    #[serde(default = "d_run_budget_ms")]
    pub budget_ms: u64,
    /// Page size when fetching the newest thread messages after a run.
    #[serde(default = "d_message_page")]
    pub message_page: u32,
    /// Seconds a membership index answers from cache before re-enumeration.
    #[serde(default = "d_index_ttl_secs")]
    pub membership_index_ttl_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: d_poll_interval_ms(),
            budget_ms: d_run_budget_ms(),
            message_page: d_message_page(),
            membership_index_ttl_secs: d_index_ttl_secs(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mirror store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MirrorConfig {
    /// Root directory of the mirror object store. `None` disables mirroring;
    /// chat and citation resolution are unaffected, source viewing 404s.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "d_key_prefix")]
    pub key_prefix: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Config {
    /// Sanity-check the loaded config. Errors prevent boot; warnings are
    /// logged and ignored.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.upstream.base_url.trim().is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "upstream.base_url must not be empty".into(),
            });
        }
        if self.run.poll_interval_ms == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "run.poll_interval_ms must be greater than zero".into(),
            });
        }
        if self.run.budget_ms < self.run.poll_interval_ms {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: "run.budget_ms is shorter than one poll interval — \
                          every run will time out after a single poll"
                    .into(),
            });
        }
        if std::env::var(&self.upstream.api_key_env).is_err() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: format!(
                    "environment variable '{}' not set — grounded chat will \
                     answer 503 until a credential is configured",
                    self.upstream.api_key_env
                ),
            });
        }

        issues
    }
}

// ── Default helpers ────────────────────────────────────────────────

fn d_port() -> u16 {
    3210
}
fn d_host() -> String {
    "0.0.0.0".into()
}
fn d_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_api_key_env() -> String {
    "GROUNDLINE_API_KEY".into()
}
fn d_model() -> String {
    "gpt-4o".into()
}
fn d_instructions() -> String {
    "Answer using only the documents attached to this assistant. \
     Cite the source passages you relied on."
        .into()
}
fn d_timeout_ms() -> u64 {
    120_000
}
fn d_poll_interval_ms() -> u64 {
    800
}
fn d_run_budget_ms() -> u64 {
    60_000
}
fn d_message_page() -> u32 {
    20
}
fn d_index_ttl_secs() -> u64 {
    60
}
fn d_key_prefix() -> String {
    "mirror".into()
}
