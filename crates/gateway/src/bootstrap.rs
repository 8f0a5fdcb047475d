//! AppState construction shared by `serve` and any future CLI commands.

use std::sync::Arc;

use gl_domain::config::{Config, ConfigSeverity};
use gl_engine::Engine;
use gl_mirror::{FsObjectStore, MirrorAdapter};
use gl_upstream::HttpUpstream;

use crate::state::AppState;

/// Validate config and wire every subsystem into an [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Upstream client + engine ─────────────────────────────────────
    let engine = match HttpUpstream::from_config(&config.upstream)? {
        Some(upstream) => {
            tracing::info!(base_url = %config.upstream.base_url, "upstream client ready");
            Some(Arc::new(Engine::new(Arc::new(upstream), &config.run)))
        }
        None => {
            tracing::warn!(
                env = %config.upstream.api_key_env,
                "no upstream credential — grounded chat disabled"
            );
            None
        }
    };

    // ── Mirror store ─────────────────────────────────────────────────
    let mirror = match &config.mirror.root {
        Some(root) => {
            std::fs::create_dir_all(root)?;
            tracing::info!(root = %root.display(), "mirror store ready");
            Some(Arc::new(MirrorAdapter::new(
                Arc::new(FsObjectStore::new(root.clone())),
                config.mirror.key_prefix.clone(),
            )))
        }
        None => {
            tracing::info!("mirroring not configured — citation source viewing disabled");
            None
        }
    };

    Ok(AppState {
        config,
        engine,
        mirror,
    })
}
