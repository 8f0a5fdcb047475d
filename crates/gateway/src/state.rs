use std::sync::Arc;

use gl_domain::config::Config;
use gl_domain::error::{Error, Result};
use gl_engine::Engine;
use gl_mirror::MirrorAdapter;

/// Shared application state passed to all API handlers.
///
/// Both optional fields stay `None` on partial configuration rather than
/// failing boot: without an upstream credential, grounded chat answers 503;
/// without a mirror root, citation source fetches answer 404. Everything
/// else keeps working.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Orchestration engine. `None` when no upstream credential is set.
    pub engine: Option<Arc<Engine>>,
    /// Mirror adapter. `None` when mirroring is unconfigured.
    pub mirror: Option<Arc<MirrorAdapter>>,
}

impl AppState {
    /// The engine, or the config error every grounded endpoint maps to 503.
    pub fn engine(&self) -> Result<&Arc<Engine>> {
        self.engine.as_ref().ok_or_else(|| {
            Error::Config(format!(
                "no upstream credential configured (set {})",
                self.config.upstream.api_key_env
            ))
        })
    }

    /// The mirror adapter, or the soft `NotFound` that citation viewing
    /// degrades to when mirroring is off.
    pub fn mirror(&self) -> Result<&Arc<MirrorAdapter>> {
        self.mirror
            .as_ref()
            .ok_or_else(|| Error::NotFound("mirroring is not configured".into()))
    }
}
