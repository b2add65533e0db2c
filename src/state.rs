//! Application state: remote store client, Gemini client, prompts, and curriculum.
//!
//! Everything here is immutable after startup; the remote store is the only
//! shared mutable resource and lives on the other side of HTTP.

use tracing::{info, instrument, warn};

use crate::config::{load_app_config_from_env, Prompts};
use crate::curriculum::Curriculum;
use crate::gemini::Gemini;
use crate::store::SheetStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Option<SheetStore>,
    pub gemini: Option<Gemini>,
    pub prompts: Prompts,
    pub curriculum: Curriculum,
}

impl AppState {
    /// Build state from env: load config, build the curriculum, init clients.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();
        let curriculum = Curriculum::with_overrides(&cfg.curriculum);

        let store = SheetStore::from_env();
        match &store {
            Some(s) => info!(target: "odap_backend", url = %s.url, "Record store enabled."),
            None => warn!(target: "odap_backend", "Record store disabled (RECORD_STORE_URL unset or client build failed); reads return empty lists and saves fail."),
        }

        let gemini = Gemini::from_env();
        match &gemini {
            Some(g) => info!(target: "odap_backend", base_url = %g.base_url, models = ?g.models, "Gemini enabled."),
            None => info!(target: "odap_backend", "Gemini disabled (GEMINI_API_KEY unset or client build failed). Categorization unavailable."),
        }

        Self { store, gemini, prompts: cfg.prompts, curriculum }
    }

    /// Assemble state from ready-made parts (used by tests).
    #[cfg(test)]
    pub fn from_parts(store: Option<SheetStore>, gemini: Option<Gemini>) -> Self {
        Self {
            store,
            gemini,
            prompts: Prompts::default(),
            curriculum: Curriculum::default(),
        }
    }
}
