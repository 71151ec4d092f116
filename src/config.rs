//! Bridge configuration: defaults, environment overrides and config files.

use crate::ffi::{EngineConcurrency, EngineSymbols};
use crate::gating::DEFAULT_CREDENTIAL_ENV;
use crate::resolver::{
    Resolver, SnapshotOrder, DEFAULT_FALLBACK_PATH, DEFAULT_MODEL, DEFAULT_VENDOR,
};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_LIBRARY: &str = "TOKENIZER_BRIDGE_LIB";
pub const ENV_CACHE_ROOT: &str = "TOKENIZER_BRIDGE_CACHE_ROOT";
pub const ENV_DEFAULT_MODEL: &str = "TOKENIZER_BRIDGE_DEFAULT_MODEL";
pub const ENV_FALLBACK_PATH: &str = "TOKENIZER_BRIDGE_FALLBACK_PATH";
pub const ENV_CREDENTIAL_VAR: &str = "TOKENIZER_BRIDGE_CREDENTIAL_ENV";
pub const ENV_TIMEOUT_SECS: &str = "TOKENIZER_BRIDGE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Shared library implementing the engine ABI.
    pub library_path: Option<PathBuf>,
    pub symbols: EngineSymbols,
    pub concurrency: EngineConcurrency,
    /// Directory holding `<vendor>/hub`; `None` means `~/.cache`.
    pub cache_root: Option<PathBuf>,
    pub vendor: String,
    pub default_model: String,
    pub fallback_path: PathBuf,
    pub snapshot_order: SnapshotOrder,
    /// Environment variable holding the credential for gated models.
    pub credential_env: String,
    /// When set, the OS keyring is consulted before the environment.
    pub keyring_service: Option<String>,
    /// Regular expressions matching gated model references.
    pub gated_patterns: Vec<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            symbols: EngineSymbols::default(),
            concurrency: EngineConcurrency::default(),
            cache_root: None,
            vendor: DEFAULT_VENDOR.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            fallback_path: PathBuf::from(DEFAULT_FALLBACK_PATH),
            snapshot_order: SnapshotOrder::default(),
            credential_env: DEFAULT_CREDENTIAL_ENV.to_string(),
            keyring_service: None,
            gated_patterns: Vec::new(),
            timeout_secs: None,
        }
    }
}

impl BridgeConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Load from a YAML file, or JSON when the extension is `.json`.
    /// Missing fields take their defaults; environment overrides are not applied.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            serde_json::from_str::<Self>(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<Self>(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|reason| {
            Error::configuration_with_context(
                "invalid bridge configuration file",
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_details(reason)
                    .with_source("config_loader"),
            )
        })
    }

    /// Apply `TOKENIZER_BRIDGE_*` environment variables on top of `self`.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(v) = non_empty_var(ENV_LIBRARY) {
            self.library_path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty_var(ENV_CACHE_ROOT) {
            self.cache_root = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty_var(ENV_DEFAULT_MODEL) {
            self.default_model = v;
        }
        if let Some(v) = non_empty_var(ENV_FALLBACK_PATH) {
            self.fallback_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty_var(ENV_CREDENTIAL_VAR) {
            self.credential_env = v;
        }
        if let Some(v) = non_empty_var(ENV_TIMEOUT_SECS) {
            let secs = v.trim().parse::<u64>().map_err(|e| {
                Error::configuration_with_context(
                    format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS),
                    ErrorContext::new()
                        .with_field_path(ENV_TIMEOUT_SECS)
                        .with_details(format!("'{}': {}", v, e))
                        .with_source("config_loader"),
                )
            })?;
            self.timeout_secs = Some(secs);
        }
        Ok(self)
    }

    /// `None` when unset or zero.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn resolver(&self) -> Resolver {
        let resolver = Resolver::new()
            .with_vendor(&self.vendor)
            .with_default_model(&self.default_model)
            .with_fallback_path(&self.fallback_path)
            .with_snapshot_order(self.snapshot_order);
        match &self.cache_root {
            Some(root) => resolver.with_cache_root(root),
            None => resolver,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
