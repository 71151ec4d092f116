use crate::bridge::TokenizerBridge;
use crate::config::{BridgeConfig, ENV_LIBRARY};
use crate::ffi::{BoundaryAdapter, DynamicEngine, EngineConcurrency, EngineSymbols, NativeEngine};
use crate::gating::{CredentialSource, GatingPolicy, NoGating, PatternGating};
use crate::resolver::Resolver;
use crate::{Error, ErrorContext, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`TokenizerBridge`].
///
/// Keep this surface area small and predictable: an engine (or a library to
/// load it from) is the only required piece.
pub struct TokenizerBridgeBuilder {
    engine: Option<Arc<dyn NativeEngine>>,
    library_path: Option<PathBuf>,
    symbols: EngineSymbols,
    concurrency: EngineConcurrency,
    resolver: Option<Resolver>,
    gating: Arc<dyn GatingPolicy>,
    credentials: CredentialSource,
    timeout: Option<Duration>,
}

impl TokenizerBridgeBuilder {
    pub fn new() -> Self {
        Self {
            engine: None,
            library_path: None,
            symbols: EngineSymbols::default(),
            concurrency: EngineConcurrency::default(),
            resolver: None,
            gating: Arc::new(NoGating),
            credentials: CredentialSource::default(),
            timeout: None,
        }
    }

    /// Start from a [`BridgeConfig`]. Gating patterns are compiled here.
    pub fn from_config(cfg: &BridgeConfig) -> Result<Self> {
        let mut credentials = CredentialSource::from_env(&cfg.credential_env);
        if let Some(service) = &cfg.keyring_service {
            credentials = credentials.with_keyring(service);
        }

        let mut builder = Self::new()
            .with_symbols(cfg.symbols.clone())
            .with_concurrency(cfg.concurrency)
            .with_resolver(cfg.resolver())
            .with_credential_source(credentials);
        if let Some(path) = &cfg.library_path {
            builder = builder.with_library(path);
        }
        if let Some(timeout) = cfg.timeout() {
            builder = builder.with_timeout(timeout);
        }
        if !cfg.gated_patterns.is_empty() {
            builder = builder.with_gating(PatternGating::new(&cfg.gated_patterns)?);
        }
        Ok(builder)
    }

    /// Use an already constructed engine. Takes precedence over [`with_library`](Self::with_library).
    pub fn with_engine(mut self, engine: Arc<dyn NativeEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Load the engine from a shared library at build time.
    pub fn with_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    pub fn with_symbols(mut self, symbols: EngineSymbols) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_concurrency(mut self, concurrency: EngineConcurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_gating(mut self, policy: impl GatingPolicy + 'static) -> Self {
        self.gating = Arc::new(policy);
        self
    }

    pub fn with_credential_source(mut self, source: CredentialSource) -> Self {
        self.credentials = source;
        self
    }

    /// Bound the wait of the async entry points.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<TokenizerBridge> {
        let engine: Arc<dyn NativeEngine> = match (self.engine, self.library_path) {
            (Some(engine), _) => engine,
            (None, Some(path)) => Arc::new(DynamicEngine::load_with_symbols(&path, &self.symbols)?),
            (None, None) => {
                return Err(Error::configuration_with_context(
                    "no native engine configured",
                    ErrorContext::new()
                        .with_field_path("library_path")
                        .with_details(format!(
                            "set {} or call with_library()/with_engine()",
                            ENV_LIBRARY
                        ))
                        .with_source("bridge_builder"),
                ))
            }
        };

        Ok(TokenizerBridge {
            adapter: BoundaryAdapter::with_concurrency(engine, self.concurrency),
            resolver: self.resolver.unwrap_or_default(),
            gating: self.gating,
            credentials: self.credentials,
            timeout: self.timeout,
        })
    }
}

impl Default for TokenizerBridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
