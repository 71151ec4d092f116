use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field or configuration key that caused the error (e.g., "config.timeout_secs", "request.text")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "boundary_adapter")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the tokenizer bridge.
///
/// The first three variants mirror the terminal failure states of a boundary
/// call (see [`crate::BridgeOutcome`]); the rest cover conditions detected
/// before or around the call itself.
#[derive(Debug, Error)]
pub enum Error {
    /// The engine returned no payload at all.
    #[error("Transport failure: engine produced no response")]
    Transport,

    /// A payload came back but does not match the wire format.
    #[error("Protocol failure: {reason} (raw payload: {raw})")]
    Protocol { reason: String, raw: String },

    /// The engine reported an error in an otherwise well-formed payload.
    #[error("Tokenization error: {message}")]
    Semantic {
        message: String,
        debug_logs: Vec<String>,
    },

    #[error("Cannot encode {field} for the native boundary: {reason}")]
    Encoding { field: &'static str, reason: String },

    #[error("Failed to load native engine from {path}: {reason}")]
    EngineLoad { path: String, reason: String },

    #[error("Native call did not complete within {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new runtime error with structured context
    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True when the engine could not produce any structured response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport)
    }

    /// Diagnostic lines the engine attached to a semantic failure.
    pub fn debug_logs(&self) -> &[String] {
        match self {
            Error::Semantic { debug_logs, .. } => debug_logs,
            _ => &[],
        }
    }
}
