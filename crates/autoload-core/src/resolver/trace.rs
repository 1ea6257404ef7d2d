//! Resolution tracing for the `explain` command.
//!
//! Records each step of a lookup so a user can see why a symbol resolves
//! to a particular file, or which candidates were tried before it missed.

use serde::Serialize;
use std::path::PathBuf;

/// A single step in the resolution trace.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveTraceStep {
    /// Step name (one of [`steps`]).
    pub step: &'static str,
    /// Whether this step succeeded
    pub ok: bool,
    /// Human-readable description of what happened
    pub detail: String,
    /// File path involved in this step, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Strategy that produced the candidate (e.g. "psr4_prefix")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<&'static str>,
    /// Extension being tried
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<&'static str>,
    /// Registered prefix that matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ResolveTraceStep {
    /// Create a new trace step.
    pub fn new(step: &'static str, ok: bool, detail: impl Into<String>) -> Self {
        Self {
            step,
            ok,
            detail: detail.into(),
            path: None,
            strategy: None,
            extension: None,
            prefix: None,
        }
    }

    /// Set the path for this step.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the strategy for this step.
    pub fn with_strategy(mut self, strategy: &'static str) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Set the extension for this step.
    pub fn with_extension(mut self, extension: &'static str) -> Self {
        self.extension = Some(extension);
        self
    }

    /// Set the matched prefix for this step.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// Warning generated during resolution.
#[derive(Debug, Clone, Serialize)]
pub struct TraceWarning {
    /// Warning code (one of [`warning_codes`])
    pub code: &'static str,
    /// Human-readable warning message
    pub message: String,
}

impl TraceWarning {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Complete resolution trace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveTrace {
    /// Ordered list of resolution steps
    pub steps: Vec<ResolveTraceStep>,
    /// Warnings generated during resolution
    pub warnings: Vec<TraceWarning>,
}

impl ResolveTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, step: ResolveTraceStep) {
        self.steps.push(step);
    }

    pub fn add_warning(&mut self, warning: TraceWarning) {
        self.warnings.push(warning);
    }

    /// Add a simple success step.
    pub fn success(&mut self, step: &'static str, detail: impl Into<String>) {
        self.steps.push(ResolveTraceStep::new(step, true, detail));
    }

    /// Add a simple failure step.
    pub fn failure(&mut self, step: &'static str, detail: impl Into<String>) {
        self.steps.push(ResolveTraceStep::new(step, false, detail));
    }

    /// Number of filesystem probes recorded.
    #[must_use]
    pub fn probe_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.step == steps::FILE_EXISTS)
            .count()
    }
}

/// Step names used in resolution tracing.
pub mod steps {
    pub const NORMALIZE_SYMBOL: &str = "normalize_symbol";
    pub const CLASS_MAP: &str = "class_map";
    pub const AUTHORITATIVE: &str = "authoritative";
    pub const NEGATIVE_CACHE: &str = "negative_cache";
    pub const TRY_EXTENSION: &str = "try_extension";
    pub const FILE_EXISTS: &str = "file_exists";
    pub const INCLUDE_PATH: &str = "include_path";
    pub const RECORD_MISSING: &str = "record_missing";
    pub const FINAL_PATH: &str = "final_path";
}

/// Strategy labels attached to probe steps.
pub mod strategies {
    pub const PSR4_PREFIX: &str = "psr4_prefix";
    pub const PSR4_FALLBACK: &str = "psr4_fallback";
    pub const PSR0_PREFIX: &str = "psr0_prefix";
    pub const PSR0_FALLBACK: &str = "psr0_fallback";
    pub const INCLUDE_PATH: &str = "include_path";
}

/// Warning codes used in resolution tracing.
pub mod warning_codes {
    /// The symbol was passed with a leading `\`.
    pub const LEADING_SEPARATOR: &str = "leading_separator";
    /// A longer PSR-4 prefix also matched but an earlier, shorter one won.
    pub const SHADOWED_PREFIX: &str = "shadowed_prefix";
    /// Resolved only through the secondary extension.
    pub const SECONDARY_EXTENSION: &str = "secondary_extension";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_count_only_counts_file_steps() {
        let mut trace = ResolveTrace::new();
        trace.success(steps::NORMALIZE_SYMBOL, "Foo");
        trace.failure(steps::FILE_EXISTS, "missing");
        trace.add_step(
            ResolveTraceStep::new(steps::FILE_EXISTS, true, "found")
                .with_path("/src/Foo.php")
                .with_strategy(strategies::PSR4_PREFIX)
                .with_extension(".php")
                .with_prefix("App\\"),
        );

        assert_eq!(trace.probe_count(), 2);
        assert_eq!(trace.steps[2].prefix.as_deref(), Some("App\\"));
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let mut trace = ResolveTrace::new();
        trace.success(steps::CLASS_MAP, "hit");
        trace.add_warning(TraceWarning::new(warning_codes::LEADING_SEPARATOR, "stripped"));

        let json = serde_json::to_value(&trace).unwrap();
        let step = &json["steps"][0];
        assert_eq!(step["step"], "class_map");
        assert!(step.get("path").is_none());
        assert_eq!(json["warnings"][0]["code"], "leading_separator");
    }
}
