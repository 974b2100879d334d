//! Diagnostic traces explaining why a value passed or failed.
//!
//! Two traces are produced, both in a stable line format that downstream
//! tooling greps for:
//!
//! ```text
//! FQDN constraint map:
//!     FQDN->check(".com") ==> FAILED
//!         is defined as: /^(?:[a-z0-9-]+\.)+[a-z]+$/
//!     Str->check(".com") ==> PASSED
//!         is defined as: <builtin>
//! ```
//!
//! ```text
//! Hostname coercion map:
//!     Hostname->check("ftp001-prod3") ==> FAILED
//!     Str->check("ftp001-prod3") ==> PASSED (coerced into "ftp001-prod3.ourdomain.com")
//! ```
//!
//! A rendering wider than the placeholder width is printed once on a
//! `Full value:` line and shown as `...` in every check line.
//!
//! Traces are observational only. Building one calls `check` (and, for the
//! coercion trace, `coerce`) on the type model, so a faulting type surfaces
//! here as an [`EngineError`](crate::EngineError).

mod coercion;
mod constraint;

use std::fmt;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::render::Renderer;

/// Indentation unit for trace lines.
pub const INDENT: &str = "    ";

/// An ordered sequence of diagnostic lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticTrace {
    lines: Vec<String>,
}

impl DiagnosticTrace {
    /// Creates an empty trace.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Appends an unindented line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Appends a line indented by `level` units.
    pub fn push_indented(&mut self, level: usize, line: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", INDENT.repeat(level), line.as_ref()));
    }

    /// Appends every line of `other`.
    pub fn extend(&mut self, other: Self) {
        self.lines.extend(other.lines);
    }

    /// Returns the lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the trace has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for DiagnosticTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

/// Builds constraint and coercion traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceBuilder {
    renderer: Renderer,
    max_ancestor_depth: usize,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl TraceBuilder {
    /// Creates a builder rendering with `renderer` and walking at most
    /// `max_ancestor_depth` types per ancestor chain.
    #[must_use]
    pub const fn new(renderer: Renderer, max_ancestor_depth: usize) -> Self {
        Self {
            renderer,
            max_ancestor_depth,
        }
    }

    /// Creates a builder from engine configuration.
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self::new(Renderer::from_config(config), config.max_ancestor_depth)
    }

    /// The renderer used for values.
    #[must_use]
    pub const fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Starts a trace with its header and, for wide values, the full
    /// rendering.
    fn open(&self, header: String, rendered: &str) -> DiagnosticTrace {
        let mut trace = DiagnosticTrace::new();
        trace.push(header);
        if self.renderer.is_oversized(rendered) {
            trace.push_indented(1, format!("Full value: {rendered}"));
        }
        trace
    }
}

const fn verdict(passed: bool) -> &'static str {
    if passed { "PASSED" } else { "FAILED" }
}
