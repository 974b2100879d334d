//! Depth-bounded, single-line rendering of values for labels and traces.
//!
//! # Format
//!
//! - `undef`, `true`/`false`, integers, floats in debug form (`1.0`, `NaN`)
//! - strings double-quoted with `\"`, `\\` and control characters escaped
//! - lists `[1, "a"]`, maps `{"k": 1}`, objects `Point {"x": 1}`
//! - composites nested deeper than the configured depth become `[...]`,
//!   `{...}` or `Point {...}`
//!
//! Runs of whitespace are collapsed to a single space. Rendering is total:
//! cycles are cut by the depth bound and a composite that cannot be borrowed
//! renders as `<borrowed>`.

use std::fmt::Write as _;

use crate::config::{DEFAULT_PLACEHOLDER_WIDTH, DEFAULT_RENDER_DEPTH, EngineConfig};
use crate::value::{Composite, Value};

/// Text shown in trace lines in place of an over-long rendering.
pub const PLACEHOLDER: &str = "...";

/// Renders values for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    max_depth: usize,
    placeholder_width: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DEPTH, DEFAULT_PLACEHOLDER_WIDTH)
    }
}

impl Renderer {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(max_depth: usize, placeholder_width: usize) -> Self {
        Self {
            max_depth,
            placeholder_width,
        }
    }

    /// Creates a renderer from engine configuration.
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.render_depth, config.placeholder_width)
    }

    /// Renders `value` on a single line.
    #[must_use]
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, 0);
        collapse_whitespace(&out)
    }

    /// Returns what a trace line should show for `rendered`: the rendering
    /// itself, or [`PLACEHOLDER`] when it is wider than the placeholder width.
    #[must_use]
    pub fn trace_form<'a>(&self, rendered: &'a str) -> &'a str {
        if self.is_oversized(rendered) {
            PLACEHOLDER
        } else {
            rendered
        }
    }

    /// Returns `true` if `rendered` is replaced by a placeholder in traces.
    #[must_use]
    pub fn is_oversized(&self, rendered: &str) -> bool {
        rendered.chars().count() > self.placeholder_width
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize) {
        match value {
            Value::Undef => out.push_str("undef"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => {
                let _ = write!(out, "{i}");
            },
            Value::Num(n) => {
                let _ = write!(out, "{n:?}");
            },
            Value::Str(s) => write_quoted(out, s),
            Value::Ref(reference) => {
                let Some(composite) = reference.try_borrow() else {
                    out.push_str("<borrowed>");
                    return;
                };
                self.write_composite(out, &composite, depth);
            },
        }
    }

    fn write_composite(&self, out: &mut String, composite: &Composite, depth: usize) {
        let elide = depth >= self.max_depth;
        match composite {
            Composite::List(items) => {
                if elide {
                    out.push_str("[...]");
                    return;
                }
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_value(out, item, depth + 1);
                }
                out.push(']');
            },
            Composite::Map(entries) => {
                if elide {
                    out.push_str("{...}");
                    return;
                }
                self.write_entries(out, entries, depth);
            },
            Composite::Object { class, fields } => {
                out.push_str(class);
                out.push(' ');
                if elide {
                    out.push_str("{...}");
                    return;
                }
                self.write_entries(out, fields, depth);
            },
        }
    }

    fn write_entries<'a>(
        &self,
        out: &mut String,
        entries: impl IntoIterator<Item = (&'a String, &'a Value)>,
        depth: usize,
    ) {
        out.push('{');
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_quoted(out, key);
            out.push_str(": ");
            self.write_value(out, value, depth + 1);
        }
        out.push('}');
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", u32::from(c));
            },
            c => out.push(c),
        }
    }
    out.push('"');
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
