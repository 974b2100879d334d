//! Per-value assertion outcomes.
//!
//! An [`AssertionOutcome`] is the unit result for one input value: a label,
//! a verdict, the [`Stage`] at which the verdict was reached, and the
//! diagnostic trace that explains it. The label text is stable; the stage is
//! its structured counterpart for callers that need to tell failure kinds
//! apart without parsing labels.

use std::fmt;

use serde::Serialize;

use crate::trace::DiagnosticTrace;

/// The assertion verb that produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    /// Value must satisfy the type, possibly after coercion.
    ShouldPass,
    /// Value must not satisfy the type, even after coercion.
    ShouldFail,
    /// Value must fail the type and coerce into an expected value.
    ShouldCoerceInto,
    /// Value must satisfy the type without coercion.
    ShouldPassInitially,
    /// Value must not satisfy the type, coercion not considered.
    ShouldFailInitially,
    /// Shuffled orderings must sort back into the expected order.
    ShouldSort,
    /// A type must descend from another.
    Subtype,
}

impl Verb {
    /// Returns the verb as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShouldPass => "should_pass",
            Self::ShouldFail => "should_fail",
            Self::ShouldCoerceInto => "should_coerce_into",
            Self::ShouldPassInitially => "should_pass_initially",
            Self::ShouldFailInitially => "should_fail_initially",
            Self::ShouldSort => "should_sort",
            Self::Subtype => "should_be_subtype",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the verification state machine a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The only check of the `*_initially` verbs.
    Initial,
    /// The value already satisfied the type.
    InitialCheck,
    /// The value failed and the type has no coercion.
    NoCoercion,
    /// Coercion ran but left the value unchanged.
    FailedCoercion,
    /// Coercion changed the value and the result was judged.
    Coerced,
    /// A sort trial run.
    Sorted,
    /// An ancestry lookup.
    Ancestry,
}

/// The result of asserting one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionOutcome {
    label: String,
    passed: bool,
    verb: Verb,
    stage: Stage,
    diagnostics: DiagnosticTrace,
}

impl AssertionOutcome {
    /// Creates an outcome.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        passed: bool,
        verb: Verb,
        stage: Stage,
        diagnostics: DiagnosticTrace,
    ) -> Self {
        Self {
            label: label.into(),
            passed,
            verb,
            stage,
            diagnostics,
        }
    }

    /// The assertion label, e.g. `"example.com" should pass`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the assertion held.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// The verb that produced this outcome.
    #[must_use]
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// The stage at which the verdict was reached.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// The diagnostic trace, present on pass and on fail.
    #[must_use]
    pub const fn diagnostics(&self) -> &DiagnosticTrace {
        &self.diagnostics
    }
}

/// Builds the label for a coercion-state-machine outcome.
///
/// `rendered` is the rendering of the input and `coerced` the rendering of
/// the coerced value, used only by [`Stage::Coerced`].
#[must_use]
pub fn label(verb: Verb, stage: Stage, rendered: &str, coerced: Option<&str>) -> String {
    let expectation = match verb {
        Verb::ShouldPass | Verb::ShouldPassInitially => "should pass",
        Verb::ShouldFail | Verb::ShouldFailInitially => "should fail",
        Verb::ShouldCoerceInto => "should coerce",
        Verb::ShouldSort => "should sort",
        Verb::Subtype => "should be a subtype",
    };
    match (verb, stage) {
        (Verb::ShouldCoerceInto, Stage::InitialCheck) => {
            format!("{rendered} should fail (initial check)")
        },
        (Verb::ShouldCoerceInto, Stage::FailedCoercion) => format!("{rendered} should coerce"),
        (Verb::ShouldCoerceInto, Stage::Coerced) => format!("{rendered} (coerced)"),
        (_, Stage::InitialCheck) => format!("{rendered} {expectation} (initial check)"),
        (_, Stage::NoCoercion) => format!("{rendered} {expectation} (no coercion)"),
        (_, Stage::FailedCoercion) => format!("{rendered} {expectation} (failed coercion)"),
        (_, Stage::Coerced) => format!(
            "{rendered} {expectation} (coerced into {})",
            coerced.unwrap_or_default()
        ),
        (_, Stage::Initial | Stage::Sorted | Stage::Ancestry) => {
            format!("{rendered} {expectation}")
        },
    }
}
