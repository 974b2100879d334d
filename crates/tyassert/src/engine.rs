//! The assertion engine.
//!
//! Each verb takes a group to record into, a type, and a list of inputs. It
//! opens a subgroup named `"<TypeName>: <verb>"`, classifies every input
//! independently, records one [`AssertionOutcome`] per input, and returns
//! whether the subgroup passed.
//!
//! # State Machine
//!
//! Every input starts at the initial check, `ty.check(value)`.
//!
//! | verb                    | initial check passes | fails, no coercion | coercion was a no-op | coercion changed the value       |
//! |-------------------------|----------------------|--------------------|----------------------|----------------------------------|
//! | `should_pass_initially` | pass                 | fail               | n/a                  | n/a                              |
//! | `should_fail_initially` | fail                 | pass               | n/a                  | n/a                              |
//! | `should_pass`           | pass                 | fail               | fail                 | `ty.check(coerced)`              |
//! | `should_fail`           | fail                 | pass               | pass                 | `!ty.check(coerced)`             |
//! | `should_coerce_into`    | fail                 | fail               | fail                 | `coerced == expected` (deep)     |
//!
//! The `*_initially` verbs never attempt coercion. Whether a coercion
//! changed the value is decided by [`crate::identity::changed`].
//!
//! # Faults
//!
//! A type whose `check` or `coerce` faults aborts the verb: its subgroup is
//! closed with the outcomes recorded so far and the error propagates.

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::group::{AssertionGroup, GroupDefect};
use crate::handle::{SortableType, TypeHandle, ancestor_chain};
use crate::identity::changed;
use crate::outcome::{AssertionOutcome, Stage, Verb, label};
use crate::sort::{OrderingVerdict, SortValidator};
use crate::trace::{DiagnosticTrace, TraceBuilder};
use crate::value::Value;

/// What a single input is expected to do.
#[derive(Debug, Clone, Copy)]
enum Expectation<'v> {
    PassInitially,
    FailInitially,
    Pass,
    Fail,
    CoerceInto(&'v Value),
}

impl Expectation<'_> {
    const fn verb(self) -> Verb {
        match self {
            Self::PassInitially => Verb::ShouldPassInitially,
            Self::FailInitially => Verb::ShouldFailInitially,
            Self::Pass => Verb::ShouldPass,
            Self::Fail => Verb::ShouldFail,
            Self::CoerceInto(_) => Verb::ShouldCoerceInto,
        }
    }
}

/// Verifies type-constraint, coercion and ordering semantics.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use tyassert::{AssertionGroup, Engine, SimpleType, Value};
///
/// let str_type = Rc::new(SimpleType::new("Str", |v| v.as_str().is_some()));
/// let fqdn = SimpleType::new("FQDN", |v| {
///     v.as_str().is_some_and(|s| s.contains('.') && !s.starts_with('.'))
/// })
/// .with_parent(str_type);
///
/// let engine = Engine::with_defaults();
/// let mut root = AssertionGroup::new("hostnames");
/// assert!(
///     engine
///         .should_pass_initially(&mut root, &fqdn, &[Value::str("example.com")])
///         .unwrap()
/// );
/// assert!(engine.should_fail(&mut root, &fqdn, &[Value::str(".com")]).unwrap());
///
/// let group = root.find_group("FQDN: should_fail").unwrap();
/// let outcome = group.outcomes().next().unwrap();
/// assert_eq!(outcome.label(), "\".com\" should fail (no coercion)");
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    tracer: TraceBuilder,
    sorter: SortValidator,
}

impl Engine {
    /// Creates an engine from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the configuration is out of range.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Creates an engine with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::from_validated(EngineConfig::default())
    }

    fn from_validated(config: EngineConfig) -> Self {
        Self {
            tracer: TraceBuilder::from_config(&config),
            sorter: SortValidator::new(config.sort_trials, config.seed),
            config,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The trace builder, for callers that want traces without outcomes.
    #[must_use]
    pub const fn tracer(&self) -> &TraceBuilder {
        &self.tracer
    }

    /// The seed the sort trials are drawn from.
    #[must_use]
    pub const fn sort_seed(&self) -> u64 {
        self.sorter.seed()
    }

    /// Renders a value the way labels and traces do.
    #[must_use]
    pub fn render(&self, value: &Value) -> String {
        self.tracer.renderer().render(value)
    }

    /// Asserts each value satisfies `ty` without coercion.
    ///
    /// # Errors
    ///
    /// Returns an error if the type faults; see the module docs.
    pub fn should_pass_initially(
        &self,
        group: &mut AssertionGroup,
        ty: &dyn TypeHandle,
        values: &[Value],
    ) -> Result<bool, EngineError> {
        self.run_cases(
            group,
            ty,
            Verb::ShouldPassInitially,
            values.iter().map(|v| (v, Expectation::PassInitially)),
        )
    }

    /// Asserts each value fails `ty`, without considering coercion.
    ///
    /// # Errors
    ///
    /// Returns an error if the type faults; see the module docs.
    pub fn should_fail_initially(
        &self,
        group: &mut AssertionGroup,
        ty: &dyn TypeHandle,
        values: &[Value],
    ) -> Result<bool, EngineError> {
        self.run_cases(
            group,
            ty,
            Verb::ShouldFailInitially,
            values.iter().map(|v| (v, Expectation::FailInitially)),
        )
    }

    /// Asserts each value satisfies `ty`, directly or after coercion.
    ///
    /// # Errors
    ///
    /// Returns an error if the type faults; see the module docs.
    pub fn should_pass(
        &self,
        group: &mut AssertionGroup,
        ty: &dyn TypeHandle,
        values: &[Value],
    ) -> Result<bool, EngineError> {
        self.run_cases(
            group,
            ty,
            Verb::ShouldPass,
            values.iter().map(|v| (v, Expectation::Pass)),
        )
    }

    /// Asserts each value fails `ty`, even after coercion.
    ///
    /// # Errors
    ///
    /// Returns an error if the type faults; see the module docs.
    pub fn should_fail(
        &self,
        group: &mut AssertionGroup,
        ty: &dyn TypeHandle,
        values: &[Value],
    ) -> Result<bool, EngineError> {
        self.run_cases(
            group,
            ty,
            Verb::ShouldFail,
            values.iter().map(|v| (v, Expectation::Fail)),
        )
    }

    /// Asserts each original fails `ty` and coerces into its expected value.
    ///
    /// `flat` alternates original and expected entries. An odd-length list
    /// records [`GroupDefect::OddPairList`] and no outcomes.
    ///
    /// # Errors
    ///
    /// Returns an error if the type faults; see the module docs.
    pub fn should_coerce_into(
        &self,
        group: &mut AssertionGroup,
        ty: &dyn TypeHandle,
        flat: &[Value],
    ) -> Result<bool, EngineError> {
        if flat.len() % 2 != 0 {
            return group.run_group(group_name(ty, Verb::ShouldCoerceInto), |g| {
                g.record_defect(GroupDefect::OddPairList { len: flat.len() });
                Ok(())
            });
        }
        self.run_cases(
            group,
            ty,
            Verb::ShouldCoerceInto,
            flat.chunks_exact(2)
                .map(|pair| (&pair[0], Expectation::CoerceInto(&pair[1]))),
        )
    }

    /// Typed form of [`Engine::should_coerce_into`] taking
    /// `(original, expected)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the type faults; see the module docs.
    pub fn should_coerce_pairs(
        &self,
        group: &mut AssertionGroup,
        ty: &dyn TypeHandle,
        pairs: &[(Value, Value)],
    ) -> Result<bool, EngineError> {
        self.run_cases(
            group,
            ty,
            Verb::ShouldCoerceInto,
            pairs
                .iter()
                .map(|(original, expected)| (original, Expectation::CoerceInto(expected))),
        )
    }

    /// Asserts that every shuffle of each expected ordering sorts back into
    /// it, one outcome per ordering.
    ///
    /// # Errors
    ///
    /// Returns an error if the type's sort faults.
    pub fn should_sort(
        &self,
        group: &mut AssertionGroup,
        ty: &dyn SortableType,
        orderings: &[Vec<Value>],
    ) -> Result<bool, EngineError> {
        let name = format!("{}: {}", ty.display_name(), Verb::ShouldSort);
        group.run_group(name, |g| {
            for expected in orderings {
                let verdict = self.sorter.validate_ordering(ty, expected)?;
                g.record(self.sort_outcome(ty.display_name(), expected, &verdict));
            }
            Ok(())
        })
    }

    /// Asserts that `ty` is a strict ancestor of each of `subtypes`.
    ///
    /// Types are identified by display name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AncestorChainTooLong`] if a subtype's chain
    /// exceeds the traversal cap.
    pub fn should_be_subtype(
        &self,
        group: &mut AssertionGroup,
        ty: &dyn TypeHandle,
        subtypes: &[&dyn TypeHandle],
    ) -> Result<bool, EngineError> {
        group.run_group(group_name(ty, Verb::Subtype), |g| {
            for subtype in subtypes {
                let chain = ancestor_chain(*subtype, self.config.max_ancestor_depth)?;
                let mut diagnostics = DiagnosticTrace::new();
                diagnostics.push(format!("{} ancestry:", subtype.display_name()));
                for ancestor in &chain {
                    diagnostics.push_indented(1, ancestor.display_name());
                }
                let passed = chain
                    .iter()
                    .skip(1)
                    .any(|ancestor| ancestor.display_name() == ty.display_name());
                g.record(AssertionOutcome::new(
                    format!(
                        "{} is a subtype of {}",
                        subtype.display_name(),
                        ty.display_name()
                    ),
                    passed,
                    Verb::Subtype,
                    Stage::Ancestry,
                    diagnostics,
                ));
            }
            Ok(())
        })
    }

    fn run_cases<'v>(
        &self,
        group: &mut AssertionGroup,
        ty: &dyn TypeHandle,
        verb: Verb,
        cases: impl IntoIterator<Item = (&'v Value, Expectation<'v>)>,
    ) -> Result<bool, EngineError> {
        group.run_group(group_name(ty, verb), |g| {
            for (value, expectation) in cases {
                let outcome = self.assess(ty, value, expectation)?;
                debug!(
                    type_name = ty.display_name(),
                    verb = %verb,
                    label = %outcome.label(),
                    passed = outcome.passed(),
                    "value classified"
                );
                g.record(outcome);
            }
            Ok(())
        })
    }

    /// Runs one input through the state machine.
    fn assess(
        &self,
        ty: &dyn TypeHandle,
        value: &Value,
        expectation: Expectation<'_>,
    ) -> Result<AssertionOutcome, EngineError> {
        let verb = expectation.verb();
        let rendered = self.render(value);
        let finish = |stage, passed, diagnostics, coerced: Option<&str>| {
            AssertionOutcome::new(
                label(verb, stage, &rendered, coerced),
                passed,
                verb,
                stage,
                diagnostics,
            )
        };

        let initial = check(ty, value)?;
        let mut diagnostics = self.tracer.constraint_trace(ty, value)?;

        match expectation {
            Expectation::PassInitially => {
                return Ok(finish(Stage::Initial, initial, diagnostics, None));
            },
            Expectation::FailInitially => {
                return Ok(finish(Stage::Initial, !initial, diagnostics, None));
            },
            Expectation::Pass | Expectation::Fail | Expectation::CoerceInto(_) => {},
        }

        if initial {
            let passed = matches!(expectation, Expectation::Pass);
            return Ok(finish(Stage::InitialCheck, passed, diagnostics, None));
        }
        if !ty.has_coercion() {
            let passed = matches!(expectation, Expectation::Fail);
            return Ok(finish(Stage::NoCoercion, passed, diagnostics, None));
        }

        let coerced = ty
            .coerce(value)
            .map_err(|e| EngineError::collaborator(ty.display_name(), "coerce", e))?;
        diagnostics.extend(self.tracer.coercion_trace(ty, value)?);

        if !changed(value, &coerced) {
            let passed = matches!(expectation, Expectation::Fail);
            return Ok(finish(Stage::FailedCoercion, passed, diagnostics, None));
        }

        let coerced_rendered = self.render(&coerced);
        let passed = match expectation {
            Expectation::CoerceInto(expected) => {
                if coerced != *expected {
                    diagnostics.push(format!("Expected: {}", self.render(expected)));
                    diagnostics.push(format!("Got: {coerced_rendered}"));
                }
                coerced == *expected
            },
            _ => {
                diagnostics.extend(self.tracer.constraint_trace(ty, &coerced)?);
                let now = check(ty, &coerced)?;
                if matches!(expectation, Expectation::Pass) {
                    now
                } else {
                    !now
                }
            },
        };
        Ok(finish(
            Stage::Coerced,
            passed,
            diagnostics,
            Some(&coerced_rendered),
        ))
    }

    fn sort_outcome(
        &self,
        type_name: &str,
        expected: &[Value],
        verdict: &OrderingVerdict,
    ) -> AssertionOutcome {
        let render_all = |values: &[Value]| self.render(&Value::list(values.iter().cloned()));
        let rendered = render_all(expected);
        let mut diagnostics = DiagnosticTrace::new();
        diagnostics.push(format!(
            "{type_name} sort trials (seed {}):",
            self.sorter.seed()
        ));
        match &verdict.mismatch {
            None => diagnostics.push_indented(
                1,
                format!(
                    "{} of {} trials ==> PASSED",
                    verdict.trials_run,
                    self.sorter.trials()
                ),
            ),
            Some(mismatch) => {
                diagnostics.push_indented(
                    1,
                    format!(
                        "trial {} of {} ==> FAILED",
                        mismatch.trial,
                        self.sorter.trials()
                    ),
                );
                diagnostics.push_indented(1, format!("shuffled: {}", render_all(&mismatch.shuffled)));
                diagnostics.push_indented(1, format!("sorted: {}", render_all(&mismatch.sorted)));
                diagnostics.push_indented(1, format!("expected: {rendered}"));
            },
        }
        AssertionOutcome::new(
            label(Verb::ShouldSort, Stage::Sorted, &rendered, None),
            verdict.passed(),
            Verb::ShouldSort,
            Stage::Sorted,
            diagnostics,
        )
    }
}

fn group_name(ty: &dyn TypeHandle, verb: Verb) -> String {
    format!("{}: {verb}", ty.display_name())
}

fn check(ty: &dyn TypeHandle, value: &Value) -> Result<bool, EngineError> {
    ty.check(value)
        .map_err(|e| EngineError::collaborator(ty.display_name(), "check", e))
}
