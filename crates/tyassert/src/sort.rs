//! Randomized sort validation.
//!
//! A sort that relies on incomplete tie-break rules can return the expected
//! order for some input permutations and not others. The validator therefore
//! shuffles each expected ordering many times, sorts every shuffle with the
//! type's ordering capability, and compares the result to the expected
//! sequence element by element.
//!
//! The first mismatching trial of an ordering ends that ordering's trials and
//! is reported with the exact shuffled input and the exact wrong output, so
//! the failure can be replayed. The RNG is seeded from configuration, or from
//! a random seed that is logged and reported.

use std::cell::RefCell;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::handle::SortableType;
use crate::value::Value;

/// The first failing trial of an ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct SortMismatch {
    /// One-based index of the failing trial.
    pub trial: usize,
    /// The permutation handed to the sort.
    pub shuffled: Vec<Value>,
    /// What the sort returned.
    pub sorted: Vec<Value>,
}

/// The result of validating one expected ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingVerdict {
    /// Trials run, including a failing one.
    pub trials_run: usize,
    /// The first mismatch, if any trial failed.
    pub mismatch: Option<SortMismatch>,
}

impl OrderingVerdict {
    /// Returns `true` if every trial matched.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.mismatch.is_none()
    }
}

/// The result of validating a set of expected orderings.
#[derive(Debug, Clone, PartialEq)]
pub struct SortReport {
    /// Seed the shuffles were drawn from.
    pub seed: u64,
    /// One verdict per expected ordering, in input order.
    pub orderings: Vec<OrderingVerdict>,
}

impl SortReport {
    /// Returns `true` if every ordering passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.orderings.iter().all(OrderingVerdict::passed)
    }

    /// The first mismatch across all orderings.
    #[must_use]
    pub fn first_mismatch(&self) -> Option<&SortMismatch> {
        self.orderings.iter().find_map(|o| o.mismatch.as_ref())
    }
}

/// Drives repeated shuffle-and-sort trials.
///
/// Successive validations draw from one RNG stream, so a run is replayed by
/// repeating the same calls with the same seed.
#[derive(Debug, Clone)]
pub struct SortValidator {
    trials: usize,
    seed: u64,
    rng: RefCell<StdRng>,
}

impl SortValidator {
    /// Creates a validator running `trials` shuffles per ordering. A `None`
    /// seed draws one at random.
    #[must_use]
    pub fn new(trials: usize, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        debug!(seed, trials, "sort validator seeded");
        Self {
            trials,
            seed,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// The seed the shuffles are drawn from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The number of trials per ordering.
    #[must_use]
    pub const fn trials(&self) -> usize {
        self.trials
    }

    /// Validates every expected ordering.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CollaboratorFault`] if the type's sort faults.
    pub fn validate(
        &self,
        ty: &dyn SortableType,
        orderings: &[Vec<Value>],
    ) -> Result<SortReport, EngineError> {
        let orderings: Vec<OrderingVerdict> = orderings
            .iter()
            .map(|expected| self.validate_ordering(ty, expected))
            .collect::<Result<_, _>>()?;
        Ok(SortReport {
            seed: self.seed,
            orderings,
        })
    }

    /// Validates one expected ordering, stopping at the first mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CollaboratorFault`] if the type's sort faults.
    pub fn validate_ordering(
        &self,
        ty: &dyn SortableType,
        expected: &[Value],
    ) -> Result<OrderingVerdict, EngineError> {
        for trial in 1..=self.trials {
            let mut shuffled = expected.to_vec();
            shuffled.shuffle(&mut *self.rng.borrow_mut());
            let sorted = ty
                .sort(&shuffled)
                .map_err(|e| EngineError::collaborator(ty.display_name(), "sort", e))?;
            if sorted != expected {
                warn!(
                    type_name = ty.display_name(),
                    trial,
                    seed = self.seed,
                    "sort produced an unexpected order"
                );
                return Ok(OrderingVerdict {
                    trials_run: trial,
                    mismatch: Some(SortMismatch {
                        trial,
                        shuffled,
                        sorted,
                    }),
                });
            }
        }
        Ok(OrderingVerdict {
            trials_run: self.trials,
            mismatch: None,
        })
    }
}
