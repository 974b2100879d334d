//! Named, nestable assertion groups.
//!
//! An [`AssertionGroup`] is the explicit context every verb records into;
//! there is no ambient "current group". Subgroups are opened with
//! [`AssertionGroup::run_group`], which attributes everything the body
//! records to the subgroup and closes it on every exit path:
//!
//! - the body returns `Ok`: the subgroup is attached with its outcomes
//! - the body returns `Err`: the subgroup is attached with its partial
//!   outcomes and marked aborted, then the error continues to propagate
//!
//! A group passes when every outcome and subgroup in it passes, it recorded
//! no [`GroupDefect`], and it was not aborted.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::outcome::AssertionOutcome;

/// A group-level configuration defect. It fails the group without adding
/// per-value outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupDefect {
    /// An alternating (original, expected) list had an odd number of entries.
    OddPairList {
        /// Number of entries supplied.
        len: usize,
    },
}

impl std::fmt::Display for GroupDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddPairList { len } => write!(
                f,
                "expected an even number of (original, expected) entries, got {len}; \
                 planned 0 assertions"
            ),
        }
    }
}

/// An item recorded in a group, in recording order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupEntry {
    /// A per-value outcome.
    Outcome(AssertionOutcome),
    /// A closed subgroup.
    Group(AssertionGroup),
}

impl GroupEntry {
    /// Whether the entry passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        match self {
            Self::Outcome(outcome) => outcome.passed(),
            Self::Group(group) => group.passed(),
        }
    }
}

/// Recursive counts over a group tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    /// Passed outcomes.
    pub passed: usize,
    /// Failed outcomes.
    pub failed: usize,
    /// Subgroups, at any depth.
    pub groups: usize,
    /// Recorded defects, at any depth.
    pub defects: usize,
    /// Aborted groups, at any depth, including this one.
    pub aborted: usize,
}

/// A named scope that attributes and aggregates outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionGroup {
    name: String,
    entries: Vec<GroupEntry>,
    defects: Vec<GroupDefect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aborted: Option<String>,
}

impl AssertionGroup {
    /// Creates an empty, open group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            defects: Vec::new(),
            aborted: None,
        }
    }

    /// The group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records an outcome.
    pub fn record(&mut self, outcome: AssertionOutcome) {
        if !outcome.passed() {
            warn!(group = %self.name, label = %outcome.label(), "assertion failed");
        }
        self.entries.push(GroupEntry::Outcome(outcome));
    }

    /// Records a group-level defect.
    pub fn record_defect(&mut self, defect: GroupDefect) {
        warn!(group = %self.name, %defect, "group defect");
        self.defects.push(defect);
    }

    /// Runs `body` in a subgroup named `name` and returns whether the
    /// subgroup passed.
    ///
    /// # Errors
    ///
    /// Returns the body's error after attaching the partial subgroup,
    /// marked aborted.
    pub fn run_group<F>(&mut self, name: impl Into<String>, body: F) -> Result<bool, EngineError>
    where
        F: FnOnce(&mut Self) -> Result<(), EngineError>,
    {
        let mut child = Self::new(name);
        let result = body(&mut child);
        if let Err(err) = &result {
            warn!(group = %child.name, error = %err, "assertion group aborted");
            child.aborted = Some(err.to_string());
        }
        let passed = child.passed();
        info!(
            group = %child.name,
            passed,
            outcomes = child.outcomes().count(),
            "assertion group closed"
        );
        self.entries.push(GroupEntry::Group(child));
        result.map(|()| passed)
    }

    /// Whether every entry passed with no defects and no abort.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.aborted.is_none()
            && self.defects.is_empty()
            && self.entries.iter().all(GroupEntry::passed)
    }

    /// The abort reason, if a collaborator fault closed this group.
    #[must_use]
    pub fn aborted(&self) -> Option<&str> {
        self.aborted.as_deref()
    }

    /// Entries in recording order.
    #[must_use]
    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    /// Defects recorded directly in this group.
    #[must_use]
    pub fn defects(&self) -> &[GroupDefect] {
        &self.defects
    }

    /// Outcomes recorded directly in this group.
    pub fn outcomes(&self) -> impl Iterator<Item = &AssertionOutcome> {
        self.entries.iter().filter_map(|entry| match entry {
            GroupEntry::Outcome(outcome) => Some(outcome),
            GroupEntry::Group(_) => None,
        })
    }

    /// Direct subgroups.
    pub fn groups(&self) -> impl Iterator<Item = &Self> {
        self.entries.iter().filter_map(|entry| match entry {
            GroupEntry::Group(group) => Some(group),
            GroupEntry::Outcome(_) => None,
        })
    }

    /// The first direct subgroup named `name`.
    #[must_use]
    pub fn find_group(&self, name: &str) -> Option<&Self> {
        self.groups().find(|group| group.name == name)
    }

    /// Recursive counts.
    #[must_use]
    pub fn summary(&self) -> GroupSummary {
        let mut summary = GroupSummary {
            defects: self.defects.len(),
            aborted: usize::from(self.aborted.is_some()),
            ..GroupSummary::default()
        };
        for entry in &self.entries {
            match entry {
                GroupEntry::Outcome(outcome) if outcome.passed() => summary.passed += 1,
                GroupEntry::Outcome(_) => summary.failed += 1,
                GroupEntry::Group(group) => {
                    let child = group.summary();
                    summary.passed += child.passed;
                    summary.failed += child.failed;
                    summary.groups += child.groups + 1;
                    summary.defects += child.defects;
                    summary.aborted += child.aborted;
                },
            }
        }
        summary
    }

    /// Serializes the group tree as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
