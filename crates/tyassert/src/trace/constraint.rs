//! Constraint map: one check line per ancestor, root last.

use super::{DiagnosticTrace, TraceBuilder, verdict};
use crate::error::EngineError;
use crate::handle::{Ancestors, TypeHandle};
use crate::value::Value;

impl TraceBuilder {
    /// Builds the constraint map of `value` against `ty` and every ancestor.
    ///
    /// Every ancestor is checked regardless of earlier verdicts, so the trace
    /// shows which parents a value satisfies before a more specific type
    /// rejects it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CollaboratorFault`] if an ancestor's `check`
    /// faults, or [`EngineError::AncestorChainTooLong`] if the chain exceeds
    /// the traversal cap.
    pub fn constraint_trace(
        &self,
        ty: &dyn TypeHandle,
        value: &Value,
    ) -> Result<DiagnosticTrace, EngineError> {
        let rendered = self.renderer.render(value);
        let shown = self.renderer.trace_form(&rendered);
        let mut trace = self.open(format!("{} constraint map:", ty.display_name()), &rendered);

        for ancestor in Ancestors::new(ty, self.max_ancestor_depth) {
            let ancestor = ancestor?;
            let passed = ancestor
                .check(value)
                .map_err(|e| EngineError::collaborator(ancestor.display_name(), "check", e))?;
            trace.push_indented(
                1,
                format!(
                    "{}->check({shown}) ==> {}",
                    ancestor.display_name(),
                    verdict(passed)
                ),
            );
            trace.push_indented(
                2,
                format!("is defined as: {}", ancestor.source_definition()),
            );
        }
        Ok(trace)
    }
}
