//! Coercion map: the type itself, then each coercion candidate in priority
//! order, up to the first whose check passes.

use std::iter;

use super::{DiagnosticTrace, TraceBuilder, verdict};
use crate::error::EngineError;
use crate::handle::TypeHandle;
use crate::value::Value;

impl TraceBuilder {
    /// Builds the coercion map of `value` against `ty`.
    ///
    /// When a candidate other than `ty` accepts the value, the line notes the
    /// result of `ty.coerce(value)`. The candidate only identifies which path
    /// applies; the conversion is always the original type's.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CollaboratorFault`] if a candidate's `check` or
    /// `ty`'s `coerce` faults.
    pub fn coercion_trace(
        &self,
        ty: &dyn TypeHandle,
        value: &Value,
    ) -> Result<DiagnosticTrace, EngineError> {
        let rendered = self.renderer.render(value);
        let shown = self.renderer.trace_form(&rendered);
        let mut trace = self.open(format!("{} coercion map:", ty.display_name()), &rendered);

        let candidates = iter::once(ty).chain(ty.coercion_candidates());
        for (index, candidate) in candidates.enumerate() {
            let passed = candidate
                .check(value)
                .map_err(|e| EngineError::collaborator(candidate.display_name(), "check", e))?;
            let mut line = format!(
                "{}->check({shown}) ==> {}",
                candidate.display_name(),
                verdict(passed)
            );
            if passed && index > 0 {
                let coerced = ty
                    .coerce(value)
                    .map_err(|e| EngineError::collaborator(ty.display_name(), "coerce", e))?;
                line.push_str(&format!(
                    " (coerced into {})",
                    self.renderer.render(&coerced)
                ));
            }
            trace.push_indented(1, line);
            if passed {
                break;
            }
        }
        Ok(trace)
    }
}
