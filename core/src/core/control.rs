// core/src/core/control.rs

//! Flow-control signals returned by handlers and by a whole run.

/// Returned by a handler to continue with the next handler/step or halt the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt without error. Completed steps are NOT rolled back.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}
