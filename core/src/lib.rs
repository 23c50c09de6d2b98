// core/src/lib.rs

//! Flow: the step pipeline engine behind the storefront workflows.
//!
//! A pipeline is an ordered list of named steps run against one shared,
//! lockable context. Each step can carry:
//!  - `before` / `on` / `after` handlers (async, may stop the pipeline early),
//!  - a skip condition evaluated against the context,
//!  - rollback handlers that compensate the step when a *later* step fails.
//!
//! Rollback handlers turn a pipeline into a unit of work: if step N returns an
//! error, the rollback handlers of steps `N-1 ..= 0` that completed are run in
//! reverse order before the error is returned to the caller.
//!
//! Pipelines are stored in a [`Registry`] keyed by their context type, so a
//! caller only needs to build a context to run the matching workflow.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::{Handler, RollbackHandler};
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Registry;

/*
    Typical use:
    1. Define a context struct `MyCtx` holding inputs, collaborators and outputs.
    2. Build a `Pipeline<MyCtx, MyError>` with its step list.
    3. Attach handlers with `.on_root()` (and `.before_root()` / `.after_root()`).
    4. Attach compensations with `.on_rollback()` for steps that write state.
    5. Register the pipeline in a `Registry<MyError>`.
    6. Run it: `registry.run(ContextData::new(ctx)).await`, then read outputs
       back from the same `ContextData`.
*/
