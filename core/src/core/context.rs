// core/src/core/context.rs

//! Handler types stored by a pipeline.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by a step handler.
pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>;

/// Boxed future returned by a rollback handler.
pub type RollbackFuture<Err> = Pin<Box<dyn Future<Output = Result<(), Err>> + Send>>;

/// A step handler.
///
/// Takes a clone of the shared `ContextData<TData>` and resolves to a
/// `PipelineControl`. Handlers must drop any lock guard before awaiting.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Err> + Send + Sync>;

/// A compensation for a completed step, run when a later step fails.
pub type RollbackHandler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> RollbackFuture<Err> + Send + Sync>;
