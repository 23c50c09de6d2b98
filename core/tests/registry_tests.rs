// tests/registry_tests.rs
mod common;

use common::*;
use flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult, Registry};
use serial_test::serial;

#[derive(Clone, Debug, Default)]
struct AlphaContext {
  visits: Vec<&'static str>,
}

#[derive(Clone, Debug, Default)]
struct BetaContext {
  total: i64,
}

fn alpha_pipeline() -> Pipeline<AlphaContext, TestError> {
  let mut p = Pipeline::<AlphaContext, TestError>::new(&[("visit", false, None)]);
  p.on_root("visit", |ctx: ContextData<AlphaContext>| async move {
    ctx.write().visits.push("alpha");
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  p
}

fn beta_pipeline() -> Pipeline<BetaContext, TestError> {
  let mut p = Pipeline::<BetaContext, TestError>::new(&[("add", false, None)]);
  p.on_root("add", |ctx: ContextData<BetaContext>| async move {
    ctx.write().total += 40;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  p
}

#[tokio::test]
#[serial]
async fn test_registry_dispatches_by_context_type() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  registry.register_pipeline(alpha_pipeline());
  registry.register_pipeline(beta_pipeline());

  let alpha = ContextData::new(AlphaContext::default());
  let beta = ContextData::new(BetaContext { total: 2 });

  assert_eq!(registry.run(alpha.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(registry.run(beta.clone()).await.unwrap(), PipelineResult::Completed);

  assert_eq!(alpha.read().visits, vec!["alpha"]);
  assert_eq!(beta.read().total, 42);
  assert!(registry.is_registered::<AlphaContext>());
}

#[tokio::test]
#[serial]
async fn test_registry_unregistered_context_fails() {
  setup_tracing();
  let registry = Registry::<TestError>::new();

  #[derive(Debug, Default)]
  struct UnregisteredContext;

  assert!(!registry.is_registered::<UnregisteredContext>());
  let result = registry.run(ContextData::new(UnregisteredContext)).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("PipelineNotRegistered"));
      assert!(s.contains("UnregisteredContext"));
    }
    other => panic!("Expected PipelineNotRegistered, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_registry_propagates_handler_error() {
  setup_tracing();
  let registry = Registry::<TestError>::new();

  let mut p = Pipeline::<AlphaContext, TestError>::new(&[("fail", false, None)]);
  p.on_root("fail", |_ctx: ContextData<AlphaContext>| async move {
    Err::<PipelineControl, _>(TestError::Handler("Alpha pipeline failed".to_string()))
  });
  registry.register_pipeline(p);

  let result = registry.run(ContextData::new(AlphaContext::default())).await;
  assert_eq!(result.unwrap_err(), TestError::Handler("Alpha pipeline failed".to_string()));
}

#[tokio::test]
#[serial]
async fn test_registering_twice_replaces_pipeline() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  registry.register_pipeline(beta_pipeline());

  let mut replacement = Pipeline::<BetaContext, TestError>::new(&[("add", false, None)]);
  replacement.on_root("add", |ctx: ContextData<BetaContext>| async move {
    ctx.write().total += 1;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  registry.register_pipeline(replacement);

  let ctx = ContextData::new(BetaContext::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().total, 1);
}

#[tokio::test]
#[serial]
async fn test_registry_with_default_flow_error() {
  setup_tracing();
  let registry = Registry::<FlowError>::default();

  #[derive(Debug, Default)]
  struct SimpleCtx {
    count: i32,
  }

  let mut pipeline = Pipeline::<SimpleCtx, FlowError>::new(&[("task", false, None)]);
  pipeline.on_root("task", |ctx: ContextData<SimpleCtx>| async move {
    ctx.write().count = 1;
    Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
  });
  registry.register_pipeline(pipeline);

  let ctx = ContextData::new(SimpleCtx::default());
  assert!(registry.run(ctx.clone()).await.is_ok());
  assert_eq!(ctx.read().count, 1);
}
