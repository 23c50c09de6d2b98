// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use flow::{ContextData, Pipeline, PipelineControl, PipelineResult};
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_steps_run_in_declared_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("step1", false, None), ("step2", false, None)]);
  pipeline.on_root("step1", create_simple_handler("step1", "Hello"));
  pipeline.on_root("step2", create_simple_handler("step2", " World"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.counter, 2);
  assert_eq!(guard.message, "Hello World");
  assert_eq!(guard.steps_executed, vec!["step1", "step2"]);
}

#[tokio::test]
#[serial]
async fn test_stop_halts_remaining_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("step1", false, None),
    ("stopper", false, None),
    ("never", false, None),
  ]);
  pipeline.on_root("step1", create_simple_handler("step1", "A"));
  pipeline.on_root("stopper", create_simple_handler("stopper", "B"));
  pipeline.on_root("never", create_simple_handler("never", "C"));

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("stopper".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().message, "AB");
  assert_eq!(ctx.read().steps_executed, vec!["step1", "stopper"]);
}

#[tokio::test]
#[serial]
async fn test_handler_error_is_returned() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("good_step", false, None),
    ("bad_step", false, None),
    ("unreached", false, None),
  ]);
  pipeline.on_root("good_step", create_simple_handler("good_step", "Good"));
  pipeline.on_root("bad_step", create_failing_handler("bad_step", "I am a bad step!"));
  pipeline.on_root("unreached", create_simple_handler("unreached", "Nope"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("I am a bad step!".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_skip_condition_skips_step() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("step1", false, None),
    (
      "step_to_skip",
      false,
      Some(Arc::new(|ctx: ContextData<TestContext>| ctx.read().counter > 0)),
    ),
    ("step3", false, None),
  ]);
  pipeline.on_root("step1", create_simple_handler("step1", " S1"));
  pipeline.on_root("step_to_skip", create_simple_handler("step_to_skip", " SKIPPED"));
  pipeline.on_root("step3", create_simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().message, " S1 S3");
  assert_eq!(ctx.read().steps_executed, vec!["step1", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_set_skip_condition_on_unknown_step_fails() {
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("only", false, None)]);
  let result = pipeline.set_skip_condition("missing", Some(Arc::new(|_ctx: ContextData<TestContext>| true)));
  assert!(matches!(result, Err(flow::FlowError::StepNotFound { .. })));
}

#[tokio::test]
#[serial]
async fn test_non_optional_step_missing_handler_fails() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("step_with_no_handler", false, None)]);

  let result = pipeline.run(ContextData::new(TestContext::default())).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("step_with_no_handler"));
    }
    other => panic!("Expected FlowError::HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_optional_step_missing_handler_succeeds() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("optional_step_no_handler", true, None)]);

  let result = pipeline.run(ContextData::new(TestContext::default())).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
}

#[tokio::test]
#[serial]
async fn test_before_on_after_execution_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("main_step", false, None)]);
  pipeline.after_root("main_step", create_simple_handler("after_main", "After;"));
  pipeline.on_root("main_step", create_simple_handler("on_main", "On;"));
  pipeline.before_root("main_step", create_simple_handler("before_main", "Before;"));

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  let guard = ctx.read();
  assert_eq!(guard.message, "Before;On;After;");
  assert_eq!(guard.steps_executed, vec!["before_main", "on_main", "after_main"]);
}

#[tokio::test]
#[serial]
async fn test_handler_with_foreign_error_type() {
  setup_tracing();
  #[derive(Debug, thiserror::Error)]
  #[error("lookup failed")]
  struct LookupFailed;

  impl From<LookupFailed> for TestError {
    fn from(_: LookupFailed) -> Self {
      TestError::Handler("lookup failed".to_string())
    }
  }

  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("lookup", false, None)]);
  pipeline.on_root("lookup", |_ctx: ContextData<TestContext>| async move {
    Err::<PipelineControl, _>(LookupFailed)
  });

  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  assert_eq!(result.unwrap_err(), TestError::Handler("lookup failed".to_string()));
}

#[test]
#[should_panic(expected = "not found in pipeline definition")]
fn test_registering_handler_for_unknown_step_panics() {
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("known", false, None)]);
  pipeline.on_root("unknown", create_simple_handler("unknown", "x"));
}

#[tokio::test]
#[serial]
async fn test_anyhow_handler_errors_become_flow_errors() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, flow::FlowError>::new(&[("opaque", false, None), ("flow", false, None)]);
  pipeline.on_root("opaque", |ctx: ContextData<TestContext>| async move {
    if ctx.read().counter == 0 {
      return Err(anyhow::anyhow!("socket closed"));
    }
    Ok(PipelineControl::Continue)
  });
  pipeline.on_root("flow", |_ctx: ContextData<TestContext>| async move {
    Err::<PipelineControl, _>(anyhow::Error::new(flow::FlowError::StepNotFound {
      step_name: "ghost".to_string(),
    }))
  });

  let err = pipeline.run(ContextData::new(TestContext::default())).await.unwrap_err();
  assert!(matches!(err, flow::FlowError::HandlerError { .. }));

  // A FlowError carried through anyhow comes back unwrapped.
  let ctx = TestContext {
    counter: 1,
    ..Default::default()
  };
  let err = pipeline.run(ContextData::new(ctx)).await.unwrap_err();
  assert!(matches!(err, flow::FlowError::StepNotFound { .. }));
}
