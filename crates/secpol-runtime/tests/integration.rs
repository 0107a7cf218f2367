// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end tests driving a [`RuntimePolicy`] against the in-process
//! testkit controller, exercising the scenarios from the policy's spec.

use secpol_runtime::{DebugMode, RuntimeError, RuntimePolicy};
use secpol_testkit::{AlwaysBuildsPolicyBuilder, FailingPolicyBuilder, InProcessControllerFactory, Reaction};

#[tokio::test]
async fn unbuilt_ingest_reports_not_built_and_render_is_empty() {
    let policy = RuntimePolicy::new("policy/x/0", None);

    let err = policy
        .ingest(serde_json::json!({"a": 1}).into())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::NotBuilt { .. }));
    assert!(err.to_string().contains("not built"));

    let (output, trace) = policy.render(DebugMode::OutputOnly).await;
    assert_eq!(output, "");
    assert_eq!(trace, "{}");
}

#[tokio::test]
async fn happy_path_compact_view_reports_condition_payload() {
    let policy = RuntimePolicy::new("policy/x/0", None);
    let factory = InProcessControllerFactory::with_reaction(|_event| Reaction {
        output: Some("{\n \"a\": 1\n}\n".to_string()),
        traces: vec!["[decoder/d/0] [condition]:matched".to_string()],
    });

    policy
        .build(&AlwaysBuildsPolicyBuilder, &factory)
        .await
        .unwrap();
    policy.ingest(serde_json::json!({"a": 1}).into()).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let (output, trace) = policy.render(DebugMode::OutputAndTraces).await;
    assert_eq!(output, "{\n \"a\": 1\n}\n");
    let parsed: serde_json::Value = serde_json::from_str(&trace).unwrap();
    assert_eq!(parsed["/decoder~1d~10"], "matched");
}

#[tokio::test]
async fn history_is_empty_immediately_after_any_render() {
    let policy = RuntimePolicy::new("policy/x/0", None);
    let factory = InProcessControllerFactory::with_reaction(|_event| Reaction {
        output: Some("out".to_string()),
        traces: vec!["[a/0] [condition]:x".to_string()],
    });
    policy
        .build(&AlwaysBuildsPolicyBuilder, &factory)
        .await
        .unwrap();
    policy.ingest(serde_json::json!({}).into()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let first = policy.render(DebugMode::OutputAndTracesWithDetails).await;
    let second = policy.render(DebugMode::OutputAndTracesWithDetails).await;
    assert_eq!(first.0, second.0);
    assert_eq!(second.1, "{}");
}

#[tokio::test]
async fn double_build_fails_but_the_first_pipeline_keeps_working() {
    let policy = RuntimePolicy::new("policy/x/0", None);
    let factory = InProcessControllerFactory::echo();
    policy
        .build(&AlwaysBuildsPolicyBuilder, &factory)
        .await
        .unwrap();

    let err = policy
        .build(&AlwaysBuildsPolicyBuilder, &factory)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::AlreadyBuilt { .. }));

    policy.ingest(serde_json::json!({"still": "works"}).into()).await.unwrap();
}

#[tokio::test]
async fn build_failure_is_reported_and_policy_stays_unbuilt() {
    let policy = RuntimePolicy::new("policy/x/0", None);
    let builder = FailingPolicyBuilder::new("unknown asset decoder/missing/0");
    let factory = InProcessControllerFactory::echo();

    let err = policy.build(&builder, &factory).await.unwrap_err();
    assert!(matches!(err, RuntimeError::BuildFailure { .. }));
    assert!(err.to_string().contains("Error building policy"));

    let err = policy.ingest(serde_json::json!({}).into()).await.unwrap_err();
    assert!(matches!(err, RuntimeError::NotBuilt { .. }));
}

#[tokio::test]
async fn malformed_trace_lines_never_surface_in_render() {
    let policy = RuntimePolicy::new("policy/x/0", None);
    let factory = InProcessControllerFactory::with_reaction(|_event| Reaction {
        output: Some("out".to_string()),
        traces: vec!["not a trace".to_string(), "[broken".to_string()],
    });
    policy
        .build(&AlwaysBuildsPolicyBuilder, &factory)
        .await
        .unwrap();
    policy.ingest(serde_json::json!({}).into()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let (_output, trace) = policy.render(DebugMode::OutputAndTracesWithDetails).await;
    assert_eq!(trace, "{}");
}

#[tokio::test]
async fn detailed_view_deduplicates_repeated_lines_per_asset() {
    let policy = RuntimePolicy::new("f/x/0", None);
    let factory = InProcessControllerFactory::with_reaction(|_event| Reaction {
        output: Some("out".to_string()),
        traces: vec![
            "[f/x/0] [condition]:fired".to_string(),
            "[f/x/0] hit".to_string(),
            "[f/x/0] hit".to_string(),
            "[f/x/0] hit".to_string(),
            "[f/x/0] miss".to_string(),
        ],
    });
    policy
        .build(&AlwaysBuildsPolicyBuilder, &factory)
        .await
        .unwrap();
    policy.ingest(serde_json::json!({}).into()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let (_output, trace) = policy.render(DebugMode::OutputAndTracesWithDetails).await;
    let parsed: serde_json::Value = serde_json::from_str(&trace).unwrap();
    let rendered = parsed["/f~1x~10"].as_str().unwrap();
    assert_eq!(rendered.matches("hit").count(), 1);
    assert_eq!(rendered.matches("miss").count(), 1);
}
