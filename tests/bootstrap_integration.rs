//! Integration tests for the bootstrap sequence
//!
//! Drives the bootstrapper against a mock daemon so the sequencing
//! guarantees hold without Ollama running: probe counting, pull ordering,
//! and the always-once final listing.

use async_trait::async_trait;
use chrono::Utc;
use ollamaprime::bootstrap::{
    BackoffPolicy, BootstrapConfig, Bootstrapper, Phase, ProvisionOutcome,
};
use ollamaprime::errors::{PrimerError, Result};
use ollamaprime::models::{ModelDaemon, ModelInfo, ProgressCallback};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted daemon: fails the first `ready_after` probes, then answers.
/// Records every call in order for sequencing assertions.
struct MockDaemon {
    ready_after: u64,
    fail_pulls: bool,
    fail_list: bool,
    probes: AtomicU64,
    calls: Mutex<Vec<String>>,
}

impl MockDaemon {
    fn new(ready_after: u64) -> Self {
        Self {
            ready_after,
            fail_pulls: false,
            fail_list: false,
            probes: AtomicU64::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn never_ready() -> Self {
        Self::new(u64::MAX)
    }

    fn probes(&self) -> u64 {
        self.probes.load(Ordering::SeqCst)
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl ModelDaemon for MockDaemon {
    async fn probe(&self) -> bool {
        let seen = self.probes.fetch_add(1, Ordering::SeqCst);
        self.record("probe");
        seen >= self.ready_after
    }

    async fn pull_model(&self, name: &str, _progress: Option<ProgressCallback>) -> Result<()> {
        self.record(&format!("pull:{}", name));
        if self.fail_pulls {
            Err(PrimerError::OllamaApiError("manifest not found".to_string()))
        } else {
            Ok(())
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.record("list");
        if self.fail_list {
            return Err(PrimerError::OllamaApiError("listing failed".to_string()));
        }
        Ok(vec![ModelInfo {
            name: "llama3.2:3b".to_string(),
            size: 2019393189,
            modified_at: Utc::now(),
            digest: "sha256:feed".to_string(),
        }])
    }
}

fn fast_config() -> BootstrapConfig {
    BootstrapConfig {
        poll_interval: Duration::from_millis(1),
        ..BootstrapConfig::default()
    }
}

fn bootstrapper(daemon: Arc<MockDaemon>, config: BootstrapConfig) -> Bootstrapper<Arc<MockDaemon>> {
    Bootstrapper::new(daemon, config).quiet(true)
}

#[tokio::test]
async fn test_probe_count_matches_failures_plus_one() {
    for failures in [0u64, 1, 2, 7] {
        let daemon = Arc::new(MockDaemon::new(failures));
        let mut boot = bootstrapper(Arc::clone(&daemon), fast_config());

        let report = boot.run().await.unwrap();

        assert_eq!(report.probes, failures + 1);
        assert_eq!(daemon.probes(), failures + 1);
    }
}

#[tokio::test]
async fn test_immediate_success_sends_single_probe() {
    let daemon = Arc::new(MockDaemon::new(0));
    let boot = bootstrapper(Arc::clone(&daemon), fast_config());

    let probes = boot.wait_until_ready().await.unwrap();

    assert_eq!(probes, 1);
    assert_eq!(daemon.calls(), vec!["probe"]);
}

#[tokio::test]
async fn test_pulls_both_models_in_order_then_lists() {
    let daemon = Arc::new(MockDaemon::new(2));
    let mut boot = bootstrapper(Arc::clone(&daemon), fast_config());

    let report = boot.run().await.unwrap();

    let calls = daemon.calls();
    assert_eq!(
        calls,
        vec![
            "probe",
            "probe",
            "probe",
            "pull:llama3.2:3b",
            "pull:nomic-embed-text",
            "list",
        ]
    );
    assert!(report.all_provisioned());
    assert_eq!(report.installed.len(), 1);
    assert_eq!(boot.phase(), Phase::Done);
}

#[tokio::test]
async fn test_listing_still_issued_when_pulls_fail() {
    let mut daemon = MockDaemon::new(0);
    daemon.fail_pulls = true;
    let daemon = Arc::new(daemon);
    let mut boot = bootstrapper(Arc::clone(&daemon), fast_config());

    let report = boot.run().await.unwrap();

    // Best-effort: failed pulls are recorded, not fatal, and the listing
    // still happens exactly once afterwards
    assert!(!report.all_provisioned());
    assert_eq!(report.provisioned.len(), 2);
    for record in &report.provisioned {
        assert!(matches!(record.outcome, ProvisionOutcome::Failed(_)));
    }

    let calls = daemon.calls();
    assert_eq!(calls.iter().filter(|c| *c == "list").count(), 1);
    assert_eq!(calls.last().map(String::as_str), Some("list"));
}

#[tokio::test]
async fn test_listing_failure_does_not_fail_the_run() {
    let mut daemon = MockDaemon::new(0);
    daemon.fail_list = true;
    let daemon = Arc::new(daemon);
    let mut boot = bootstrapper(Arc::clone(&daemon), fast_config());

    let report = boot.run().await.unwrap();

    assert!(report.all_provisioned());
    assert!(report.installed.is_empty());
    assert!(report.list_error.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_wait_never_provisions() {
    let daemon = Arc::new(MockDaemon::never_ready());
    let mut boot = bootstrapper(
        Arc::clone(&daemon),
        BootstrapConfig {
            poll_interval: Duration::from_secs(1),
            ..BootstrapConfig::default()
        },
    );

    // An hour of virtual time: still waiting, and nothing besides probes
    // has been issued
    let outcome = tokio::time::timeout(Duration::from_secs(3600), boot.run()).await;
    assert!(outcome.is_err());

    let calls = daemon.calls();
    assert!(!calls.is_empty());
    assert!(calls.iter().all(|c| c == "probe"));
}

#[tokio::test]
async fn test_attempt_cap_aborts_with_typed_error() {
    let daemon = Arc::new(MockDaemon::never_ready());
    let mut boot = bootstrapper(
        Arc::clone(&daemon),
        BootstrapConfig {
            poll_interval: Duration::from_millis(1),
            max_attempts: Some(5),
            ..BootstrapConfig::default()
        },
    );

    let err = boot.run().await.unwrap_err();

    match err {
        PrimerError::DaemonUnreachable { attempts } => assert_eq!(attempts, 5),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(daemon.probes(), 5);
    assert!(daemon.calls().iter().all(|c| c == "probe"));
}

#[tokio::test]
async fn test_custom_model_pair() {
    let daemon = Arc::new(MockDaemon::new(0));
    let mut boot = bootstrapper(
        Arc::clone(&daemon),
        BootstrapConfig {
            poll_interval: Duration::from_millis(1),
            llm_model: "qwen2.5:7b".to_string(),
            embed_model: "mxbai-embed-large".to_string(),
            ..BootstrapConfig::default()
        },
    );

    let report = boot.run().await.unwrap();

    assert_eq!(report.provisioned[0].model, "qwen2.5:7b");
    assert_eq!(report.provisioned[1].model, "mxbai-embed-large");
    let calls = daemon.calls();
    assert_eq!(calls[1], "pull:qwen2.5:7b");
    assert_eq!(calls[2], "pull:mxbai-embed-large");
}

#[tokio::test(start_paused = true)]
async fn test_exponential_backoff_slows_probing() {
    let daemon = Arc::new(MockDaemon::never_ready());
    let boot = bootstrapper(
        Arc::clone(&daemon),
        BootstrapConfig {
            poll_interval: Duration::from_secs(1),
            backoff: BackoffPolicy::Exponential,
            ..BootstrapConfig::default()
        },
    );

    // Delays 1+2+4+8+16+32 = 63s, so 63s of virtual time allows at most
    // 7 probes; fixed backoff would have fit ~64
    let _ = tokio::time::timeout(Duration::from_secs(63), boot.wait_until_ready()).await;
    assert!(daemon.probes() <= 7);
}
