// tests/readiness_loop.rs

mod common;
use crate::common::fake_executor::{FakeExecutor, FakeResponse};
use crate::common::init_tracing;

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use tart_executor::config::SshSection;
use tart_executor::errors::ExecutorError;
use tart_executor::tart::{Handshake, ReadinessPolicy, SshClient, wait_until_ready};

/// Fails the first `failures` handshakes, then succeeds. Records when each
/// attempt happened.
struct FlakyHost {
    failures: u32,
    attempts: AtomicU32,
    at: Mutex<Vec<Instant>>,
}

impl FlakyHost {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            attempts: AtomicU32::new(0),
            at: Mutex::new(Vec::new()),
        }
    }

    fn never_ready() -> Self {
        Self::new(u32::MAX)
    }
}

impl Handshake for FlakyHost {
    fn attempt<'a>(&'a self, _host: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            self.at.lock().unwrap().push(Instant::now());
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            n >= self.failures
        })
    }
}

fn policy(max_attempts: u32, interval_ms: u64) -> ReadinessPolicy {
    ReadinessPolicy {
        max_attempts,
        interval: Duration::from_millis(interval_ms),
    }
}

#[tokio::test(start_paused = true)]
async fn ready_on_first_attempt_does_not_sleep() {
    init_tracing();
    let host = FlakyHost::new(0);
    let start = Instant::now();

    let attempts = wait_until_ready(&host, "192.168.64.10", &policy(30, 1000))
        .await
        .unwrap();

    assert_eq!(attempts, 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn k_failures_then_success_costs_k_intervals() {
    init_tracing();
    for k in [1u32, 3, 7] {
        let host = FlakyHost::new(k);
        let start = Instant::now();

        let attempts = wait_until_ready(&host, "192.168.64.10", &policy(30, 1000))
            .await
            .unwrap();

        assert_eq!(attempts, k + 1);
        assert_eq!(start.elapsed(), Duration::from_secs(k as u64));

        let at = host.at.lock().unwrap();
        for pair in at.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_secs(1));
        }
    }
}

#[tokio::test(start_paused = true)]
async fn exhaustion_makes_exactly_max_attempts() {
    init_tracing();
    let host = FlakyHost::never_ready();
    let start = Instant::now();

    let err = wait_until_ready(&host, "192.168.64.10", &policy(30, 1000))
        .await
        .unwrap_err();

    match err {
        ExecutorError::ReadinessTimeout { host: h, attempts } => {
            assert_eq!(h, "192.168.64.10");
            assert_eq!(attempts, 30);
        }
        other => panic!("expected ReadinessTimeout, got {other:?}"),
    }
    assert_eq!(host.attempts.load(Ordering::SeqCst), 30);
    assert_eq!(start.elapsed(), Duration::from_secs(29));
}

#[tokio::test(start_paused = true)]
async fn single_attempt_budget_never_sleeps() {
    init_tracing();
    let host = FlakyHost::never_ready();
    let start = Instant::now();

    let err = wait_until_ready(&host, "10.0.0.2", &policy(1, 5000))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutorError::ReadinessTimeout { attempts: 1, .. }));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn ssh_client_drives_the_loop_through_the_executor() {
    init_tracing();
    let refused = FakeResponse::fail(255, "ssh: connect to host 192.168.64.10 port 22: Connection refused");
    let fake = FakeExecutor::new().respond_sequence(
        &["ssh"],
        vec![refused.clone(), refused, FakeResponse::ok()],
    );
    let ssh = SshClient::from_config(&fake, &SshSection::default());

    let attempts = wait_until_ready(&ssh, "192.168.64.10", &policy(30, 200))
        .await
        .unwrap();

    assert_eq!(attempts, 3);
    assert_eq!(fake.count(&["ssh"]), 3);
    for line in fake.command_lines() {
        assert_eq!(line.last().map(String::as_str), Some("true"));
        assert!(line.contains(&"admin@192.168.64.10".to_string()));
    }
}
