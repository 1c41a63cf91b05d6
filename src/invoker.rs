//! Ordered fallback chains for launching external tools.
//!
//! A headless browser that starts fine on a developer laptop may refuse to
//! start in a container (no sandbox support, tiny `/dev/shm`, an old build
//! without `--headless=new`). Rather than guessing, the caller lists launch
//! strategies from most to least hardened and [`launch_with_fallback`]
//! tries them in order:
//!
//! ```text
//! strategy 1 ──fail/timeout──▶ strategy 2 ──fail/timeout──▶ … ──▶ LaunchExhausted
//!      │                            │
//!      └──ok──▶ Launched { attempt: 1 }   └──ok──▶ Launched { attempt: 2 }
//! ```
//!
//! Every attempt runs under its own deadline. A timed-out attempt is
//! dropped, so anything it spawned with `kill_on_drop` is reaped before the
//! next strategy starts. Failures are logged with their 1-based index and
//! forwarded to the progress callback; once the chain is exhausted only the
//! last failure is reported in the returned error.

use std::fmt::Display;
use std::future::Future;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{AttemptError, DocConvError};
use crate::progress::ProgressCallback;

/// One entry in a fallback chain.
pub trait LaunchStrategy {
    /// Short label for logs and progress events, e.g. `"hardened"`.
    fn name(&self) -> &str;
}

impl LaunchStrategy for &str {
    fn name(&self) -> &str {
        self
    }
}

/// The value produced by the first strategy that succeeded.
#[derive(Debug)]
pub struct Launched<T> {
    pub value: T,
    /// 1-based position of the winning strategy.
    pub attempt: usize,
    pub strategy: String,
}

/// Settings shared by every attempt of one chain.
#[derive(Clone, Copy)]
pub struct FallbackChain<'a> {
    /// Name used in errors, e.g. `"headless browser"`.
    pub tool: &'a str,
    pub per_attempt: Duration,
    pub progress: Option<&'a ProgressCallback>,
}

impl<'a> FallbackChain<'a> {
    pub fn new(tool: &'a str, per_attempt: Duration) -> Self {
        Self {
            tool,
            per_attempt,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<&'a ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }
}

/// Try `attempt` with each strategy in order until one succeeds.
///
/// # Errors
/// [`DocConvError::LaunchExhausted`] when every strategy failed or timed
/// out, carrying the number of attempts and the last failure reason.
pub async fn launch_with_fallback<S, T, E, F, Fut>(
    chain: &FallbackChain<'_>,
    strategies: &[S],
    mut attempt: F,
) -> Result<Launched<T>, DocConvError>
where
    S: LaunchStrategy,
    E: Display,
    F: FnMut(&S) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let total = strategies.len();
    let mut last_failure: Option<AttemptError> = None;

    for (i, strategy) in strategies.iter().enumerate() {
        let index = i + 1;
        let name = strategy.name();
        debug!("{}: attempt {}/{} ({})", chain.tool, index, total, name);
        if let Some(cb) = chain.progress {
            cb.on_attempt_start(index, total, name);
        }

        let failure = match tokio::time::timeout(chain.per_attempt, attempt(strategy)).await {
            Ok(Ok(value)) => {
                if index > 1 {
                    info!("{} launched with fallback strategy {} ({})", chain.tool, index, name);
                }
                return Ok(Launched {
                    value,
                    attempt: index,
                    strategy: name.to_string(),
                });
            }
            Ok(Err(e)) => AttemptError::Failed {
                index,
                strategy: name.to_string(),
                reason: e.to_string(),
            },
            Err(_) => AttemptError::TimedOut {
                index,
                strategy: name.to_string(),
                secs: chain.per_attempt.as_secs(),
            },
        };

        warn!("{}: launch attempt {} failed: {}", chain.tool, index, failure.reason());
        if let Some(cb) = chain.progress {
            cb.on_attempt_failed(&failure);
        }
        last_failure = Some(failure);
    }

    Err(DocConvError::LaunchExhausted {
        tool: chain.tool.to_string(),
        attempts: total,
        last_error: last_failure
            .map(|f| f.reason())
            .unwrap_or_else(|| "no launch strategies configured".to_string()),
    })
}

/// Run `command` to completion within `limit`, capturing stdout and stderr.
///
/// The child is killed if the deadline passes or the future is dropped.
///
/// # Errors
/// [`DocConvError::DelegateFailed`] if the program cannot be started or
/// exits unsuccessfully, [`DocConvError::Timeout`] if it overruns.
pub async fn run_command(
    mut command: Command,
    limit: Duration,
    operation: &str,
) -> Result<Output, DocConvError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(limit, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(DocConvError::DelegateFailed {
                delegate: operation.to_string(),
                detail: e.to_string(),
            })
        }
        Err(_) => {
            return Err(DocConvError::Timeout {
                operation: operation.to_string(),
                secs: limit.as_secs(),
            })
        }
    };

    if !output.status.success() {
        return Err(DocConvError::DelegateFailed {
            delegate: operation.to_string(),
            detail: describe_failure(&output),
        });
    }
    Ok(output)
}

/// Exit status plus the last few lines of stderr.
pub fn describe_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let tail = lines[lines.len().saturating_sub(3)..].join(" | ");
    if tail.is_empty() {
        output.status.to_string()
    } else {
        format!("{}: {}", output.status, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ConversionProgressCallback;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn chain(ms: u64) -> FallbackChain<'static> {
        FallbackChain::new("test tool", Duration::from_millis(ms))
    }

    #[derive(Default)]
    struct Recorder {
        started: AtomicUsize,
        failed: Mutex<Vec<usize>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_attempt_start(&self, _index: usize, _total: usize, _strategy: &str) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_attempt_failed(&self, error: &AttemptError) {
            self.failed.lock().unwrap().push(error.index());
        }
    }

    #[tokio::test]
    async fn first_success_wins() {
        let calls = AtomicUsize::new(0);
        let launched = launch_with_fallback(&chain(1000), &["a", "b"], |s| {
            calls.fetch_add(1, Ordering::SeqCst);
            let s = s.to_string();
            async move { Ok::<_, String>(s) }
        })
        .await
        .unwrap();

        assert_eq!(launched.value, "a");
        assert_eq!(launched.attempt, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn falls_through_to_later_strategy() {
        let launched = launch_with_fallback(&chain(1000), &["one", "two", "three"], |s| {
            let ok = *s == "three";
            async move {
                if ok {
                    Ok(42)
                } else {
                    Err("refused to start")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(launched.value, 42);
        assert_eq!(launched.attempt, 3);
        assert_eq!(launched.strategy, "three");
    }

    #[tokio::test]
    async fn exhaustion_reports_last_error_and_count() {
        let err = launch_with_fallback(&chain(1000), &["x", "y"], |s| {
            let msg = format!("{s} crashed");
            async move { Err::<(), _>(msg) }
        })
        .await
        .unwrap_err();

        match err {
            DocConvError::LaunchExhausted {
                tool,
                attempts,
                last_error,
            } => {
                assert_eq!(tool, "test tool");
                assert_eq!(attempts, 2);
                assert_eq!(last_error, "y crashed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn slow_attempt_times_out_and_chain_continues() {
        let launched = launch_with_fallback(&chain(50), &["hangs", "quick"], |s| {
            let hang = *s == "hangs";
            async move {
                if hang {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
                Ok::<_, String>("done")
            }
        })
        .await
        .unwrap();

        assert_eq!(launched.attempt, 2);
    }

    #[tokio::test]
    async fn all_time_out() {
        let err = launch_with_fallback(&chain(20), &["a"], |_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<(), String>(())
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }

    #[tokio::test]
    async fn empty_chain_is_exhausted() {
        let strategies: [&str; 0] = [];
        let err = launch_with_fallback(&chain(10), &strategies, |_| async {
            Ok::<(), String>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, DocConvError::LaunchExhausted { attempts: 0, .. }));
    }

    #[tokio::test]
    async fn progress_sees_every_attempt_and_failure() {
        let recorder = Arc::new(Recorder::default());
        let cb: ProgressCallback = recorder.clone();
        let chain = chain(1000).with_progress(Some(&cb));

        launch_with_fallback(&chain, &["a", "b", "c"], |s| {
            let ok = *s == "c";
            async move { if ok { Ok(()) } else { Err("nope") } }
        })
        .await
        .unwrap();

        assert_eq!(recorder.started.load(Ordering::SeqCst), 3);
        assert_eq!(*recorder.failed.lock().unwrap(), vec![1, 2]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_command_reports_exit_status_and_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo first >&2; echo boom >&2; exit 3"]);
        let err = run_command(cmd, Duration::from_secs(10), "shell").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("shell failed"), "got: {msg}");
        assert!(msg.contains("boom"), "got: {msg}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_command_times_out() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let err = run_command(cmd, Duration::from_millis(100), "sleeper").await.unwrap_err();
        assert!(matches!(err, DocConvError::Timeout { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn run_command_missing_program() {
        let cmd = Command::new("definitely-not-a-real-program-docconv");
        let err = run_command(cmd, Duration::from_secs(5), "ghost").await.unwrap_err();
        assert!(matches!(err, DocConvError::DelegateFailed { .. }), "got: {err}");
    }
}
