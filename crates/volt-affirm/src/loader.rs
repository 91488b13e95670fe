//! # Browser SDK Loader
//!
//! State machine for loading the provider's browser SDK exactly once per
//! (script URL, public key) configuration. The loader owns its state
//! explicitly; nothing lives in module globals, so tests can run several
//! independent instances.
//!
//! Document interaction sits behind the `ScriptHost` trait: insert/remove
//! a script reference and report whether the provider's global API surface
//! has become observable.

use crate::config::AffirmEnvironment;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Bound on waiting for the SDK's API surface after the script loads
pub const SDK_READY_TIMEOUT: Duration = Duration::from_secs(7);

/// Poll interval for the readiness check
pub const SDK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Loader failure modes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("Missing Affirm public key")]
    MissingPublicKey,
    #[error("Failed to load Affirm script")]
    ScriptLoadFailed,
    #[error("Affirm script loaded but checkout API did not initialize")]
    InitTimeout,
}

/// What the host can observe about an inserted script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    /// Script still loading (or API not yet polled)
    Loading,
    /// The script reference failed to load
    Failed,
    /// Script loaded; `api_ready` says whether the provider's global
    /// surface is observable yet
    Loaded { api_ready: bool },
}

/// Abstraction over the document hosting the script
pub trait ScriptHost: Send + Sync + 'static {
    fn insert_script(&self, src: &str);
    fn remove_script(&self, src: &str);
    fn status(&self, src: &str) -> ScriptStatus;
}

/// Loader lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderPhase {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LoaderConfig {
    script_url: &'static str,
    public_key: String,
}

type LoadFuture = Shared<BoxFuture<'static, Result<(), LoaderError>>>;

struct Inner {
    phase: LoaderPhase,
    config: Option<LoaderConfig>,
    inflight: Option<LoadFuture>,
}

/// SDK loader with explicit owned state.
///
/// The memoized in-flight future is the whole concurrency story: two
/// concurrent `load` calls with the same configuration share one future,
/// so at most one script insertion happens per configuration.
pub struct SdkLoader {
    host: Arc<dyn ScriptHost>,
    inner: Arc<Mutex<Inner>>,
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl SdkLoader {
    pub fn new(host: Arc<dyn ScriptHost>) -> Self {
        Self {
            host,
            inner: Arc::new(Mutex::new(Inner {
                phase: LoaderPhase::Unloaded,
                config: None,
                inflight: None,
            })),
            ready_timeout: SDK_READY_TIMEOUT,
            poll_interval: SDK_POLL_INTERVAL,
        }
    }

    /// Builder: override the readiness bounds (for testing)
    pub fn with_timings(mut self, ready_timeout: Duration, poll_interval: Duration) -> Self {
        self.ready_timeout = ready_timeout;
        self.poll_interval = poll_interval;
        self
    }

    pub fn phase(&self) -> LoaderPhase {
        self.inner.lock().expect("loader state poisoned").phase
    }

    /// Load the SDK for the given key and environment.
    ///
    /// Idempotent once ready with a matching configuration; joins any
    /// matching in-flight load; a changed configuration discards the prior
    /// script and state before starting fresh.
    pub async fn load(
        &self,
        public_key: &str,
        environment: AffirmEnvironment,
    ) -> Result<(), LoaderError> {
        let public_key = public_key.trim();
        if public_key.is_empty() {
            return Err(LoaderError::MissingPublicKey);
        }

        let config = LoaderConfig {
            script_url: environment.script_url(),
            public_key: public_key.to_string(),
        };

        // The lock is only held to inspect/update state, never across an
        // await point.
        let fut = {
            let mut inner = self.inner.lock().expect("loader state poisoned");
            let config_matches = inner.config.as_ref() == Some(&config);

            if config_matches && inner.phase == LoaderPhase::Ready {
                if matches!(
                    self.host.status(config.script_url),
                    ScriptStatus::Loaded { api_ready: true }
                ) {
                    return Ok(());
                }
                // API surface went away under us; fall through to reload
                warn!("SDK was ready but API surface is gone, reloading");
            }

            if config_matches && inner.phase == LoaderPhase::Loading {
                if let Some(existing) = inner.inflight.clone() {
                    existing
                } else {
                    self.start_load(&mut inner, config)
                }
            } else {
                // Configuration changed since the last load: drop the old
                // script tag and state, then start clean.
                if let Some(prev) = inner.config.take() {
                    debug!(script = prev.script_url, "discarding previously loaded SDK");
                    self.host.remove_script(prev.script_url);
                }
                self.start_load(&mut inner, config)
            }
        };

        fut.await
    }

    fn start_load(&self, inner: &mut Inner, config: LoaderConfig) -> LoadFuture {
        let host = Arc::clone(&self.host);
        let state = Arc::clone(&self.inner);
        let ready_timeout = self.ready_timeout;
        let poll_interval = self.poll_interval;
        let fut_config = config.clone();

        let fut: LoadFuture = async move {
            host.insert_script(fut_config.script_url);
            let result =
                wait_for_ready(&*host, fut_config.script_url, ready_timeout, poll_interval).await;

            let mut guard = state.lock().expect("loader state poisoned");
            // Only record the outcome if this load is still the current one;
            // a config change may have superseded it mid-flight.
            if guard.config.as_ref() == Some(&fut_config) {
                guard.phase = if result.is_ok() {
                    LoaderPhase::Ready
                } else {
                    LoaderPhase::Failed
                };
                guard.inflight = None;
            }
            result
        }
        .boxed()
        .shared();

        inner.phase = LoaderPhase::Loading;
        inner.config = Some(config);
        inner.inflight = Some(fut.clone());
        fut
    }
}

/// Poll until the API surface is observable, the script fails, or the
/// readiness bound elapses.
async fn wait_for_ready(
    host: &dyn ScriptHost,
    src: &str,
    ready_timeout: Duration,
    poll_interval: Duration,
) -> Result<(), LoaderError> {
    let started = tokio::time::Instant::now();
    loop {
        match host.status(src) {
            ScriptStatus::Failed => return Err(LoaderError::ScriptLoadFailed),
            ScriptStatus::Loaded { api_ready: true } => return Ok(()),
            _ => {}
        }
        if started.elapsed() >= ready_timeout {
            return Err(LoaderError::InitTimeout);
        }
        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

    struct MockHost {
        inserts: AtomicUsize,
        removals: AtomicUsize,
        polls_until_ready: AtomicI64,
        fail_script: AtomicBool,
    }

    impl MockHost {
        fn ready_after(polls: i64) -> Arc<Self> {
            Arc::new(Self {
                inserts: AtomicUsize::new(0),
                removals: AtomicUsize::new(0),
                polls_until_ready: AtomicI64::new(polls),
                fail_script: AtomicBool::new(false),
            })
        }

        fn failing() -> Arc<Self> {
            let host = Self::ready_after(i64::MAX);
            host.fail_script.store(true, Ordering::SeqCst);
            host
        }
    }

    impl ScriptHost for MockHost {
        fn insert_script(&self, _src: &str) {
            self.inserts.fetch_add(1, Ordering::SeqCst);
        }

        fn remove_script(&self, _src: &str) {
            self.removals.fetch_add(1, Ordering::SeqCst);
        }

        fn status(&self, _src: &str) -> ScriptStatus {
            if self.fail_script.load(Ordering::SeqCst) {
                return ScriptStatus::Failed;
            }
            if self.polls_until_ready.fetch_sub(1, Ordering::SeqCst) <= 0 {
                ScriptStatus::Loaded { api_ready: true }
            } else {
                ScriptStatus::Loading
            }
        }
    }

    fn fast_loader(host: Arc<MockHost>) -> SdkLoader {
        SdkLoader::new(host)
            .with_timings(Duration::from_millis(200), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_load_reaches_ready() {
        let host = MockHost::ready_after(0);
        let loader = fast_loader(host.clone());

        loader
            .load("pk_live_1", AffirmEnvironment::Prod)
            .await
            .unwrap();

        assert_eq!(loader.phase(), LoaderPhase::Ready);
        assert_eq!(host.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_key_never_touches_host() {
        let host = MockHost::ready_after(0);
        let loader = fast_loader(host.clone());

        let err = loader
            .load("   ", AffirmEnvironment::Prod)
            .await
            .unwrap_err();

        assert_eq!(err, LoaderError::MissingPublicKey);
        assert_eq!(host.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(loader.phase(), LoaderPhase::Unloaded);
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_insertion() {
        let host = MockHost::ready_after(4);
        let loader = fast_loader(host.clone());

        let (a, b) = tokio::join!(
            loader.load("pk_live_1", AffirmEnvironment::Prod),
            loader.load("pk_live_1", AffirmEnvironment::Prod),
        );

        a.unwrap();
        b.unwrap();
        assert_eq!(host.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ready_load_is_idempotent() {
        let host = MockHost::ready_after(0);
        let loader = fast_loader(host.clone());

        loader.load("pk_live_1", AffirmEnvironment::Prod).await.unwrap();
        loader.load("pk_live_1", AffirmEnvironment::Prod).await.unwrap();

        assert_eq!(host.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_config_change_discards_and_reloads() {
        let host = MockHost::ready_after(0);
        let loader = fast_loader(host.clone());

        loader.load("pk_live_1", AffirmEnvironment::Prod).await.unwrap();
        loader.load("pk_live_2", AffirmEnvironment::Prod).await.unwrap();

        assert_eq!(host.removals.load(Ordering::SeqCst), 1);
        assert_eq!(host.inserts.load(Ordering::SeqCst), 2);
        assert_eq!(loader.phase(), LoaderPhase::Ready);
    }

    #[tokio::test]
    async fn test_script_failure() {
        let host = MockHost::failing();
        let loader = fast_loader(host.clone());

        let err = loader
            .load("pk_live_1", AffirmEnvironment::Prod)
            .await
            .unwrap_err();

        assert_eq!(err, LoaderError::ScriptLoadFailed);
        assert_eq!(loader.phase(), LoaderPhase::Failed);
    }

    #[tokio::test]
    async fn test_api_never_initializes_times_out() {
        let host = MockHost::ready_after(i64::MAX);
        let loader = SdkLoader::new(host.clone())
            .with_timings(Duration::from_millis(50), Duration::from_millis(5));

        let err = loader
            .load("pk_live_1", AffirmEnvironment::Prod)
            .await
            .unwrap_err();

        assert_eq!(err, LoaderError::InitTimeout);
        assert_eq!(loader.phase(), LoaderPhase::Failed);
        // Script was inserted exactly once even though init never completed
        assert_eq!(host.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_can_be_retried() {
        let host = MockHost::failing();
        let loader = fast_loader(host.clone());

        loader
            .load("pk_live_1", AffirmEnvironment::Prod)
            .await
            .unwrap_err();

        // The script starts working on the retry
        host.fail_script.store(false, Ordering::SeqCst);
        host.polls_until_ready.store(0, Ordering::SeqCst);

        loader.load("pk_live_1", AffirmEnvironment::Prod).await.unwrap();
        assert_eq!(loader.phase(), LoaderPhase::Ready);
    }
}
