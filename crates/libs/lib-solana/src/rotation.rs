//! # RPC Endpoint Rotation
//!
//! Maintains an ordered pool of node RPC endpoints and retries operations
//! across them on failure.
//!
//! ## Rotation Contract
//!
//! - An operation is attempted at most once per endpoint (pool size attempts).
//! - Any failure rotates the cursor forward, then waits a fixed 500 ms before
//!   the next attempt; the last failure is surfaced immediately with no
//!   trailing delay.
//! - A success leaves the cursor on the endpoint that served the call; there
//!   is no reset-to-first policy, so a healthy endpoint keeps serving
//!   subsequent calls.
//! - An empty pool fails fast with a configuration error and zero attempts.
//!
//! The pool is an injected instance owned by the composition root, never a
//! process-wide singleton; tests construct pools freely.
//!
//! ## Concurrent callers
//!
//! The cursor is the only shared mutable state. Concurrent `with_failover`
//! calls interleave their rotations, so a failure in one call can advance the
//! cursor under another. Endpoint selection is best-effort, not linearizable;
//! plain load/store is deliberate.

use lib_core::{AppError, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::warn;

/// Fixed delay between failover attempts.
///
/// Linear, not exponential: failover targets are assumed independently
/// healthy most of the time, and the first attempt carries no delay at all.
pub const ROTATION_BACKOFF: Duration = Duration::from_millis(500);

/// Ordered pool of node RPC endpoint URLs with a rotating cursor.
pub struct RpcEndpointPool {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
}

impl RpcEndpointPool {
    /// Create a pool over an ordered list of endpoint URLs.
    ///
    /// The list is fixed for the lifetime of the pool; only the cursor moves.
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of endpoints in the pool.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the pool has no endpoints at all.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed) % self.endpoints.len().max(1)
    }

    /// The endpoint the cursor currently points at.
    pub fn current_endpoint(&self) -> Result<&str> {
        if self.endpoints.is_empty() {
            return Err(AppError::Config(
                "no RPC endpoints configured (SOLANA_RPC_URLS)".to_string(),
            ));
        }
        Ok(&self.endpoints[self.cursor()])
    }

    /// Move the cursor to the next endpoint (wrapping) and return it.
    pub fn advance(&self) -> Result<&str> {
        if self.endpoints.is_empty() {
            return Err(AppError::Config(
                "no RPC endpoints configured (SOLANA_RPC_URLS)".to_string(),
            ));
        }
        let next = (self.cursor.load(Ordering::Relaxed) + 1) % self.endpoints.len();
        self.cursor.store(next, Ordering::Relaxed);
        Ok(&self.endpoints[next])
    }

    /// Run `op` against the current endpoint, rotating through the pool on
    /// any failure.
    ///
    /// Every error rotates, including ones no other endpoint could fix (a
    /// malformed request exhausts the pool before surfacing). Callers that
    /// can classify their errors should use [`with_failover_when`].
    ///
    /// [`with_failover_when`]: Self::with_failover_when
    pub async fn with_failover<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(Arc<RpcClient>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.with_failover_when(op, |_| true).await
    }

    /// Run `op` with failover, rotating only when `should_rotate` accepts the
    /// error.
    ///
    /// A rejected error is surfaced immediately without advancing the cursor,
    /// so validation and provider errors do not burn through the pool.
    pub async fn with_failover_when<T, F, Fut, P>(&self, op: F, should_rotate: P) -> Result<T>
    where
        F: Fn(Arc<RpcClient>) -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&AppError) -> bool,
    {
        if self.endpoints.is_empty() {
            return Err(AppError::Config(
                "no RPC endpoints configured (SOLANA_RPC_URLS)".to_string(),
            ));
        }

        let attempts = self.endpoints.len();
        let mut last_error = None;

        for attempt in 0..attempts {
            let url = self.current_endpoint()?.to_string();
            let client = Arc::new(RpcClient::new(url.clone()));

            match op(client).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !should_rotate(&err) {
                        return Err(err);
                    }
                    warn!(
                        "RPC call failed on {} ({}/{}): {}",
                        url,
                        attempt + 1,
                        attempts,
                        err
                    );
                    self.advance()?;
                    if attempt + 1 == attempts {
                        return Err(err);
                    }
                    last_error = Some(err);
                    tokio::time::sleep(ROTATION_BACKOFF).await;
                }
            }
        }

        // Unreachable: the last attempt returns its error above
        Err(last_error.unwrap_or_else(|| AppError::Rpc("all RPC endpoints failed".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn pool(n: usize) -> RpcEndpointPool {
        RpcEndpointPool::new(
            (0..n)
                .map(|i| format!("http://rpc-{}.example:8899", i))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_empty_pool_fails_fast_with_zero_attempts() {
        let pool = RpcEndpointPool::new(vec![]);
        let attempts = AtomicUsize::new(0);

        let result: Result<()> = pool
            .with_failover(|_client| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;

        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_op_is_attempted_once_per_endpoint() {
        for n in 1..=4 {
            let pool = pool(n);
            let attempts = AtomicUsize::new(0);

            let result: Result<()> = pool
                .with_failover(|_client| {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    async { Err(AppError::Rpc("connection refused".to_string())) }
                })
                .await;

            assert!(matches!(result, Err(AppError::Rpc(_))));
            assert_eq!(attempts.load(Ordering::SeqCst), n);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_rests_on_succeeding_endpoint() {
        let pool = pool(3);
        let attempts = AtomicUsize::new(0);

        // Fails on endpoints 0 and 1, succeeds on 2
        let result = pool
            .with_failover(|client| {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                let url = client.url();
                async move {
                    if n < 2 {
                        Err(AppError::Rpc(format!("unreachable: {}", url)))
                    } else {
                        Ok(url)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, "http://rpc-2.example:8899");
        assert_eq!(pool.cursor(), 2);
        assert_eq!(pool.current_endpoint().unwrap(), "http://rpc-2.example:8899");
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_cost_two_backoffs() {
        let pool = pool(3);
        let attempts = AtomicUsize::new(0);
        let started = tokio::time::Instant::now();

        let result = pool
            .with_failover(|_client| {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(AppError::Rpc("degraded".to_string()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_failure_surfaces_without_trailing_delay() {
        let pool = pool(2);
        let started = tokio::time::Instant::now();

        let result: Result<()> = pool
            .with_failover(|_client| async { Err(AppError::Rpc("down".to_string())) })
            .await;

        assert!(result.is_err());
        // One backoff between the two attempts, none after the last
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_each_attempt_targets_the_rotated_endpoint() {
        let pool = pool(3);
        let seen = Mutex::new(Vec::new());

        let _: Result<()> = pool
            .with_failover(|client| {
                seen.lock().unwrap().push(client.url());
                async { Err(AppError::Rpc("down".to_string())) }
            })
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "http://rpc-0.example:8899",
                "http://rpc-1.example:8899",
                "http://rpc-2.example:8899",
            ]
        );
    }

    #[tokio::test]
    async fn test_non_retryable_error_surfaces_immediately() {
        let pool = pool(3);
        let attempts = AtomicUsize::new(0);

        let result: Result<()> = pool
            .with_failover_when(
                |_client| {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    async { Err(AppError::InvalidInput("bad owner address".to_string())) }
                },
                AppError::is_transport,
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        // Cursor untouched: nothing was wrong with the endpoint
        assert_eq!(pool.cursor(), 0);
    }

    #[test]
    fn test_advance_wraps() {
        let pool = pool(2);
        assert_eq!(pool.advance().unwrap(), "http://rpc-1.example:8899");
        assert_eq!(pool.advance().unwrap(), "http://rpc-0.example:8899");
        assert_eq!(pool.current_endpoint().unwrap(), "http://rpc-0.example:8899");
    }
}
