//! Bounded retry of transient network failures

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::core::errors::Result;

/// Sleep function used between attempts
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Retries a call on transient errors, waiting `base_delay * attempt` in between
#[derive(Clone)]
pub struct Retrier {
    max_retries: u32,
    base_delay: Duration,
    sleeper: Sleeper,
}

impl fmt::Debug for Retrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .finish()
    }
}

impl Default for Retrier {
    fn default() -> Self {
        Self::new(4, Duration::from_secs(10))
    }
}

impl Retrier {
    /// Create a retrier that really sleeps
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self::with_sleeper(max_retries, base_delay, Arc::new(std::thread::sleep))
    }

    /// Create a retrier with a custom sleep function
    pub fn with_sleeper(max_retries: u32, base_delay: Duration, sleeper: Sleeper) -> Self {
        Self {
            max_retries,
            base_delay,
            sleeper,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or retries are exhausted
    pub fn run<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    if attempt > self.max_retries {
                        error!(
                            "Max attempts failed to reach the translation server: {}",
                            e
                        );
                        return Err(e);
                    }
                    let delay = self.base_delay * attempt;
                    warn!("Attempt {} failed: {}, retrying in {:?}", attempt, e, delay);
                    (self.sleeper)(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
