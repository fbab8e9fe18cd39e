//! Bounded retry with a pluggable backoff strategy.
//!
//! A [`RetryPolicy`] makes at most `max_retries + 1` attempts. It waits between
//! attempts, never before the first. The default [`Backoff::Fixed`] strategy
//! gives every retry the same delay; exponential and jittered strategies are
//! available for links where synchronized retries are a problem.
//!
//! Waiting goes through a [`Sleeper`] so the suspension point is explicit and
//! tests can observe delays without sleeping.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::duration_ms;

/// How the delay grows between retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Backoff {
    /// Every retry waits the base delay.
    #[default]
    Fixed,
    /// Retry `n` waits `base * factor^(n-1)`, capped at `max`.
    Exponential {
        /// Growth factor per retry. Must be at least 1.
        factor: u32,
        /// Upper bound on any single delay.
        #[serde(with = "duration_ms")]
        max: Duration,
    },
    /// Every retry waits the base delay plus or minus a random offset.
    Jittered {
        /// Largest offset in either direction. Must not exceed the base delay.
        #[serde(with = "duration_ms")]
        spread: Duration,
    },
}

impl Backoff {
    /// Delay before retry number `retry` (1-based) given the base delay.
    pub fn delay(&self, base: Duration, retry: u32) -> Duration {
        match *self {
            Self::Fixed => base,
            Self::Exponential { factor, max } => {
                let multiplier = factor.saturating_pow(retry.saturating_sub(1));
                base.saturating_mul(multiplier).min(max)
            }
            Self::Jittered { spread } => {
                let spread_ms = u64::try_from(spread.as_millis()).unwrap_or(u64::MAX);
                if spread_ms == 0 {
                    return base;
                }
                let offset = fastrand::u64(0..=spread_ms.saturating_mul(2));
                base.saturating_sub(spread)
                    .saturating_add(Duration::from_millis(offset))
            }
        }
    }
}

/// Outcome of a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<E> {
    /// Another attempt may succeed.
    Retryable(E),
    /// Stop immediately.
    Fatal(E),
}

impl<E> Attempt<E> {
    /// Returns the wrapped error.
    pub fn into_inner(self) -> E {
        match self {
            Self::Retryable(e) | Self::Fatal(e) => e,
        }
    }
}

/// Blocking suspension point between attempts.
pub trait Sleeper {
    /// Blocks the calling thread for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Bounded retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
    backoff: Backoff,
}

impl RetryPolicy {
    /// Creates a fixed-delay policy.
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    /// Sets the backoff strategy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Retries after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Base delay between attempts.
    pub fn base_delay(&self) -> Duration {
        self.delay
    }

    /// The backoff strategy.
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.delay(self.delay, retry)
    }

    /// Runs `op` until it succeeds, fails fatally, or attempts run out.
    ///
    /// `op` receives the zero-based attempt number. On exhaustion the error
    /// from the last attempt is returned.
    ///
    /// # Errors
    ///
    /// Returns the error of a [`Attempt::Fatal`] outcome, or of the final
    /// [`Attempt::Retryable`] outcome when no retries remain.
    pub fn run<T, E, F>(&self, sleeper: &mut dyn Sleeper, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, Attempt<E>>,
    {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.delay_for(attempt);
                tracing::debug!(
                    attempt,
                    max_retries = self.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "retrying"
                );
                sleeper.sleep(delay);
            }

            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retryable(e)) if attempt >= self.max_retries => return Err(e),
                Err(Attempt::Retryable(_)) => {}
            }
            attempt += 1;
        }
    }

    /// Runs a boolean operation, treating every `false` as retryable.
    pub fn run_bool<F>(&self, sleeper: &mut dyn Sleeper, mut op: F) -> bool
    where
        F: FnMut() -> bool,
    {
        self.run(sleeper, |_| if op() { Ok(()) } else { Err(Attempt::Retryable(())) })
            .is_ok()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}
