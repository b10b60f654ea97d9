/*
[INPUT]:  Failure notifications from a feed strategy
[OUTPUT]: Retry-or-give-up decisions with the delay to wait
[POS]:    Feed layer - bounded retry budget shared by polling and push feeds
[UPDATE]: When changing backoff shape or retry accounting
*/

use std::time::Duration;

/// Delay growth between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay for every attempt
    Fixed(Duration),
    /// Attempt `n` waits `n * base`
    Linear(Duration),
}

impl Backoff {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Linear(base) => base.saturating_mul(attempt.max(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { attempt: u32, delay: Duration },
    Exhausted { attempts: u32 },
}

/// Counts consecutive failures against a maximum.
///
/// `attempts` never exceeds `max_attempts + 1`; once exhausted the budget stays
/// exhausted until `reset`.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    attempts: u32,
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryBudget {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            backoff,
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts > self.max_attempts
    }

    /// Spend the whole budget at once, for failures no retry can fix
    pub fn exhaust(&mut self) -> RetryDecision {
        self.attempts = self.max_attempts.saturating_add(1);
        RetryDecision::Exhausted {
            attempts: self.attempts,
        }
    }

    pub fn record_failure(&mut self) -> RetryDecision {
        if !self.is_exhausted() {
            self.attempts += 1;
        }
        if self.is_exhausted() {
            return RetryDecision::Exhausted {
                attempts: self.attempts,
            };
        }
        RetryDecision::Retry {
            attempt: self.attempts,
            delay: self.backoff.delay_for(self.attempts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_budget_allows_max_retries() {
        let mut budget = RetryBudget::new(3, Backoff::Fixed(Duration::from_secs(3)));
        for expected in 1..=3 {
            assert_eq!(
                budget.record_failure(),
                RetryDecision::Retry {
                    attempt: expected,
                    delay: Duration::from_secs(3)
                }
            );
        }
        assert_eq!(
            budget.record_failure(),
            RetryDecision::Exhausted { attempts: 4 }
        );
        assert!(budget.is_exhausted());
        // stays exhausted without counting further
        assert_eq!(
            budget.record_failure(),
            RetryDecision::Exhausted { attempts: 4 }
        );

        budget.reset();
        assert_eq!(budget.attempts(), 0);
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_linear_backoff_grows_with_attempt() {
        let backoff = Backoff::Linear(Duration::from_secs(3));
        assert_eq!(backoff.delay_for(1), Duration::from_secs(3));
        assert_eq!(backoff.delay_for(2), Duration::from_secs(6));
        assert_eq!(backoff.delay_for(5), Duration::from_secs(15));
    }

    #[test]
    fn test_exhaust_spends_remaining_budget() {
        let mut budget = RetryBudget::new(3, Backoff::Fixed(Duration::from_secs(3)));
        budget.record_failure();
        assert_eq!(budget.exhaust(), RetryDecision::Exhausted { attempts: 4 });
        assert!(budget.is_exhausted());

        budget.reset();
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_zero_budget_exhausts_immediately() {
        let mut budget = RetryBudget::new(0, Backoff::Fixed(Duration::from_secs(1)));
        assert_eq!(
            budget.record_failure(),
            RetryDecision::Exhausted { attempts: 1 }
        );
    }
}
