//! Poll a condition with a task-yielding sleep between attempts.

use embedded_hal::blocking::delay::DelayMs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval_ms: u32,
    /// `None` polls until the condition holds
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    pub const fn forever(interval_ms: u32) -> Self {
        PollPolicy {
            interval_ms,
            max_attempts: None,
        }
    }

    pub const fn bounded(interval_ms: u32, max_attempts: u32) -> Self {
        PollPolicy {
            interval_ms,
            max_attempts: Some(max_attempts),
        }
    }
}

/// The condition never held within a bounded policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimeout {
    pub attempts: u32,
}

/// Evaluates `ready` until it returns true, sleeping `interval_ms` after every
/// miss. Returns the number of evaluations, the successful one included.
pub fn poll_until<D, F>(delay: &mut D, policy: PollPolicy, mut ready: F) -> Result<u32, PollTimeout>
where
    D: DelayMs<u32>,
    F: FnMut() -> bool,
{
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        if ready() {
            return Ok(attempts);
        }
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(PollTimeout { attempts });
            }
        }
        delay.delay_ms(policy.interval_ms);
    }
}
