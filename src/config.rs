//! Environment-driven configuration.

/// Every Nth allocation attempt fails under the test harness (0 disables).
pub const FAIL_EVERY_ENV: &str = "STRQUEUE_FAIL_EVERY";

pub fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
}

/// Settings for [`Harness`](crate::harness::Harness).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Fail every `fail_every`th allocation attempt. `0` never fails.
    pub fail_every: u32,
}

impl HarnessConfig {
    pub const fn never_fail() -> Self {
        Self { fail_every: 0 }
    }

    pub fn from_env() -> Self {
        Self {
            fail_every: env_u32(FAIL_EVERY_ENV).unwrap_or(0),
        }
    }
}
