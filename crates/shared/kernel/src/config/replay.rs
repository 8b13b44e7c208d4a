use super::error::ConfigError;
use sfetch_domain::ReplaySettings;
use sfetch_domain::constants::{MAX_CLOCK_SKEW_SECS, MAX_REPLAY_WINDOW_SECS};
use std::time::Duration;

/// Validated replay window.
///
/// An envelope is fresh while its `issued_at` is at most `window + clock_skew` old
/// and at most `clock_skew` ahead. Nonces are remembered for `window + 2 * clock_skew`,
/// so a fresh envelope is never accepted twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayPolicy {
    pub window: Duration,
    pub capacity: u64,
    pub clock_skew: Duration,
}

impl Default for ReplayPolicy {
    fn default() -> Self {
        let settings = ReplaySettings::default();
        Self {
            window: Duration::from_secs(settings.window_secs),
            capacity: settings.capacity,
            clock_skew: Duration::from_secs(settings.clock_skew_secs),
        }
    }
}

impl TryFrom<ReplaySettings> for ReplayPolicy {
    type Error = ConfigError;

    fn try_from(settings: ReplaySettings) -> Result<Self, Self::Error> {
        let policy = Self {
            window: Duration::from_secs(settings.window_secs),
            capacity: settings.capacity,
            clock_skew: Duration::from_secs(settings.clock_skew_secs),
        };
        policy.validate()?;
        Ok(policy)
    }
}

impl ReplayPolicy {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.window.is_zero() {
            return Err(ConfigError::Invalid {
                message: "replay window must be greater than zero".into(),
                context: None,
            });
        }
        if self.window > Duration::from_secs(MAX_REPLAY_WINDOW_SECS) {
            return Err(ConfigError::Invalid {
                message: format!("replay window must not exceed {MAX_REPLAY_WINDOW_SECS}s").into(),
                context: None,
            });
        }
        if self.clock_skew > Duration::from_secs(MAX_CLOCK_SKEW_SECS) {
            return Err(ConfigError::Invalid {
                message: format!("clock skew must not exceed {MAX_CLOCK_SKEW_SECS}s").into(),
                context: None,
            });
        }
        if self.capacity == 0 {
            return Err(ConfigError::Invalid {
                message: "replay capacity must be greater than zero".into(),
                context: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let policy = ReplayPolicy::try_from(ReplaySettings::default()).expect("valid");
        assert_eq!(policy, ReplayPolicy::default());
    }

    #[test]
    fn huge_window_is_rejected() {
        let settings = ReplaySettings { window_secs: u64::MAX, ..ReplaySettings::default() };
        let err = ReplayPolicy::try_from(settings).expect_err("window too large");
        assert_eq!(err.kind(), "Invalid");
    }

    #[test]
    fn huge_clock_skew_is_rejected() {
        let settings =
            ReplaySettings { clock_skew_secs: MAX_CLOCK_SKEW_SECS + 1, ..ReplaySettings::default() };
        let err = ReplayPolicy::try_from(settings).expect_err("skew too large");
        assert_eq!(err.kind(), "Invalid");
    }

    #[test]
    fn largest_accepted_values_build_an_engine_window() {
        let settings = ReplaySettings {
            window_secs: MAX_REPLAY_WINDOW_SECS,
            clock_skew_secs: MAX_CLOCK_SKEW_SECS,
            ..ReplaySettings::default()
        };
        let policy = ReplayPolicy::try_from(settings).expect("bounds are inclusive");
        assert_eq!(policy.window, Duration::from_secs(MAX_REPLAY_WINDOW_SECS));
    }
}
