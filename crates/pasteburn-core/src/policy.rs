//! Expiry, burn and verification-hold decisions.
//!
//! The policy is pure: the current time is an input, so identical inputs
//! always produce identical decisions.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PasteError, Result};

/// Upper bound accepted for any configured horizon (100 years).
const MAX_HORIZON_HOURS: i64 = 24 * 365 * 100;

/// Lifecycle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Lifetime used when the submitter names none, and after verification
    pub default_expire_hours: i64,

    /// Largest lifetime a submitter may request
    pub max_expire_hours: i64,

    /// How long an unverified paste waits for its CAPTCHA
    pub verify_window_secs: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_expire_hours: 24,
            max_expire_hours: 24,
            verify_window_secs: 5 * 60,
        }
    }
}

impl PolicyConfig {
    /// Reject settings that would produce past or unbounded expiries.
    pub fn validate(&self) -> Result<()> {
        if self.max_expire_hours <= 0 || self.max_expire_hours > MAX_HORIZON_HOURS {
            return Err(PasteError::Config(format!(
                "max_expire_hours must be between 1 and {}",
                MAX_HORIZON_HOURS
            )));
        }
        if self.default_expire_hours <= 0 || self.default_expire_hours > self.max_expire_hours {
            return Err(PasteError::Config(
                "default_expire_hours must be between 1 and max_expire_hours".to_string(),
            ));
        }
        if self.verify_window_secs <= 0 || self.verify_window_secs > MAX_HORIZON_HOURS * 3600 {
            return Err(PasteError::Config(
                "verify_window_secs must be positive and within the horizon".to_string(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle fields for a new paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub expire_at: DateTime<Utc>,
    pub wait_verify: bool,
    pub read_then_burn: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct LifecyclePolicy {
    config: PolicyConfig,
}

impl LifecyclePolicy {
    pub fn new(config: PolicyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decide expiry and gating for a submission.
    ///
    /// # Arguments
    ///
    /// * `requested_expire_hours` - `None` when the submitter omitted it;
    ///   `Some(0)` requests burn-after-read
    /// * `_passphrase_present` - passphrase protection does not change expiry
    /// * `captcha_required` - hold the paste until verified
    /// * `now` - decision instant
    ///
    /// # Errors
    ///
    /// Returns `PasteError::Validation` if the requested hours are negative
    /// or exceed `max_expire_hours`.
    pub fn decide(
        &self,
        requested_expire_hours: Option<i64>,
        _passphrase_present: bool,
        captcha_required: bool,
        now: DateTime<Utc>,
    ) -> Result<Decision> {
        if let Some(hours) = requested_expire_hours {
            if hours < 0 {
                return Err(PasteError::Validation(
                    "Expiry hours cannot be negative".to_string(),
                ));
            }
            if hours > self.config.max_expire_hours {
                return Err(PasteError::Validation(format!(
                    "Expiry hours exceed maximum ({})",
                    self.config.max_expire_hours
                )));
            }
        }

        let now = now.trunc_subsecs(3);

        if captcha_required {
            return Ok(Decision {
                expire_at: now + Duration::seconds(self.config.verify_window_secs),
                wait_verify: true,
                read_then_burn: false,
            });
        }

        let (lifetime, read_then_burn) = match requested_expire_hours {
            Some(0) => (self.config.default_expire_hours, true),
            Some(hours) => (hours, false),
            None => (self.config.default_expire_hours, false),
        };

        Ok(Decision {
            expire_at: now + Duration::hours(lifetime),
            wait_verify: false,
            read_then_burn,
        })
    }

    /// Expiry applied when a held paste passes verification.
    pub fn confirmed_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.trunc_subsecs(3) + Duration::hours(self.config.default_expire_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn policy() -> LifecyclePolicy {
        LifecyclePolicy::new(PolicyConfig {
            default_expire_hours: 24,
            max_expire_hours: 72,
            verify_window_secs: 300,
        })
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_decide_is_pure() {
        let policy = policy();
        for input in [None, Some(0), Some(5), Some(72)] {
            for captcha in [false, true] {
                let first = policy.decide(input, true, captcha, now()).unwrap();
                let second = policy.decide(input, true, captcha, now()).unwrap();
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_out_of_range_hours_rejected() {
        let policy = policy();
        for hours in [-1, -100, 73, i64::MAX] {
            for captcha in [false, true] {
                let result = policy.decide(Some(hours), false, captcha, now());
                assert!(
                    matches!(result, Err(PasteError::Validation(_))),
                    "{} hours",
                    hours
                );
            }
        }
    }

    #[test]
    fn test_zero_hours_burns_with_default_lifetime() {
        let decision = policy().decide(Some(0), true, false, now()).unwrap();
        assert!(decision.read_then_burn);
        assert!(!decision.wait_verify);
        assert_eq!(decision.expire_at, now() + Duration::hours(24));
    }

    #[test]
    fn test_requested_hours_honored() {
        let decision = policy().decide(Some(72), false, false, now()).unwrap();
        assert!(!decision.read_then_burn);
        assert_eq!(decision.expire_at, now() + Duration::hours(72));
    }

    #[test]
    fn test_omitted_hours_use_default() {
        let decision = policy().decide(None, false, false, now()).unwrap();
        assert!(!decision.read_then_burn);
        assert_eq!(decision.expire_at, now() + Duration::hours(24));
    }

    #[test]
    fn test_captcha_defers_requested_expiry() {
        let decision = policy().decide(Some(48), false, true, now()).unwrap();
        assert!(decision.wait_verify);
        assert!(!decision.read_then_burn);
        assert_eq!(decision.expire_at, now() + Duration::seconds(300));
    }

    #[test]
    fn test_expiry_truncated_to_millis() {
        let precise = now() + Duration::nanoseconds(1_234_567);
        let decision = policy().decide(None, false, false, precise).unwrap();
        assert_eq!(decision.expire_at.timestamp_subsec_nanos(), 1_000_000);
    }

    #[test]
    fn test_confirmed_expiry_uses_default() {
        assert_eq!(policy().confirmed_expiry(now()), now() + Duration::hours(24));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = [
            PolicyConfig {
                default_expire_hours: 48,
                max_expire_hours: 24,
                verify_window_secs: 300,
            },
            PolicyConfig {
                default_expire_hours: 1,
                max_expire_hours: 0,
                verify_window_secs: 300,
            },
            PolicyConfig {
                default_expire_hours: 1,
                max_expire_hours: 1,
                verify_window_secs: 0,
            },
        ];
        for config in bad {
            assert!(matches!(
                LifecyclePolicy::new(config),
                Err(PasteError::Config(_))
            ));
        }
    }
}
