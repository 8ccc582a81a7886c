use crate::error::InvalidExpiry;
use jiff::{SignedDuration, Timestamp};

/// How long a resource lives when the caller does not say.
///
/// Short URLs use [`ExpirationPolicy::never`]; pastes use a 24 hour default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    default_ttl: Option<SignedDuration>,
}

impl ExpirationPolicy {
    /// Resources without an explicit lifetime never expire.
    pub const fn never() -> Self {
        Self { default_ttl: None }
    }

    /// Resources without an explicit lifetime expire after `hours`.
    pub fn default_hours(hours: u32) -> Self {
        Self {
            default_ttl: Some(SignedDuration::from_hours(i64::from(hours))),
        }
    }

    /// Computes the expiry timestamp for a resource created at `now`.
    ///
    /// An explicit `hours` wins over the policy default. `Ok(None)` means the
    /// resource never expires.
    pub fn compute_expiry(
        &self,
        now: Timestamp,
        hours: Option<u32>,
    ) -> Result<Option<Timestamp>, InvalidExpiry> {
        let ttl = match hours {
            Some(hours) => SignedDuration::from_hours(i64::from(hours)),
            None => match self.default_ttl {
                Some(ttl) => ttl,
                None => return Ok(None),
            },
        };

        now.checked_add(ttl)
            .map(Some)
            .map_err(|e| InvalidExpiry(format!("{ttl:?} after {now} overflows: {e}")))
    }
}

/// A resource is expired once its expiry is strictly before `now`.
pub fn is_expired(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    expires_at.is_some_and(|expires_at| expires_at < now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(second: i64) -> Timestamp {
        Timestamp::from_second(second).unwrap()
    }

    #[test]
    fn explicit_hours_win_over_default() {
        let policy = ExpirationPolicy::default_hours(24);
        let expiry = policy.compute_expiry(ts(0), Some(2)).unwrap();
        assert_eq!(expiry, Some(ts(7_200)));
    }

    #[test]
    fn default_applies_when_hours_absent() {
        let policy = ExpirationPolicy::default_hours(24);
        let expiry = policy.compute_expiry(ts(100), None).unwrap();
        assert_eq!(expiry, Some(ts(100 + 86_400)));
    }

    #[test]
    fn never_policy_without_hours_never_expires() {
        let policy = ExpirationPolicy::never();
        assert_eq!(policy.compute_expiry(ts(0), None).unwrap(), None);
        assert_eq!(policy.compute_expiry(ts(0), Some(1)).unwrap(), Some(ts(3_600)));
    }

    #[test]
    fn overflowing_expiry_is_rejected() {
        let err = ExpirationPolicy::never()
            .compute_expiry(Timestamp::MAX, Some(1))
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid expiry: "));
    }

    #[test]
    fn expiry_is_strictly_before_now() {
        let now = ts(1_000);
        assert!(!is_expired(None, now));
        assert!(!is_expired(Some(now), now));
        assert!(!is_expired(Some(ts(1_001)), now));
        assert!(is_expired(Some(ts(999)), now));
    }
}
