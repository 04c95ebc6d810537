use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bearer token returned by a credential source.
///
/// # Example
/// ```
/// use agent_desk::auth::AccessToken;
/// use chrono::{Duration, Utc};
///
/// let token = AccessToken::new("eyJ0eXAi...", Utc::now() + Duration::hours(1));
/// assert!(!token.is_expired_within(Duration::minutes(5)));
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// True when the token expires within `margin` from now.
    pub fn is_expired_within(&self, margin: Duration) -> bool {
        self.expires_on - margin <= Utc::now()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"..")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_inside_margin_counts_as_expired() {
        let token = AccessToken::new("t", Utc::now() + Duration::minutes(2));
        assert!(token.is_expired_within(Duration::minutes(5)));
        assert!(!token.is_expired_within(Duration::zero()));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let token = AccessToken::new("super-secret", Utc::now());
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
