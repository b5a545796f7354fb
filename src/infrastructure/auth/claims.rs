//! Token claims handed to this crate by the gateway after JWKS/symmetric-key
//! verification. Field set matches spec.md section 6's required claims:
//! `{sub, tenant_id, role, exp, aud}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::tenant::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// External subject identifier from the identity provider.
    pub sub: String,
    pub tenant_id: Uuid,
    pub role: Role,
    pub exp: DateTime<Utc>,
    pub aud: String,
}

impl Claims {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_expiring_at(exp: DateTime<Utc>) -> Claims {
        Claims {
            sub: "user-123".to_string(),
            tenant_id: Uuid::new_v4(),
            role: Role::Viewer,
            exp,
            aud: "eap".to_string(),
        }
    }

    #[test]
    fn a_claim_with_a_future_expiry_is_not_expired() {
        let claims = claims_expiring_at(Utc::now() + Duration::minutes(5));
        assert!(!claims.is_expired(Utc::now()));
    }

    #[test]
    fn a_claim_with_a_past_expiry_is_expired() {
        let claims = claims_expiring_at(Utc::now() - Duration::minutes(5));
        assert!(claims.is_expired(Utc::now()));
    }
}
