//! Signed, stateless session tokens.

use crate::config::{SessionConfig, MIN_SECRET_LEN};
use crate::error::{AuthError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use linkboard_core::environment::Clock;
use linkboard_core::{Account, AccountId, Role};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// What a session token asserts about its bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Signed-in account.
    pub user_id: AccountId,
    /// Role at sign-in time.
    pub role: Role,
    /// Nickname at issue time.
    pub nickname: String,
    /// Avatar path at issue time.
    pub image_path: Option<String>,
    /// Issue time, Unix seconds.
    pub issued_at: i64,
    /// Expiry time, Unix seconds.
    pub expires_at: i64,
}

impl SessionClaims {
    /// `true` if the bearer is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail unless the bearer holds `role`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InsufficientRole`].
    pub fn require(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole { required: role })
        }
    }
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// Create a signer.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes or the lifetime is not positive.
    pub fn new(config: SessionConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        if config.secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Configuration(format!(
                "session secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if config.max_age_secs() <= 0 {
            return Err(AuthError::Configuration("session lifetime must be positive".to_string()));
        }
        Ok(Self { config, clock })
    }

    /// Session settings.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Claims for a fresh session of `account`.
    #[must_use]
    pub fn claims_for(&self, account: &Account) -> SessionClaims {
        let now = self.clock.now().timestamp();
        SessionClaims {
            user_id: account.id,
            role: account.role,
            nickname: account.nickname.clone(),
            image_path: account.image_path.clone(),
            issued_at: now,
            expires_at: now.saturating_add(self.config.max_age_secs()),
        }
    }

    /// Sign a fresh session for `account`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the claims cannot be serialized.
    pub fn issue(&self, account: &Account) -> Result<String> {
        self.sign(&self.claims_for(account))
    }

    /// Sign `claims` as they are.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the claims cannot be serialized.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String> {
        let json = serde_json::to_vec(claims).map_err(|e| AuthError::Encoding(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes())?);
        Ok(format!("{payload}.{signature}"))
    }

    /// Check signature and expiry of `token`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] if the token is malformed or the signature is wrong
    /// - [`AuthError::SessionExpired`] if the token has expired
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let expected = self.mac(payload.as_bytes())?;
        if !constant_time_eq::constant_time_eq(&expected, &signature) {
            tracing::debug!("session signature mismatch");
            return Err(AuthError::InvalidToken);
        }

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims: SessionClaims = serde_json::from_slice(&json).map_err(|_| AuthError::InvalidToken)?;

        if claims.expires_at <= self.clock.now().timestamp() {
            return Err(AuthError::SessionExpired);
        }
        Ok(claims)
    }

    fn mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.config.secret)
            .map_err(|e| AuthError::Configuration(e.to_string()))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use chrono::{Duration, Utc};
    use linkboard_testing::{test_clock, FixedClock};

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn account() -> Account {
        Account {
            id: AccountId(7),
            username: "root".to_string(),
            nickname: "Root".to_string(),
            role: Role::Admin,
            is_active: true,
            image_path: Some("avatars/7/profile.png".to_string()),
            created_at: Utc::now(),
        }
    }

    fn signer_at(clock: FixedClock) -> SessionSigner {
        SessionSigner::new(SessionConfig::new(SECRET.to_vec()), Arc::new(clock)).expect("signer")
    }

    #[test]
    fn test_issue_then_verify() {
        let signer = signer_at(test_clock());
        let token = signer.issue(&account()).expect("issue");
        let claims = signer.verify(&token).expect("verify");

        assert_eq!(claims.user_id, AccountId(7));
        assert!(claims.is_admin());
        assert_eq!(claims.expires_at - claims.issued_at, 604_800);
        assert_eq!(claims.image_path.as_deref(), Some("avatars/7/profile.png"));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let signer = signer_at(test_clock());
        let token = signer.issue(&account()).expect("issue");
        let (_, signature) = token.split_once('.').expect("two parts");

        let mut forged = signer.claims_for(&account());
        forged.user_id = AccountId(1);
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).expect("json"));

        assert_eq!(
            signer.verify(&format!("{forged_payload}.{signature}")),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(signer.verify("not-a-token"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = signer_at(test_clock()).issue(&account()).expect("issue");
        let other = SessionSigner::new(
            SessionConfig::new(b"ffffffffffffffffffffffffffffffff".to_vec()),
            Arc::new(test_clock()),
        )
        .expect("signer");
        assert_eq!(other.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_token() {
        let token = signer_at(test_clock()).issue(&account()).expect("issue");
        let later = FixedClock::new(test_clock().now() + Duration::days(8));
        assert_eq!(signer_at(later).verify(&token), Err(AuthError::SessionExpired));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = SessionSigner::new(SessionConfig::new(b"short".to_vec()), Arc::new(test_clock()));
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_member_lacks_admin_role() {
        let mut member = account();
        member.role = Role::Member;
        let claims = signer_at(test_clock()).claims_for(&member);
        assert_eq!(
            claims.require(Role::Admin),
            Err(AuthError::InsufficientRole { required: Role::Admin })
        );
    }
}
