//! Access token format and verification
//!
//! Token layout: `hud1-<payload>.<signature>`
//! - payload: base64url(JSON claims), no padding
//! - signature: base64url(HMAC-SHA256(app certificate, payload)), no padding
//!
//! Every claim (application, channel, subject, role, expiry) sits inside the
//! signed payload. Issue time is not a claim, so the same inputs always give
//! the same token.

use crate::auth::roles::Role;
use crate::channels::Channel;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Version prefix carried by every token
pub const TOKEN_PREFIX: &str = "hud1-";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format")]
    InvalidFormat,

    #[error("invalid token prefix: expected '{expected}', got '{got}'")]
    InvalidPrefix { expected: String, got: String },

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token decode error: {0}")]
    DecodeError(String),

    #[error("token was issued for app '{got}', expected '{expected}'")]
    AppMismatch { expected: String, got: String },

    #[error("token expired at {expired_at}")]
    Expired { expired_at: u64 },

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Signing secret shared with the real-time platform
#[derive(Clone)]
pub struct AppCertificate {
    secret: String,
}

impl AppCertificate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl fmt::Debug for AppCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AppCertificate([REDACTED])")
    }
}

/// Who a token is issued to
///
/// Serialized as a bare number (`12345`) or a bare string (`"alex"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    /// Numeric user id; 0 lets the platform assign one on join
    Uid(u32),
    /// String user account
    Account(String),
}

impl Subject {
    pub fn is_auto_assigned(&self) -> bool {
        matches!(self, Subject::Uid(0))
    }
}

impl Default for Subject {
    fn default() -> Self {
        Subject::Uid(0)
    }
}

impl From<u32> for Subject {
    fn from(uid: u32) -> Self {
        Subject::Uid(uid)
    }
}

impl FromStr for Subject {
    type Err = Infallible;

    /// Digits become a numeric uid, anything else an account name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u32>() {
            Ok(uid) => Subject::Uid(uid),
            Err(_) => Subject::Account(s.to_string()),
        })
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Uid(uid) => write!(f, "{}", uid),
            Subject::Account(account) => write!(f, "{}", account),
        }
    }
}

/// Claims bound into a token's signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub app_id: String,
    pub channel: Channel,
    pub subject: Subject,
    pub role: Role,
    /// Expiry, epoch seconds
    pub expires_at: u64,
}

/// A signed access token
#[derive(Debug, Clone)]
pub struct AccessToken {
    token: String,
    claims: TokenClaims,
}

impl AccessToken {
    /// Sign claims with the application certificate
    pub fn create(claims: TokenClaims, certificate: &AppCertificate) -> Result<Self, TokenError> {
        let payload_json =
            serde_json::to_vec(&claims).map_err(|e| TokenError::Signing(e.to_string()))?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload_json);

        let signature = sign(certificate, &payload_b64)?;
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

        let token = format!("{}{}.{}", TOKEN_PREFIX, payload_b64, signature_b64);

        Ok(Self { token, claims })
    }

    /// Parse a token and check its signature
    ///
    /// Does not look at the application id or expiry; see [`AccessToken::verify`].
    pub fn parse(token: &str, certificate: &AppCertificate) -> Result<Self, TokenError> {
        let content = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| TokenError::InvalidPrefix {
                expected: TOKEN_PREFIX.to_string(),
                got: token.chars().take(TOKEN_PREFIX.len()).collect(),
            })?;

        let (payload_b64, signature_b64) =
            content.split_once('.').ok_or(TokenError::InvalidFormat)?;

        if payload_b64.is_empty() || signature_b64.contains('.') {
            return Err(TokenError::InvalidFormat);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| TokenError::DecodeError(e.to_string()))?;

        let mut mac = HmacSha256::new_from_slice(certificate.as_bytes())
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| TokenError::DecodeError(e.to_string()))?;

        let claims: TokenClaims = serde_json::from_slice(&payload_json)
            .map_err(|e| TokenError::DecodeError(e.to_string()))?;

        Ok(Self {
            token: token.to_string(),
            claims,
        })
    }

    /// Parse a token and check signature, application and expiry
    pub fn verify(
        token: &str,
        app_id: &str,
        certificate: &AppCertificate,
        now: u64,
    ) -> Result<Self, TokenError> {
        let parsed = Self::parse(token, certificate)?;

        if parsed.claims.app_id != app_id {
            return Err(TokenError::AppMismatch {
                expected: app_id.to_string(),
                got: parsed.claims.app_id,
            });
        }

        if now >= parsed.claims.expires_at {
            return Err(TokenError::Expired {
                expired_at: parsed.claims.expires_at,
            });
        }

        Ok(parsed)
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    pub fn into_string(self) -> String {
        self.token
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

fn sign(certificate: &AppCertificate, payload_b64: &str) -> Result<Vec<u8>, TokenError> {
    let mut mac = HmacSha256::new_from_slice(certificate.as_bytes())
        .map_err(|e| TokenError::Signing(e.to_string()))?;
    mac.update(payload_b64.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_APP: &str = "app-0f3a";

    fn certificate() -> AppCertificate {
        AppCertificate::new("test-certificate-for-signing")
    }

    fn claims() -> TokenClaims {
        TokenClaims {
            app_id: TEST_APP.to_string(),
            channel: Channel::parse("10000").unwrap(),
            subject: Subject::Uid(12345),
            role: Role::Subscriber,
            expires_at: 1_700_003_600,
        }
    }

    /// Swap in a different payload, keeping the original signature
    fn swap_payload(token: &str, claims: &TokenClaims) -> String {
        let (_, signature) = token[TOKEN_PREFIX.len()..].split_once('.').unwrap();
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        format!("{}{}.{}", TOKEN_PREFIX, payload, signature)
    }

    #[test]
    fn test_token_create_parse() {
        let token = AccessToken::create(claims(), &certificate()).unwrap();
        assert!(token.as_str().starts_with(TOKEN_PREFIX));

        let parsed = AccessToken::parse(token.as_str(), &certificate()).unwrap();
        assert_eq!(parsed.claims(), &claims());
    }

    #[test]
    fn test_token_is_deterministic() {
        let a = AccessToken::create(claims(), &certificate()).unwrap();
        let b = AccessToken::create(claims(), &certificate()).unwrap();
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_token_wrong_certificate() {
        let token = AccessToken::create(claims(), &certificate()).unwrap();

        let result = AccessToken::parse(token.as_str(), &AppCertificate::new("wrong"));
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_token_tampered_fields_rejected() {
        let token = AccessToken::create(claims(), &certificate()).unwrap();

        let mut tampered = vec![];

        let mut c = claims();
        c.channel = Channel::parse("10001").unwrap();
        tampered.push(c);

        let mut c = claims();
        c.subject = Subject::Uid(1);
        tampered.push(c);

        let mut c = claims();
        c.role = Role::Publisher;
        tampered.push(c);

        let mut c = claims();
        c.expires_at += 86400;
        tampered.push(c);

        let mut c = claims();
        c.app_id = "other-app".to_string();
        tampered.push(c);

        for c in tampered {
            let forged = swap_payload(token.as_str(), &c);
            let result = AccessToken::parse(&forged, &certificate());
            assert!(
                matches!(result, Err(TokenError::InvalidSignature)),
                "forged claims accepted: {:?}",
                c
            );
        }
    }

    #[test]
    fn test_token_invalid_layout() {
        let cert = certificate();

        assert!(matches!(
            AccessToken::parse("sub-abc.def", &cert),
            Err(TokenError::InvalidPrefix { .. })
        ));
        assert!(matches!(
            AccessToken::parse("hud1-nodot", &cert),
            Err(TokenError::InvalidFormat)
        ));
        assert!(matches!(
            AccessToken::parse("hud1-a.b.c", &cert),
            Err(TokenError::InvalidFormat)
        ));
        assert!(matches!(
            AccessToken::parse("hud1-abc.!!!", &cert),
            Err(TokenError::DecodeError(_))
        ));
    }

    #[test]
    fn test_token_verify() {
        let token = AccessToken::create(claims(), &certificate()).unwrap();

        let ok = AccessToken::verify(token.as_str(), TEST_APP, &certificate(), 1_700_000_000);
        assert!(ok.is_ok());

        let expired =
            AccessToken::verify(token.as_str(), TEST_APP, &certificate(), 1_700_003_600);
        assert!(matches!(
            expired,
            Err(TokenError::Expired {
                expired_at: 1_700_003_600
            })
        ));

        let other_app =
            AccessToken::verify(token.as_str(), "another", &certificate(), 1_700_000_000);
        assert!(matches!(other_app, Err(TokenError::AppMismatch { .. })));
    }

    #[test]
    fn test_subject_parse_and_serde() {
        assert_eq!("42".parse::<Subject>().unwrap(), Subject::Uid(42));
        assert_eq!(
            "alex".parse::<Subject>().unwrap(),
            Subject::Account("alex".to_string())
        );
        assert!(Subject::default().is_auto_assigned());

        assert_eq!(serde_json::to_string(&Subject::Uid(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&Subject::Account("sam".into())).unwrap(),
            "\"sam\""
        );
        let s: Subject = serde_json::from_str("12345").unwrap();
        assert_eq!(s, Subject::Uid(12345));
    }

    #[test]
    fn test_certificate_debug_redacted() {
        let debug = format!("{:?}", certificate());
        assert!(!debug.contains("test-certificate"));
        assert!(debug.contains("REDACTED"));
    }
}
