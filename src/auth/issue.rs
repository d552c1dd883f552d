//! Token issuance: request validation and credential minting

use crate::auth::roles::{InvalidRole, Role};
use crate::auth::tokens::{AccessToken, Subject, TokenClaims, TokenError};
use crate::channels::{Channel, ChannelError};
use crate::config::AppCredentials;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Token lifetime when the request does not name one (24 hours)
pub const DEFAULT_LIFETIME_SECS: u32 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Channel name is required. Use ?channel=YOUR_CHANNEL_NAME")]
    MissingChannel,

    #[error("Invalid channel name: {0}")]
    InvalidChannel(#[from] ChannelError),

    #[error("Invalid UID '{0}'. Must be a number or \"0\" for auto-generation.")]
    InvalidUid(String),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] InvalidRole),

    #[error("Invalid expiration time '{0}'. Must be a positive number of seconds.")]
    InvalidExpiration(String),
}

/// Raw query parameters of the token endpoint
///
/// Every field is kept as text so that bad values surface as
/// [`RequestError`]s instead of extractor rejections. Empty values count as
/// absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenQuery {
    pub channel: Option<String>,
    pub uid: Option<String>,
    pub role: Option<String>,
    pub expiration: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// A validated token request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub channel: Channel,
    pub subject: Subject,
    pub role: Role,
    pub lifetime_secs: u32,
}

impl TokenRequest {
    /// Request for `channel` with default subject, role and lifetime
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            subject: Subject::default(),
            role: Role::default(),
            lifetime_secs: DEFAULT_LIFETIME_SECS,
        }
    }

    pub fn subject(mut self, subject: impl Into<Subject>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn lifetime_secs(mut self, secs: u32) -> Self {
        self.lifetime_secs = secs;
        self
    }

    /// Validate the endpoint's query parameters
    pub fn from_query(query: &TokenQuery) -> Result<Self, RequestError> {
        let channel = non_empty(&query.channel).ok_or(RequestError::MissingChannel)?;
        let channel = Channel::parse(channel)?;

        let subject = match non_empty(&query.uid) {
            Some(raw) => raw
                .parse::<u32>()
                .map(Subject::Uid)
                .map_err(|_| RequestError::InvalidUid(raw.to_string()))?,
            None => Subject::default(),
        };

        let role = match non_empty(&query.role) {
            Some(raw) => raw.parse::<Role>()?,
            None => Role::default(),
        };

        let lifetime_secs = match non_empty(&query.expiration) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(RequestError::InvalidExpiration(raw.to_string())),
            },
            None => DEFAULT_LIFETIME_SECS,
        };

        Ok(Self {
            channel,
            subject,
            role,
            lifetime_secs,
        })
    }
}

/// A minted credential plus the metadata reported alongside it
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: AccessToken,
    /// Issue time, epoch seconds
    pub issued_at: u64,
    pub lifetime_secs: u32,
}

impl Credential {
    pub fn claims(&self) -> &TokenClaims {
        self.token.claims()
    }

    /// Expiry, epoch seconds
    pub fn expires_at(&self) -> u64 {
        self.token.claims().expires_at
    }

    /// Expiry as RFC 3339 UTC with millisecond precision
    pub fn expires_at_rfc3339(&self) -> String {
        let secs = i64::try_from(self.expires_at()).unwrap_or(i64::MAX);
        DateTime::<Utc>::from_timestamp(secs, 0)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Sign a token for `request`, valid from `now` for the requested lifetime
pub fn issue(
    app: &AppCredentials,
    request: &TokenRequest,
    now: u64,
) -> Result<Credential, TokenError> {
    let claims = TokenClaims {
        app_id: app.app_id.clone(),
        channel: request.channel.clone(),
        subject: request.subject.clone(),
        role: request.role,
        expires_at: now + u64::from(request.lifetime_secs),
    };

    let token = AccessToken::create(claims, &app.certificate)?;

    Ok(Credential {
        token,
        issued_at: now,
        lifetime_secs: request.lifetime_secs,
    })
}

/// Current time, epoch seconds
pub fn now_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> TokenQuery {
        let mut q = TokenQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "channel" => q.channel = v,
                "uid" => q.uid = v,
                "role" => q.role = v,
                "expiration" => q.expiration = v,
                _ => panic!("unknown key {}", k),
            }
        }
        q
    }

    fn app() -> AppCredentials {
        AppCredentials::new("app-1", "cert-1")
    }

    #[test]
    fn test_from_query_defaults() {
        let req = TokenRequest::from_query(&query(&[("channel", "10000")])).unwrap();
        assert_eq!(req.channel.as_str(), "10000");
        assert_eq!(req.subject, Subject::Uid(0));
        assert_eq!(req.role, Role::Publisher);
        assert_eq!(req.lifetime_secs, DEFAULT_LIFETIME_SECS);
    }

    #[test]
    fn test_from_query_all_fields() {
        let req = TokenRequest::from_query(&query(&[
            ("channel", "10000"),
            ("uid", "12345"),
            ("role", "subscriber"),
            ("expiration", "3600"),
        ]))
        .unwrap();

        assert_eq!(req.subject, Subject::Uid(12345));
        assert_eq!(req.role, Role::Subscriber);
        assert_eq!(req.lifetime_secs, 3600);
    }

    #[test]
    fn test_from_query_empty_values_are_defaults() {
        let req = TokenRequest::from_query(&query(&[
            ("channel", "room"),
            ("uid", ""),
            ("role", ""),
            ("expiration", ""),
        ]))
        .unwrap();
        assert_eq!(req, TokenRequest::new(Channel::parse("room").unwrap()));
    }

    #[test]
    fn test_from_query_rejects_bad_input() {
        assert_eq!(
            TokenRequest::from_query(&TokenQuery::default()),
            Err(RequestError::MissingChannel)
        );
        assert_eq!(
            TokenRequest::from_query(&query(&[("channel", "")])),
            Err(RequestError::MissingChannel)
        );
        assert!(matches!(
            TokenRequest::from_query(&query(&[("channel", "a/b")])),
            Err(RequestError::InvalidChannel(_))
        ));
        assert_eq!(
            TokenRequest::from_query(&query(&[("channel", "c"), ("uid", "abc")])),
            Err(RequestError::InvalidUid("abc".into()))
        );
        assert!(matches!(
            TokenRequest::from_query(&query(&[("channel", "c"), ("role", "host")])),
            Err(RequestError::InvalidRole(_))
        ));
        for bad in ["0", "-60", "soon", "1.5"] {
            assert_eq!(
                TokenRequest::from_query(&query(&[("channel", "c"), ("expiration", bad)])),
                Err(RequestError::InvalidExpiration(bad.into())),
                "expiration {} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_issue_expiry_is_now_plus_lifetime() {
        let now = 1_764_000_000;
        let req = TokenRequest::new(Channel::parse("10000").unwrap())
            .subject(12345)
            .role(Role::Subscriber)
            .lifetime_secs(3600);

        let credential = issue(&app(), &req, now).unwrap();
        assert_eq!(credential.issued_at, now);
        assert_eq!(credential.expires_at(), now + 3600);
        assert_eq!(credential.lifetime_secs, 3600);
        assert_eq!(credential.claims().app_id, "app-1");
        assert_eq!(credential.claims().role, Role::Subscriber);
    }

    #[test]
    fn test_issue_default_lifetime() {
        let req = TokenRequest::new(Channel::parse("10000").unwrap());
        let credential = issue(&app(), &req, 1000).unwrap();
        assert_eq!(credential.expires_at(), 1000 + 86_400);
    }

    #[test]
    fn test_issued_token_verifies() {
        let now = 1_764_000_000;
        let req = TokenRequest::new(Channel::parse("standup").unwrap()).subject(7);
        let credential = issue(&app(), &req, now).unwrap();

        let verified = AccessToken::verify(
            credential.token.as_str(),
            "app-1",
            &app().certificate,
            now + 10,
        )
        .unwrap();
        assert_eq!(verified.claims().subject, Subject::Uid(7));
    }

    #[test]
    fn test_expires_at_rfc3339() {
        let req = TokenRequest::new(Channel::parse("10000").unwrap()).lifetime_secs(86_400);
        let credential = issue(&app(), &req, 1_704_110_400).unwrap();
        assert_eq!(credential.expires_at_rfc3339(), "2024-01-02T12:00:00.000Z");
    }
}
