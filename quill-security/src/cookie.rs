//! Signed session cookies.
//!
//! A cookie reads `<uid>-<expires>-<sha1hex("<uid>-<passwd>-<expires>-<secret>")>`,
//! where `passwd` is the user's stored password digest. Changing the password
//! invalidates every cookie issued before.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::config::SessionConfig;
use crate::digest::{digest_eq, sha1_hex};
use crate::error::SessionError;

/// Value written over the session cookie on sign-out.
pub const DELETED: &str = "-deleted-";

/// The unverified parts of a well-formed, unexpired cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaim {
    pub uid: String,
    pub expires: u64,
    digest: String,
}

#[derive(Debug, Clone)]
pub struct SessionCodec {
    config: SessionConfig,
}

impl SessionCodec {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    pub fn max_age(&self) -> u64 {
        self.config.max_age
    }

    fn sign(&self, uid: &str, passwd: &str, expires: u64) -> String {
        sha1_hex(&format!("{uid}-{passwd}-{expires}-{}", self.config.secret))
    }

    /// Cookie value for `uid` valid for `max_age` seconds from `now`.
    pub fn encode_at(&self, uid: &str, passwd: &str, now: u64) -> String {
        let expires = now + self.config.max_age;
        format!("{uid}-{expires}-{}", self.sign(uid, passwd, expires))
    }

    pub fn encode(&self, uid: &str, passwd: &str) -> String {
        self.encode_at(uid, passwd, unix_now())
    }

    /// Split a cookie and check its shape and expiry. The signature is only
    /// checked by [`SessionCodec::verify`], once the user's password is known.
    pub fn parse_at(&self, cookie: &str, now: u64) -> Result<SessionClaim, SessionError> {
        let parts: Vec<&str> = cookie.split('-').collect();
        let [uid, expires, digest] = parts.as_slice() else {
            return Err(SessionError::Malformed);
        };
        let expires: u64 = expires
            .parse()
            .map_err(|_| SessionError::InvalidExpiry(expires.to_string()))?;
        if expires < now {
            return Err(SessionError::Expired);
        }
        Ok(SessionClaim {
            uid: uid.to_string(),
            expires,
            digest: digest.to_string(),
        })
    }

    pub fn parse(&self, cookie: &str) -> Result<SessionClaim, SessionError> {
        self.parse_at(cookie, unix_now())
    }

    /// Check the claim's signature against the stored password digest.
    pub fn verify(&self, claim: &SessionClaim, passwd: &str) -> Result<(), SessionError> {
        let expected = self.sign(&claim.uid, passwd, claim.expires);
        if digest_eq(&expected, &claim.digest) {
            Ok(())
        } else {
            debug!(uid = %claim.uid, "session digest mismatch");
            Err(SessionError::DigestMismatch)
        }
    }

    /// `Set-Cookie` value carrying a fresh session.
    pub fn set_cookie(&self, uid: &str, passwd: &str) -> String {
        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly",
            self.config.cookie_name,
            self.encode(uid, passwd),
            self.config.max_age
        )
    }

    /// `Set-Cookie` value that clears the session.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}={DELETED}; Max-Age=0; Path=/; HttpOnly",
            self.config.cookie_name
        )
    }
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
