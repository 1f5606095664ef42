//! Session security for Quill: signed session cookies, password digests and
//! the `session.*` configuration section.
//!
//! ```ignore
//! let codec = SessionCodec::new(config.section::<SessionConfig>()?);
//! let header = codec.set_cookie(&user.id, &user.passwd);
//!
//! // later, on a request carrying the cookie
//! let claim = codec.parse(cookie)?;
//! let user = users.find(claim.uid.as_str()).await?.ok_or(SessionError::UnknownUser(claim.uid.clone()))?;
//! codec.verify(&claim, &user.passwd)?;
//! ```

pub mod config;
pub mod cookie;
pub mod digest;
pub mod error;

pub use config::SessionConfig;
pub use cookie::{unix_now, SessionClaim, SessionCodec, DELETED};
pub use digest::{hash_password, md5_hex, sha1_hex};
pub use error::SessionError;

pub mod prelude {
    //! Re-exports of the most commonly used security types.
    pub use crate::{hash_password, SessionClaim, SessionCodec, SessionConfig, SessionError};
}
