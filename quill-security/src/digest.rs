//! Hex digests used for password storage, cookie signatures and avatars.

use md5::Md5;
use sha1::{Digest, Sha1};

pub fn sha1_hex(input: &str) -> String {
    hex::encode(Sha1::digest(input.as_bytes()))
}

pub fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

/// Stored form of a password: `sha1("<uid>:<client digest>")`.
///
/// Clients never send the plain password, only its SHA-1 hex digest.
pub fn hash_password(uid: &str, client_digest: &str) -> String {
    sha1_hex(&format!("{uid}:{client_digest}"))
}

/// Compare two ASCII digests without short-circuiting on the first mismatch.
pub fn digest_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(sha1_hex("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn password_is_salted_by_uid() {
        let client = sha1_hex("a@b.com:secret");
        assert_ne!(hash_password("u1", &client), hash_password("u2", &client));
        assert_eq!(hash_password("u1", &client), sha1_hex(&format!("u1:{client}")));
    }

    #[test]
    fn digest_comparison() {
        assert!(digest_eq("abc", "abc"));
        assert!(!digest_eq("abc", "abd"));
        assert!(!digest_eq("abc", "abcd"));
    }
}
