//! Admin authentication
//!
//! The admin surface checks credentials through the `Authenticator` trait.
//! `StaticCredentials` is the configured single-user implementation.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::config::AdminConfig;

type HmacSha256 = Hmac<Sha256>;

/// HMAC rounds used to stretch the configured password
pub const KEY_ROUNDS: u32 = 100_000;

const SALT_LEN: usize = 16;

/// Credential check used by the admin routes
pub trait Authenticator: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// One configured username/password pair
///
/// Only a salted, iterated HMAC-SHA256 tag of the username and password is
/// kept after construction. The salt is drawn per instance, so the same
/// password never produces the same tag twice.
pub struct StaticCredentials {
    salt: [u8; SALT_LEN],
    rounds: u32,
    tag: [u8; 32],
}

impl StaticCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self::with_rounds(username, password, KEY_ROUNDS)
    }

    pub fn with_rounds(username: &str, password: &str, rounds: u32) -> Self {
        let rounds = rounds.max(1);
        let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
        let tag = keyed(password)
            .chain(&salt, username, rounds)
            .finalize()
            .into_bytes()
            .into();

        Self { salt, rounds, tag }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(&config.username, &config.password)
    }

    /// Hex prefix of the stored tag, for startup logging
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.tag[..4])
    }
}

impl Authenticator for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        keyed(password)
            .chain(&self.salt, username, self.rounds)
            .verify_slice(&self.tag)
            .is_ok()
    }
}

/// HMAC keyed by the password
struct KeyedPassword(HmacSha256);

fn keyed(password: &str) -> KeyedPassword {
    let mac = HmacSha256::new_from_slice(password.as_bytes())
        .expect("HMAC takes keys of any length");
    KeyedPassword(mac)
}

impl KeyedPassword {
    /// Run `rounds - 1` HMAC rounds over `salt || username` and return the
    /// last round un-finalized, so the caller can finalize or verify it.
    fn chain(self, salt: &[u8], username: &str, rounds: u32) -> HmacSha256 {
        let mut mac = self.0.clone();
        mac.update(salt);
        mac.update(username.as_bytes());

        for _ in 1..rounds {
            let block = mac.finalize().into_bytes();
            mac = self.0.clone();
            mac.update(&block);
        }
        mac
    }
}

/// Split an `Authorization: Basic ...` header value into username and password
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    use base64::Engine;

    let encoded = header_value.strip_prefix("Basic ")?.trim();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
