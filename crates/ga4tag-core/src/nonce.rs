//! Anti-forgery tokens for admin forms
//!
//! A token is an HMAC-SHA256 over the action name, the session subject and
//! a coarse time tick. It stays valid for the tick it was issued in and the
//! following one.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::prelude::*;

type HmacSha256 = Hmac<Sha256>;

/// Length of one tick in seconds (half of the token lifetime)
pub const NONCE_TICK_SECONDS: i64 = 12 * 60 * 60;

pub struct NonceService {
	key: Box<[u8]>,
}

impl std::fmt::Debug for NonceService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NonceService").finish_non_exhaustive()
	}
}

impl NonceService {
	pub fn new(secret: &str) -> ClResult<Self> {
		if secret.len() < 16 {
			return Err(Error::ConfigError("Nonce secret must be at least 16 bytes".into()));
		}
		Ok(Self { key: secret.as_bytes().into() })
	}

	fn tick(at: Timestamp) -> i64 {
		at.0.div_euclid(NONCE_TICK_SECONDS)
	}

	fn mac(&self, tick: i64, action: &str, subject: &str) -> ClResult<HmacSha256> {
		let mut mac = HmacSha256::new_from_slice(&self.key)
			.map_err(|e| Error::Internal(format!("HMAC key rejected: {}", e)))?;
		mac.update(format!("{}|{}|{}", tick, action, subject).as_bytes());
		Ok(mac)
	}

	/// Issue a token for `action` bound to the session `subject`
	pub fn create(&self, action: &str, subject: &str) -> ClResult<String> {
		self.create_at(action, subject, Timestamp::now())
	}

	pub fn create_at(&self, action: &str, subject: &str, at: Timestamp) -> ClResult<String> {
		let tag = self.mac(Self::tick(at), action, subject)?.finalize().into_bytes();
		Ok(URL_SAFE_NO_PAD.encode(tag))
	}

	/// Verify a token, `Error::InvalidToken` if it does not match
	pub fn verify(&self, token: &str, action: &str, subject: &str) -> ClResult<()> {
		self.verify_at(token, action, subject, Timestamp::now())
	}

	pub fn verify_at(
		&self,
		token: &str,
		action: &str,
		subject: &str,
		at: Timestamp,
	) -> ClResult<()> {
		let tag = URL_SAFE_NO_PAD.decode(token.as_bytes()).map_err(|_| Error::InvalidToken)?;
		let tick = Self::tick(at);
		for t in [tick, tick - 1] {
			if self.mac(t, action, subject)?.verify_slice(&tag).is_ok() {
				return Ok(());
			}
		}
		debug!("Nonce verification failed for action {}", action);
		Err(Error::InvalidToken)
	}
}


// vim: ts=4
