//! Password encryption for the login request.
//!
//! The portal publishes an RSA public key; the password is encrypted with
//! PKCS#1 v1.5 padding and sent base64 encoded. Only the server can reverse it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};

use crate::error::{Result, WmsError};

/// Public key published by the portal's login page.
pub const PORTAL_PUBLIC_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQCtxsTrJZkxpuahl2CXxcKg5i83
0Zus/KdXWQH6aeZYQPzp0EJs2AqFcmvO1QRoE8l0+SlSGjNl5OI0E/VFsbfZ2PiP
/EhXpu2uncWfkmQM+yhMZG10LwMss+xwXQLkxLK8px4A/Vn+ei3QuI9XXqHjKE2m
k/owWSXoKBrnzY0BWwIDAQAB
-----END PUBLIC KEY-----";

#[derive(Debug, Clone)]
pub struct PasswordCipher {
	key: RsaPublicKey,
}

impl PasswordCipher {
	/// Parses an SPKI (`BEGIN PUBLIC KEY`) PEM.
	pub fn from_pem(pem: &str) -> Result<Self> {
		let key = RsaPublicKey::from_public_key_pem(pem.trim()).map_err(|e| WmsError::Encryption(format!("failed to parse public key: {e}")))?;
		Ok(Self { key })
	}

	pub fn portal_default() -> Result<Self> {
		Self::from_pem(PORTAL_PUBLIC_KEY_PEM)
	}

	/// Uses the configured key when present, the portal's published key otherwise.
	pub fn from_config(pem: Option<&str>) -> Result<Self> {
		match pem.map(str::trim).filter(|p| !p.is_empty()) {
			Some(pem) => Self::from_pem(pem),
			None => Self::portal_default(),
		}
	}

	pub fn encrypt(&self, password: &str) -> Result<String> {
		let mut rng = rand::thread_rng();
		let encrypted = self
			.key
			.encrypt(&mut rng, Pkcs1v15Encrypt, password.as_bytes())
			.map_err(|e| WmsError::Encryption(e.to_string()))?;
		Ok(STANDARD.encode(encrypted))
	}
}
