//! Key-pair credential for warehouse authentication.
//!
//! The PEM key is read once at startup and converted to DER-encoded PKCS#8
//! with no passphrase. The public-key fingerprint is what the warehouse
//! matches the signed token against.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Failed to read private key '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Private key is encrypted; an unencrypted key is required")]
    Encrypted,

    #[error("Private key is not a valid RSA PEM key: {0}")]
    Malformed(String),
}

/// Private key as PKCS#8 DER plus the matching public-key fingerprint.
#[derive(Clone)]
pub struct KeyPairCredential {
    private_key_der: Vec<u8>,
    public_key_fingerprint: String,
}

impl std::fmt::Debug for KeyPairCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPairCredential")
            .field("private_key_der", &"<redacted>")
            .field("public_key_fingerprint", &self.public_key_fingerprint)
            .finish()
    }
}

impl KeyPairCredential {
    pub fn load(path: &Path) -> Result<Self, KeyError> {
        let pem = fs::read_to_string(path).map_err(|source| KeyError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_pem(&pem)
    }

    /// Accepts `PRIVATE KEY` (PKCS#8) or `RSA PRIVATE KEY` (PKCS#1) blocks.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        if pem.contains("ENCRYPTED") {
            return Err(KeyError::Encrypted);
        }
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| KeyError::Malformed(e.to_string()))?;
        let private_key_der = key
            .to_pkcs8_der()
            .map_err(|e| KeyError::Malformed(e.to_string()))?
            .as_bytes()
            .to_vec();
        let public_key_fingerprint = fingerprint(&RsaPublicKey::from(&key))?;
        Ok(Self {
            private_key_der,
            public_key_fingerprint,
        })
    }

    /// DER-encoded PKCS#8 private key.
    pub fn private_key_der(&self) -> &[u8] {
        &self.private_key_der
    }

    /// `SHA256:<base64 digest of the SPKI public key>`.
    pub fn public_key_fingerprint(&self) -> &str {
        &self.public_key_fingerprint
    }
}

fn fingerprint(public: &RsaPublicKey) -> Result<String, KeyError> {
    let spki = public
        .to_public_key_der()
        .map_err(|e| KeyError::Malformed(e.to_string()))?;
    let digest = Sha256::digest(spki.as_bytes());
    Ok(format!("SHA256:{}", general_purpose::STANDARD.encode(digest)))
}
