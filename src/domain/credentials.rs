use crate::error::{PesaError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};

/// Parses the gateway public key.
///
/// Accepts a SubjectPublicKeyInfo PEM (`BEGIN PUBLIC KEY`), a PKCS#1 PEM
/// (`BEGIN RSA PUBLIC KEY`), or the bare base64 body the developer portal
/// hands out without any armor.
pub fn parse_public_key(material: &str) -> Result<RsaPublicKey> {
    let material = material.trim();
    if material.is_empty() {
        return Err(PesaError::Configuration("public_key is empty".to_string()));
    }

    if material.starts_with("-----BEGIN RSA PUBLIC KEY") {
        return RsaPublicKey::from_pkcs1_pem(material)
            .map_err(|e| PesaError::Configuration(format!("invalid PKCS#1 public key: {e}")));
    }
    if material.starts_with("-----BEGIN") {
        return RsaPublicKey::from_public_key_pem(material)
            .map_err(|e| PesaError::Configuration(format!("invalid public key PEM: {e}")));
    }

    let body: String = material.split_whitespace().collect();
    let der = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| PesaError::Configuration(format!("public key is not valid base64: {e}")))?;

    RsaPublicKey::from_public_key_der(&der)
        .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
        .map_err(|e| PesaError::Configuration(format!("invalid public key: {e}")))
}

/// Encrypts a credential for the `Authorization: Bearer` header.
///
/// PKCS#1 v1.5 padding is randomized, so two calls never yield the same
/// ciphertext. Nothing is cached.
pub fn encrypt_credential(secret: &str, key: &RsaPublicKey) -> Result<String> {
    let mut rng = rand::thread_rng();
    let ciphertext = key
        .encrypt(&mut rng, Pkcs1v15Encrypt, secret.as_bytes())
        .map_err(|e| PesaError::Encryption(e.to_string()))?;
    Ok(STANDARD.encode(ciphertext))
}
