//! Passphrase encryption for persisted records
//!
//! AES-256-CBC with PKCS#7 padding. Key and IV come from PBKDF2-HMAC-SHA256
//! over a fixed salt, recomputed on every call. The salt is identical for
//! every installation, so the passphrase is the only secret.
//!
//! An empty passphrase turns both directions into an identity copy.

use aes::Aes256;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use sha2::Sha256;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Fixed key-derivation salt. Changing it orphans every existing file.
pub const SALT: &[u8] = b"gamedata-store/record-salt/v1";
/// PBKDF2 iteration count
pub const ITERATIONS: u32 = 10_000;
/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("ciphertext length {0} is not a multiple of {BLOCK_SIZE}")]
    Length(usize),

    #[error("ciphertext padding is invalid (wrong passphrase or corrupt file)")]
    Padding,
}

/// Derive the AES key and IV for a passphrase
///
/// Both come from one 48-byte PBKDF2 output stream: key first, then IV.
pub fn derive_key_iv(passphrase: &str) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut stream = [0u8; KEY_LEN + IV_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), SALT, ITERATIONS, &mut stream);

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&stream[..KEY_LEN]);
    iv.copy_from_slice(&stream[KEY_LEN..]);
    (key, iv)
}

/// Encrypt `plain` under `passphrase`
pub fn encrypt(plain: &[u8], passphrase: &str) -> Vec<u8> {
    if passphrase.is_empty() {
        return plain.to_vec();
    }

    let (key, iv) = derive_key_iv(passphrase);
    Aes256CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plain)
}

/// Decrypt bytes produced by [`encrypt`] with the same passphrase
pub fn decrypt(cipher: &[u8], passphrase: &str) -> Result<Vec<u8>, CipherError> {
    if passphrase.is_empty() {
        return Ok(cipher.to_vec());
    }

    if cipher.is_empty() || cipher.len() % BLOCK_SIZE != 0 {
        return Err(CipherError::Length(cipher.len()));
    }

    let (key, iv) = derive_key_iv(passphrase);
    Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(cipher)
        .map_err(|_| CipherError::Padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &[u8] = br#"{"level":7,"score":4200}"#;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let sealed = encrypt(PLAIN, "hunter2");
        assert_ne!(sealed, PLAIN);
        assert_eq!(sealed.len() % BLOCK_SIZE, 0);
        assert_eq!(decrypt(&sealed, "hunter2").unwrap(), PLAIN);
    }

    #[test]
    fn test_padding_always_adds_a_block_when_aligned() {
        let aligned = [0x41u8; 32];
        let sealed = encrypt(&aligned, "k");
        assert_eq!(sealed.len(), 48);
    }

    #[test]
    fn test_empty_passphrase_is_identity() {
        assert_eq!(encrypt(PLAIN, ""), PLAIN);
        assert_eq!(decrypt(PLAIN, "").unwrap(), PLAIN);
    }

    #[test]
    fn test_fixed_salt_makes_output_deterministic() {
        assert_eq!(encrypt(PLAIN, "same"), encrypt(PLAIN, "same"));
        assert_ne!(encrypt(PLAIN, "same"), encrypt(PLAIN, "other"));
    }

    #[test]
    fn test_wrong_passphrase_fails_padding() {
        let sealed = encrypt(PLAIN, "X");
        assert_eq!(decrypt(&sealed, "Y"), Err(CipherError::Padding));
    }

    #[test]
    fn test_empty_passphrase_returns_ciphertext_unmodified() {
        let sealed = encrypt(PLAIN, "X");
        assert_eq!(decrypt(&sealed, "").unwrap(), sealed);
    }

    #[test]
    fn test_misaligned_ciphertext_rejected() {
        let mut sealed = encrypt(PLAIN, "X");
        sealed.pop();
        assert_eq!(decrypt(&sealed, "X"), Err(CipherError::Length(sealed.len())));
        assert_eq!(decrypt(&[], "X"), Err(CipherError::Length(0)));
    }

    #[test]
    fn test_derived_key_and_iv_are_distinct() {
        let (key, iv) = derive_key_iv("passphrase");
        assert_ne!(&key[..IV_LEN], &iv[..]);
        assert_eq!(derive_key_iv("passphrase"), (key, iv));
    }
}
