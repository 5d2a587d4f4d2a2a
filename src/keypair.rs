//! Loading signing keypairs from JSON key files.
//!
//! A key file holds the 64 raw secret-key bytes as a JSON integer array, the
//! format produced by `solana-keygen`: the 32-byte ed25519 seed followed by the
//! 32-byte public key.

use crate::error::{Error, Result};
use solana_sdk::signer::{
    Signer,
    keypair::{Keypair, keypair_from_seed},
};
use std::{fs, path::Path};

pub const KEYPAIR_LENGTH: usize = 64;
const SEED_LENGTH: usize = 32;

/// Read a keypair from a JSON key file
///
/// # Errors
/// * `Error::Io` if the file cannot be read
/// * `Error::Parse` if the content is not a JSON array of bytes
/// * `Error::InvalidKey` if the bytes are not a valid 64-byte keypair
pub fn read_keypair_file<P: AsRef<Path>>(path: P) -> Result<Keypair> {
    let path = path.as_ref();
    let contents = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let bytes: Vec<u8> = serde_json::from_slice(&contents)?;

    let keypair = decode_keypair(&bytes)?;
    log::debug!("Loaded keypair {} from {}", keypair.pubkey(), path.display());

    Ok(keypair)
}

/// Build a keypair from raw secret-key bytes, checking that the trailing
/// public key matches the one derived from the seed.
pub fn decode_keypair(bytes: &[u8]) -> Result<Keypair> {
    if bytes.len() != KEYPAIR_LENGTH {
        return Err(Error::InvalidKey(format!(
            "expected {} bytes, got {}",
            KEYPAIR_LENGTH,
            bytes.len()
        )));
    }

    let (seed, public) = bytes.split_at(SEED_LENGTH);
    let keypair = keypair_from_seed(seed).map_err(|e| Error::InvalidKey(e.to_string()))?;

    if keypair.pubkey().as_ref() != public {
        return Err(Error::InvalidKey(
            "public key does not match secret key".to_string(),
        ));
    }

    Ok(keypair)
}

/// Write a keypair as a JSON byte array, the same format `read_keypair_file` accepts
pub fn write_keypair_file<P: AsRef<Path>>(keypair: &Keypair, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string(&keypair.to_bytes().to_vec())?;
    fs::write(path, json).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use solana_sdk::pubkey::Pubkey;
    use std::path::PathBuf;

    fn temp_key_path() -> PathBuf {
        std::env::temp_dir().join(format!("orca-sample-{}.json", Pubkey::new_unique()))
    }

    fn sequential_keypair_bytes() -> Vec<u8> {
        let seed: Vec<u8> = (1..=32).collect();
        let keypair = keypair_from_seed(&seed).unwrap();
        keypair.to_bytes().to_vec()
    }

    #[test]
    fn test_read_keypair_file_roundtrip() {
        let path = temp_key_path();
        let keypair = Keypair::new();
        write_keypair_file(&keypair, &path).unwrap();

        let loaded = read_keypair_file(&path).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
        assert_eq!(loaded.to_bytes(), keypair.to_bytes());

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_sequential_key_is_reproducible() {
        let path = temp_key_path();
        let bytes = sequential_keypair_bytes();
        fs::write(&path, serde_json::to_string(&bytes).unwrap()).unwrap();

        let first = read_keypair_file(&path).unwrap();
        let second = read_keypair_file(&path).unwrap();
        assert_eq!(first.pubkey(), second.pubkey());
        assert_eq!(first.pubkey().as_ref(), &bytes[32..]);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file() {
        let path = temp_key_path();
        assert_matches!(read_keypair_file(&path), Err(Error::Io { .. }));
    }

    #[test]
    fn test_not_json() {
        let path = temp_key_path();
        fs::write(&path, "not a key").unwrap();
        assert_matches!(read_keypair_file(&path), Err(Error::Parse(_)));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_values_out_of_byte_range() {
        let path = temp_key_path();
        fs::write(&path, "[1, 2, 256]").unwrap();
        assert_matches!(read_keypair_file(&path), Err(Error::Parse(_)));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_wrong_length() {
        assert_matches!(decode_keypair(&[7u8; 32]), Err(Error::InvalidKey(_)));
        assert_matches!(decode_keypair(&[7u8; 65]), Err(Error::InvalidKey(_)));
        assert_matches!(decode_keypair(&[]), Err(Error::InvalidKey(_)));
    }

    #[test]
    fn test_mismatched_public_key() {
        let mut bytes = sequential_keypair_bytes();
        bytes[63] ^= 0xff;
        assert_matches!(decode_keypair(&bytes), Err(Error::InvalidKey(_)));
    }
}
