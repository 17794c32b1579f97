/// SHA-256 digests as published next to a firmware image
use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ChecksumError {
    #[error("checksum is empty")]
    Empty,
    #[error("checksum must be 64 hex characters, got {0}")]
    Length(usize),
    #[error("checksum is not valid hex")]
    Hex,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; 32]);

impl Sha256Digest {
    pub fn of(data: &[u8]) -> Self {
        Self::from_hasher(Sha256::new_with_prefix(data))
    }

    pub(crate) fn from_hasher(hasher: Sha256) -> Self {
        Self(hasher.finalize().into())
    }

    /// Parse the first field of a `sha256sum` line (`<hex>  <file name>`)
    pub fn parse_line(line: &str) -> Result<Self, ChecksumError> {
        let field = line.split_whitespace().next().ok_or(ChecksumError::Empty)?;
        if field.len() != 64 {
            return Err(ChecksumError::Length(field.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(field, &mut bytes).map_err(|_| ChecksumError::Hex)?;
        Ok(Self(bytes))
    }

    /// Render a `sha256sum` compatible line for `file_name`
    pub fn to_line(&self, file_name: &str) -> String {
        format!("{}  {}\n", self, file_name)
    }
}

impl FromStr for Sha256Digest {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_line(s)
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_known_vector() {
        assert_eq!(Sha256Digest::of(b"abc").to_string(), ABC);
    }

    #[test]
    fn test_parse_sha256sum_line() {
        let line = format!("{}  firmware.bin\n", ABC.to_uppercase());
        let digest: Sha256Digest = line.parse().unwrap();
        assert_eq!(digest, Sha256Digest::of(b"abc"));
        assert_eq!(digest.to_line("firmware.bin"), format!("{}  firmware.bin\n", ABC));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Sha256Digest::parse_line("  \n"), Err(ChecksumError::Empty));
        assert_eq!(Sha256Digest::parse_line("abcd"), Err(ChecksumError::Length(4)));
        let bad = "z".repeat(64);
        assert_eq!(Sha256Digest::parse_line(&bad), Err(ChecksumError::Hex));
    }
}
