//! Record identity hashing.
//!
//! Every parsed record carries a hash of its matched raw text, used
//! downstream as a storage/deduplication identifier. The digest algorithm
//! and salt policy come from the session configuration.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

/// Work factor for the bcrypt mode. Valid range is 4..=31.
const BCRYPT_COST: u32 = 10;

/// Digest applied to the salted record text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// Fast digest, lowercase hex output.
    #[default]
    Md5,
    /// Stronger digest, lowercase hex output.
    Sha1,
    /// Slow password-hash-style digest, native `$2b$...` encoding.
    Bcrypt,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Bcrypt => "bcrypt",
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "bcrypt" => Ok(HashAlgorithm::Bcrypt),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}

/// Where the salt comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaltPolicy {
    /// One salt for the whole session; hashing is then a pure function of
    /// the input text, so identifiers are reproducible across runs.
    Fixed(String),
    /// A fresh random salt per invocation. Two hashes of the same text
    /// will differ; callers that need reproducible identifiers must use
    /// [`SaltPolicy::Fixed`].
    Random,
}

/// Salted digest of a record's matched text.
pub struct RecordHasher {
    algorithm: HashAlgorithm,
    salt: SaltPolicy,
}

impl RecordHasher {
    pub fn new(algorithm: HashAlgorithm, salt: SaltPolicy) -> Self {
        Self { algorithm, salt }
    }

    /// Hash the matched text (trimmed) under the configured algorithm and
    /// salt policy.
    pub fn hash(&self, matched: &str) -> String {
        let data = matched.trim();
        match self.algorithm {
            HashAlgorithm::Md5 => {
                let salted = format!("{}{}", data, self.salt_string());
                hex::encode(Md5::digest(salted.as_bytes()))
            }
            HashAlgorithm::Sha1 => {
                let salted = format!("{}{}", data, self.salt_string());
                hex::encode(Sha1::digest(salted.as_bytes()))
            }
            HashAlgorithm::Bcrypt => {
                let parts = bcrypt::hash_with_salt(data, BCRYPT_COST, self.salt_bytes())
                    .expect("BCRYPT_COST is within bcrypt's valid 4..=31 range");
                parts.format_for_version(bcrypt::Version::TwoB)
            }
        }
    }

    /// Salt for the digest modes, appended to the record text.
    fn salt_string(&self) -> String {
        match &self.salt {
            SaltPolicy::Fixed(salt) => salt.trim().to_string(),
            SaltPolicy::Random => hex::encode(rand::random::<[u8; 16]>()),
        }
    }

    /// Salt for the bcrypt mode, which takes its salt natively rather
    /// than by concatenation. A fixed salt string is truncated or
    /// zero-padded to bcrypt's 16 bytes, keeping the output deterministic.
    fn salt_bytes(&self) -> [u8; 16] {
        match &self.salt {
            SaltPolicy::Fixed(salt) => {
                let mut out = [0u8; 16];
                for (slot, byte) in out.iter_mut().zip(salt.trim().bytes()) {
                    *slot = byte;
                }
                out
            }
            SaltPolicy::Random => rand::random(),
        }
    }
}
