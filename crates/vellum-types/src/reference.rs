use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Hash algorithm named by the tag of a [`Ref`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// BLAKE3 with a 32-byte digest.
    Blake3,
}

impl Algorithm {
    /// The textual tag written in front of the digest.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes.
    pub const fn digest_len(&self) -> usize {
        match self {
            Self::Blake3 => 32,
        }
    }
}

impl FromStr for Algorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blake3" => Ok(Self::Blake3),
            other => Err(TypeError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Content address of an immutable stored object.
///
/// A `Ref` is the hash of an object's exact stored bytes, tagged with the
/// algorithm that produced it. Its textual form is `"<alg>-<hex digest>"`,
/// e.g. `blake3-af1349b9...`. Equal bytes always produce equal refs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ref {
    algorithm: Algorithm,
    digest: [u8; 32],
}

impl Ref {
    /// Build a ref from an algorithm and a pre-computed digest.
    pub const fn new(algorithm: Algorithm, digest: [u8; 32]) -> Self {
        Self { algorithm, digest }
    }

    /// The algorithm that produced this ref.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The raw digest bytes.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Hex-encoded digest without the algorithm tag.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Short form for display: the last 8 hex characters of the digest.
    pub fn short(&self) -> String {
        hex::encode(&self.digest[28..])
    }

    /// Parse the textual `"<alg>-<hex>"` form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let (tag, hex_digest) = s
            .split_once('-')
            .ok_or_else(|| TypeError::MalformedRef(s.to_string()))?;
        let algorithm: Algorithm = tag.parse()?;
        let bytes = hex::decode(hex_digest).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != algorithm.digest_len() {
            return Err(TypeError::InvalidLength {
                expected: algorithm.digest_len(),
                actual: bytes.len(),
            });
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes);
        Ok(Self { algorithm, digest })
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({}-{})", self.algorithm, self.short())
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.algorithm, self.digest_hex())
    }
}

impl FromStr for Ref {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ref {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Ref> for String {
    fn from(r: Ref) -> Self {
        r.to_string()
    }
}
