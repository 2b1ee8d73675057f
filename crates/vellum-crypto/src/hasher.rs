use vellum_types::{Algorithm, Ref};

/// Pure bytes-to-[`Ref`] function.
///
/// The hash covers the exact bytes given, with no domain prefix, so a ref
/// computed by any client over the raw bytes of an object matches the ref
/// the store assigns to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hasher {
    algorithm: Algorithm,
}

impl Hasher {
    /// The default BLAKE3 hasher.
    pub const BLAKE3: Self = Self {
        algorithm: Algorithm::Blake3,
    };

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Hash raw bytes.
    pub fn hash(&self, data: &[u8]) -> Ref {
        match self.algorithm {
            Algorithm::Blake3 => Ref::new(Algorithm::Blake3, *blake3::hash(data).as_bytes()),
        }
    }

    /// Verify that data produces the expected ref.
    ///
    /// A ref tagged with a different algorithm never verifies.
    pub fn verify(&self, data: &[u8], expected: &Ref) -> bool {
        expected.algorithm() == self.algorithm && self.hash(data) == *expected
    }

    /// Start a streaming checksum with this hasher's algorithm.
    pub fn checksum(&self) -> Checksum {
        Checksum::new()
    }

    /// Checksum of a complete in-memory payload.
    pub fn checksum_of(&self, data: &[u8]) -> String {
        let mut checksum = self.checksum();
        checksum.update(data);
        checksum.finalize_hex()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::BLAKE3
    }
}

/// Streaming checksum over the full byte concatenation of a payload.
///
/// This is not a content address: it fingerprints the user's bytes only,
/// so it stays the same whatever chunk boundaries were chosen.
#[derive(Clone, Debug, Default)]
pub struct Checksum {
    inner: blake3::Hasher,
    len: u64,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next slice of the payload.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.len += data.len() as u64;
    }

    /// Number of bytes fed so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Hex-encoded digest of everything fed so far.
    pub fn finalize_hex(&self) -> String {
        hex::encode(self.inner.finalize().as_bytes())
    }
}

impl std::io::Write for Checksum {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(Hasher::BLAKE3.hash(data), Hasher::BLAKE3.hash(data));
    }

    #[test]
    fn different_data_produces_different_refs() {
        assert_ne!(Hasher::BLAKE3.hash(b"hello"), Hasher::BLAKE3.hash(b"world"));
    }

    #[test]
    fn hash_matches_plain_blake3() {
        let r = Hasher::BLAKE3.hash(b"abc");
        assert_eq!(r.digest(), blake3::hash(b"abc").as_bytes());
        assert_eq!(r.algorithm(), Algorithm::Blake3);
    }

    #[test]
    fn verify_correct_and_tampered_data() {
        let r = Hasher::BLAKE3.hash(b"original");
        assert!(Hasher::BLAKE3.verify(b"original", &r));
        assert!(!Hasher::BLAKE3.verify(b"tampered", &r));
    }

    #[test]
    fn checksum_ignores_split_points() {
        let mut whole = Checksum::new();
        whole.update(b"abcdefgh");

        let mut parts = Checksum::new();
        parts.update(b"abc");
        parts.update(b"");
        parts.update(b"defgh");

        assert_eq!(whole.finalize_hex(), parts.finalize_hex());
        assert_eq!(parts.len(), 8);
    }

    #[test]
    fn checksum_of_nothing_is_blake3_of_empty() {
        let c = Checksum::new();
        assert!(c.is_empty());
        assert_eq!(c.finalize_hex(), hex::encode(blake3::hash(b"").as_bytes()));
    }
}
