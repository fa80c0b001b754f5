use rand::RngCore;
use std::fmt;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

const CROCKFORD: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";

/// A unique, time-prefixed, lowercase base-32 identifier: 26 characters,
/// the first 10 encoding milliseconds since the epoch, the remaining 16
/// random. Used for room ids and job ids, matching spec.md's "unique
/// time-prefixed ULID-like string, 26 lowercase base-32 digits".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Ulid([u8; 26]);

impl Ulid {
    /// Generates a fresh id from the current time and a fresh random tail.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let mut rng = rand::rng();
        let mut tail = [0u8; 10];
        rng.fill_bytes(&mut tail);
        Self::encode(millis, &tail)
    }

    fn encode(millis: u64, tail: &[u8; 10]) -> Self {
        let mut out = [0u8; 26];
        // 48 bits of timestamp -> 10 base32 chars.
        let mut t = millis & 0xFFFF_FFFF_FFFF;
        for i in (0..10).rev() {
            out[i] = CROCKFORD[(t & 0x1F) as usize];
            t >>= 5;
        }
        // 80 bits of randomness -> 16 base32 chars, 5 bits at a time.
        let mut acc: u128 = 0;
        for &b in tail {
            acc = (acc << 8) | b as u128;
        }
        for i in (10..26).rev() {
            out[i] = CROCKFORD[(acc & 0x1F) as usize];
            acc >>= 5;
        }
        Ulid(out)
    }

    pub fn as_str(&self) -> &str {
        // Safe: every byte is drawn from CROCKFORD, which is ASCII.
        std::str::from_utf8(&self.0).expect("ulid bytes are ascii")
    }
}

impl fmt::Display for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ulid").field(&self.as_str()).finish()
    }
}

impl From<Ulid> for String {
    fn from(id: Ulid) -> Self {
        id.as_str().to_owned()
    }
}

impl TryFrom<&str> for Ulid {
    type Error = InvalidUlid;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let bytes = s.as_bytes();
        if bytes.len() != 26 {
            return Err(InvalidUlid);
        }
        let mut out = [0u8; 26];
        out.copy_from_slice(bytes);
        if !out.iter().all(|b| CROCKFORD.contains(b)) {
            return Err(InvalidUlid);
        }
        Ok(Ulid(out))
    }
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("malformed ulid")]
pub struct InvalidUlid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_26_lowercase_base32_chars() {
        let id = Ulid::generate();
        let s = id.as_str();
        assert_eq!(s.len(), 26);
        assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Ulid::generate();
        let b = Ulid::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn roundtrips_through_str() {
        let id = Ulid::generate();
        let s = id.as_str().to_owned();
        let back = Ulid::try_from(s.as_str()).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn rejects_bad_length() {
        assert!(Ulid::try_from("too-short").is_err());
    }
}
