//! Serde helpers for key and signature material.

/// Fixed-size byte arrays (public keys, signatures).
///
/// Use with `#[serde(with = "crate::serde_helpers::hex_fixed")]` on
/// `[u8; N]` fields. Human-readable formats (TOML, JSON) get a hex string,
/// with a leading `0x` accepted when decoding. Binary formats get the raw
/// bytes.
pub mod hex_fixed {
    use std::fmt;

    use serde::de::{self, SeqAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a fixed-size byte array.
    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(bytes))
        } else {
            serializer.serialize_bytes(bytes)
        }
    }

    /// Deserialize a fixed-size byte array.
    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            super::decode_fixed(&s).map_err(de::Error::custom)
        } else {
            deserializer.deserialize_bytes(FixedBytesVisitor::<N>)
        }
    }

    struct FixedBytesVisitor<const N: usize>;

    impl<'de, const N: usize> Visitor<'de> for FixedBytesVisitor<N> {
        type Value = [u8; N];

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{N} bytes")
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            v.try_into().map_err(|_| E::invalid_length(v.len(), &self))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut out = [0u8; N];
            for (i, byte) in out.iter_mut().enumerate() {
                *byte = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(i, &self))?;
            }
            Ok(out)
        }
    }
}

/// Decode a hex string (optionally `0x`-prefixed) into exactly `N` bytes.
pub fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| format!("expected {N} bytes, got {len}"))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Key {
        #[serde(with = "super::hex_fixed")]
        bytes: [u8; 4],
    }

    #[test]
    fn test_hex_fixed_toml() {
        let key = Key { bytes: [0xde, 0xad, 0xbe, 0xef] };
        let encoded = toml::to_string(&key).unwrap();
        assert_eq!(encoded, "bytes = \"deadbeef\"\n");
    }

    #[test]
    fn test_decode_fixed_accepts_prefix_and_rejects_length() {
        assert_eq!(super::decode_fixed::<2>("0xabcd").unwrap(), [0xab, 0xcd]);
        assert_eq!(super::decode_fixed::<2>(" abcd\n").unwrap(), [0xab, 0xcd]);

        let err = super::decode_fixed::<4>("abcd").unwrap_err();
        assert_eq!(err, "expected 4 bytes, got 2");
    }

    #[test]
    fn test_hex_fixed_binary_is_raw_bytes() {
        let key = Key { bytes: [0xde, 0xad, 0xbe, 0xef] };
        let encoded = bincode::serialize(&key).unwrap();

        // u64 length prefix plus the raw bytes, no hex text.
        assert_eq!(encoded.len(), 8 + 4);
        assert_eq!(&encoded[8..], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(bincode::deserialize::<Key>(&encoded).unwrap(), key);
    }

    #[test]
    fn test_hex_fixed_binary_rejects_wrong_length() {
        let short = bincode::serialize(&vec![1u8, 2, 3]).unwrap();
        assert!(bincode::deserialize::<Key>(&short).is_err());
    }

    #[test]
    fn test_hex_fixed_rejects_wrong_length() {
        let parsed: Result<Key, _> = toml::from_str("bytes = \"abcd\"");
        assert!(parsed.is_err());
    }
}
