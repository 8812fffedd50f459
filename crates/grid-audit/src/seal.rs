//! Export seals: SHA-256 digests over exported payloads.

use sha2::{Digest, Sha256};

/// Generates and checks seals for exported payloads.
pub struct ExportSeal;

impl ExportSeal {
    /// Lowercase hex SHA-256 of `payload`'s UTF-8 bytes.
    pub fn generate(payload: &str) -> String {
        hex::encode(Sha256::digest(payload.as_bytes()))
    }

    /// Recompute the seal of `payload` and compare it with `expected`.
    ///
    /// The comparison runs in time independent of where the strings differ.
    /// `expected` is compared case-insensitively, since hex is.
    pub fn verify(payload: &str, expected: &str) -> bool {
        let actual = Self::generate(payload);
        constant_time_eq(actual.as_bytes(), expected.to_ascii_lowercase().as_bytes())
    }

    /// Display form: first four and last four characters joined by an ellipsis.
    ///
    /// Seals shorter than eight characters are returned unchanged.
    pub fn shortened(seal: &str) -> String {
        let chars: Vec<char> = seal.chars().collect();
        if chars.len() < 8 {
            return seal.to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}…{}", head, tail)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_has_known_digest() {
        assert_eq!(
            ExportSeal::generate(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(ExportSeal::verify("", &ExportSeal::generate("")));
    }

    #[test]
    fn verify_detects_changed_payload() {
        let seal = ExportSeal::generate("[{\"sequence\":0}]");
        assert!(ExportSeal::verify("[{\"sequence\":0}]", &seal));
        assert!(!ExportSeal::verify("[{\"sequence\":1}]", &seal));
        assert!(!ExportSeal::verify("[{\"sequence\":0}] ", &seal));
    }

    #[test]
    fn verify_accepts_uppercase_hex() {
        let seal = ExportSeal::generate("kitchen");
        assert!(ExportSeal::verify("kitchen", &seal.to_uppercase()));
    }

    #[test]
    fn verify_rejects_wrong_length() {
        let seal = ExportSeal::generate("kitchen");
        assert!(!ExportSeal::verify("kitchen", &seal[..63]));
        assert!(!ExportSeal::verify("kitchen", ""));
    }

    proptest::proptest! {
        #[test]
        fn prop_seal_round_trip(payload in ".*", extra in "[a-z]") {
            let seal = ExportSeal::generate(&payload);
            proptest::prop_assert!(ExportSeal::verify(&payload, &seal));
            let changed = format!("{}{}", payload, extra);
            proptest::prop_assert!(!ExportSeal::verify(&changed, &seal));
        }
    }

    #[test]
    fn shortened_seal() {
        let seal = ExportSeal::generate("");
        assert_eq!(ExportSeal::shortened(&seal), "e3b0…b855");
        assert_eq!(ExportSeal::shortened("abcdefgh"), "abcd…efgh");
        assert_eq!(ExportSeal::shortened("abc"), "abc");
    }
}
