use sha2::{Digest, Sha256};

pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex, 64 chars.
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Digest recorded on every processing result so callers can spot a
/// resubmitted statement.
pub fn statement_digest(data: &[u8]) -> String {
    to_hex(&sha256_bytes(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_known_vector() {
        assert_eq!(
            statement_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_tracks_content() {
        assert_eq!(statement_digest(b"stmt"), statement_digest(b"stmt"));
        assert_ne!(statement_digest(b"stmt-a"), statement_digest(b"stmt-b"));
        assert_eq!(statement_digest(b"stmt").len(), 64);
    }
}
