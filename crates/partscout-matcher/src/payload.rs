//! Image payload encoding for the matcher wire format.
//!
//! The matcher expects image queries as plain base64 text: raw bytes are
//! encoded, and payloads that already arrive as `data:*;base64,` URIs are
//! stripped of the prefix instead of being double-encoded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Build the wire payload for an image query.
pub fn image_payload(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let body = strip_data_uri_prefix(text);
        // Stripping only shortens the text when it really was a data URI;
        // anything else is treated as raw bytes.
        if body.len() != text.len() {
            return body.to_string();
        }
    }
    STANDARD.encode(bytes)
}

/// Strip a leading `data:*;base64,` prefix from an encoded payload.
///
/// Payloads without the prefix pass through unchanged.
pub fn strip_data_uri_prefix(payload: &str) -> &str {
    payload
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, body)| body.trim())
        .unwrap_or(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_bytes_are_encoded() {
        assert_eq!(image_payload(b"hello"), "aGVsbG8=");
        assert_eq!(image_payload(&[0xFF, 0xD8, 0xFF]), "/9j/");
    }

    #[test]
    fn test_data_uri_prefix_is_stripped() {
        assert_eq!(image_payload(b"data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(
            strip_data_uri_prefix("data:image/jpeg;base64,aGVsbG8="),
            "aGVsbG8="
        );
    }

    #[test]
    fn test_payload_without_prefix_passes_through() {
        assert_eq!(strip_data_uri_prefix("aGVsbG8="), "aGVsbG8=");
        // Text that merely mentions "data:" but is not a base64 URI is
        // treated as raw bytes.
        assert_eq!(image_payload(b"data:whatever"), STANDARD.encode(b"data:whatever"));
    }
}
