//! On-disk encodings for a record's canonical JSON text
//!
//! Neither format adds a header or version tag; the envelope is the only
//! difference between them.

use std::fmt;
use std::str::FromStr;
use std::string::FromUtf8Error;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while decoding persisted bytes back into text
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("persisted text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("length-prefixed envelope is malformed: {0}")]
    Envelope(#[from] bincode::Error),
}

/// Byte envelope used for a record file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SerializationFormat {
    /// The JSON text as raw UTF-8 bytes
    #[default]
    Json,
    /// A little-endian `u64` byte length followed by the UTF-8 bytes
    LengthPrefixedText,
}

impl SerializationFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SerializationFormat::Json => "json",
            SerializationFormat::LengthPrefixedText => "length_prefixed_text",
        }
    }

    /// Wrap canonical text in this format's envelope
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        match self {
            SerializationFormat::Json => Ok(text.as_bytes().to_vec()),
            SerializationFormat::LengthPrefixedText => Ok(bincode::serialize(text)?),
        }
    }

    /// Unwrap bytes produced by [`encode`](Self::encode)
    ///
    /// Bytes after the declared length are ignored.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        match self {
            SerializationFormat::Json => Ok(String::from_utf8(bytes.to_vec())?),
            SerializationFormat::LengthPrefixedText => {
                Ok(bincode::deserialize::<String>(bytes)?)
            }
        }
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SerializationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [SerializationFormat::Json, SerializationFormat::LengthPrefixedText]
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| format!("unsupported serialization format '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = r#"{"level":3,"score":1200}"#;

    #[test]
    fn test_json_is_raw_utf8() {
        let bytes = SerializationFormat::Json.encode(TEXT).unwrap();
        assert_eq!(bytes, TEXT.as_bytes());
        assert_eq!(SerializationFormat::Json.decode(&bytes).unwrap(), TEXT);
    }

    #[test]
    fn test_length_prefix_layout() {
        let text = "héllo";
        let bytes = SerializationFormat::LengthPrefixedText.encode(text).unwrap();

        // 6 UTF-8 bytes, not 5 characters
        assert_eq!(&bytes[..8], &6u64.to_le_bytes());
        assert_eq!(&bytes[8..], text.as_bytes());
    }

    #[test]
    fn test_length_prefix_ignores_trailing_bytes() {
        let mut bytes = SerializationFormat::LengthPrefixedText.encode(TEXT).unwrap();
        bytes.extend_from_slice(b"junk");
        let decoded = SerializationFormat::LengthPrefixedText.decode(&bytes).unwrap();
        assert_eq!(decoded, TEXT);
    }

    #[test]
    fn test_length_prefix_truncated_body() {
        let bytes = SerializationFormat::LengthPrefixedText.encode(TEXT).unwrap();
        let result = SerializationFormat::LengthPrefixedText.decode(&bytes[..bytes.len() - 3]);
        assert!(matches!(result, Err(CodecError::Envelope(_))));
    }

    #[test]
    fn test_json_rejects_invalid_utf8() {
        let result = SerializationFormat::Json.decode(&[0x7b, 0xff, 0xfe, 0x7d]);
        assert!(matches!(result, Err(CodecError::InvalidUtf8(_))));
    }

    #[test]
    fn test_envelopes_differ_but_carry_same_text() {
        let json = SerializationFormat::Json.encode(TEXT).unwrap();
        let wrapped = SerializationFormat::LengthPrefixedText.encode(TEXT).unwrap();
        assert_ne!(json, wrapped);
        assert_eq!(&wrapped[8..], &json[..]);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(
            "json".parse::<SerializationFormat>(),
            Ok(SerializationFormat::Json)
        );
        assert_eq!(
            "length_prefixed_text".parse::<SerializationFormat>(),
            Ok(SerializationFormat::LengthPrefixedText)
        );
        assert!("xml".parse::<SerializationFormat>().is_err());
    }

    #[test]
    fn test_from_str_matches_serde_names() {
        for format in [SerializationFormat::Json, SerializationFormat::LengthPrefixedText] {
            let serde_name = serde_json::to_value(format).unwrap();
            assert_eq!(serde_name, serde_json::json!(format.as_str()));
            assert_eq!(format.as_str().parse::<SerializationFormat>(), Ok(format));
        }
        for alias in ["binary", "length_prefixed", "Length-Prefixed-Text", "JSON"] {
            assert!(alias.parse::<SerializationFormat>().is_err(), "{alias}");
            assert!(serde_json::from_value::<SerializationFormat>(serde_json::json!(alias)).is_err());
        }
    }
}
