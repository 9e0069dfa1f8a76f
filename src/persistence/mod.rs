//! Save/load persistence for typed records
//!
//! Layers, outermost first:
//! - `cipher`: optional AES-256-CBC envelope (passphrase + fixed salt)
//! - `codec`: raw JSON bytes or a length-prefixed string envelope
//! - `service`: per-record load/save/reset protocol
//!
//! Files carry no magic number or version tag.

pub mod cipher;
pub mod codec;
pub mod service;

pub use cipher::CipherError;
pub use codec::{CodecError, SerializationFormat};
pub use service::{
    LoadOutcome, PersistenceError, PersistenceService, RecordSlot, encryption_applies,
};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn format_strategy() -> impl Strategy<Value = SerializationFormat> {
        prop_oneof![
            Just(SerializationFormat::Json),
            Just(SerializationFormat::LengthPrefixedText),
        ]
    }

    proptest! {
        #[test]
        fn test_codec_cipher_roundtrip(
            text in "\\PC{0,200}",
            format in format_strategy(),
            passphrase in "[a-zA-Z0-9]{0,12}",
        ) {
            let sealed = cipher::encrypt(&format.encode(&text).unwrap(), &passphrase);
            let opened = format.decode(&cipher::decrypt(&sealed, &passphrase).unwrap()).unwrap();
            prop_assert_eq!(opened, text);
        }
    }
}
