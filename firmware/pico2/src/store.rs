//! Persisted settings document.
//!
//! Settings are stored as their flattened `path=json` text, the same form the
//! host sees in a settings dump. This module only converts; flash access
//! lives in the binary.

use core::fmt;

use eyes_common::Settings;
use eyes_common::settings::LoadError;
use heapless::String;

/// Largest settings document that fits a flash record.
pub const DOCUMENT_CAPACITY: usize = 2048;

/// Encoded settings text.
pub type Document = String<DOCUMENT_CAPACITY>;

/// Why a stored document could not be turned back into settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum DecodeError {
    NotUtf8,
    Parse(LoadError),
}

impl fmt::Display for DecodeError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::NotUtf8 => write!(f, "settings record is not UTF-8"),
            Self::Parse(e) => write!(f, "settings record: {e}"),
        }
    }
}

/// Flatten settings into a document. Fails only if it exceeds [`DOCUMENT_CAPACITY`].
pub fn encode(settings: &Settings) -> Result<Document, fmt::Error> {
    let mut document = Document::new();
    settings.write_flat(&mut document)?;
    Ok(document)
}

/// Rebuild settings from a stored document.
pub fn decode(bytes: &[u8]) -> Result<Settings, DecodeError> {
    let text = core::str::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?;
    Settings::from_flat(text).map_err(DecodeError::Parse)
}

#[cfg(test)]
mod tests {
    use eyes_common::settings::SettingsError;
    use eyes_common::commands;

    use super::*;

    #[test]
    fn test_defaults_fit_and_round_trip() {
        let settings = Settings::default();
        let document = encode(&settings).unwrap();
        assert_eq!(decode(document.as_bytes()).unwrap(), settings);
    }

    #[test]
    fn test_mutations_survive_reload() {
        let mut settings = Settings::default();
        for line in ["setState=4", "setSkinOption=metal:tint:77", "setBacklight=30", "setPosition=10,20"] {
            commands::handle_line(&mut settings, line).unwrap();
        }
        let reloaded = decode(encode(&settings).unwrap().as_bytes()).unwrap();
        assert_eq!(reloaded, settings);
        assert_eq!(reloaded.display.backlight, 30);
    }

    #[test]
    fn test_garbage_record_is_an_error() {
        assert_eq!(decode(&[0xc3, 0x28]), Err(DecodeError::NotUtf8));
        let err = decode(b"states.page=3\nnot a setting\n").unwrap_err();
        assert_eq!(
            err,
            DecodeError::Parse(LoadError {
                line: 2,
                error: SettingsError::MalformedLine,
            })
        );
    }
}
