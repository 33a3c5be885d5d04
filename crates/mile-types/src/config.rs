use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Text format used when a buffer is rendered for humans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// Lowercase hexadecimal, exactly two characters per byte.
    Hex,
    /// Base58 with a CRC-32 checksum suffix.
    #[default]
    Base58check,
}

/// How keys, digests and signatures are rendered as text.
///
/// ```toml
/// text_encoding = "hex"
/// redact_secrets = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Encoding used by `to_text`/`from_text` and signer dumps.
    pub text_encoding: TextEncoding,
    /// When `true`, private key material is never written by dumps.
    pub redact_secrets: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            text_encoding: TextEncoding::default(),
            redact_secrets: true,
        }
    }
}

impl EncodingConfig {
    /// Parse a configuration from a TOML document. Missing keys take their
    /// default values.
    pub fn from_toml_str(text: &str) -> Result<Self, TypeError> {
        toml::from_str(text).map_err(|e| TypeError::Config(e.to_string()))
    }

    /// Render the configuration as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, TypeError> {
        toml::to_string(self).map_err(|e| TypeError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = EncodingConfig::default();
        assert_eq!(c.text_encoding, TextEncoding::Base58check);
        assert!(c.redact_secrets);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c = EncodingConfig::from_toml_str("text_encoding = \"hex\"").unwrap();
        assert_eq!(c.text_encoding, TextEncoding::Hex);
        assert!(c.redact_secrets);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            EncodingConfig::from_toml_str("").unwrap(),
            EncodingConfig::default()
        );
    }

    #[test]
    fn unknown_encoding_is_config_error() {
        let err = EncodingConfig::from_toml_str("text_encoding = \"base64\"").unwrap_err();
        assert!(matches!(err, TypeError::Config(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let c = EncodingConfig {
            text_encoding: TextEncoding::Hex,
            redact_secrets: false,
        };
        let text = c.to_toml_string().unwrap();
        assert_eq!(EncodingConfig::from_toml_str(&text).unwrap(), c);
    }
}
