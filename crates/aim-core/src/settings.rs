//! Persisted AIM viewer settings.
//!
//! These are the values edited through the AIM configuration pages. They are stored as YAML,
//! by default in `aim-settings.yaml` inside the template directory:
//!
//! ```yaml
//! local_annotations_folder: /data/aim
//! default_markup_color: '#FFFF00'
//! use_random_markup_color: false
//! show_annotations_list_on_startup: true
//! ```
//!
//! Every key is optional; a missing file yields [`AimSettings::default`].

use crate::constants::DEFAULT_MARKUP_COLOR;
use crate::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AimSettings {
    /// Folder where annotations are stored when no server is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_annotations_folder: Option<PathBuf>,

    #[serde(default)]
    pub default_markup_color: MarkupColor,

    /// Pick a random colour for each new markup instead of the default colour.
    #[serde(default)]
    pub use_random_markup_color: bool,

    #[serde(default = "default_true")]
    pub show_annotations_list_on_startup: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AimSettings {
    fn default() -> Self {
        Self {
            local_annotations_folder: None,
            default_markup_color: MarkupColor::default(),
            use_random_markup_color: false,
            show_annotations_list_on_startup: true,
        }
    }
}

/// An opaque RGB markup colour, written as `#RRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkupColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl MarkupColor {
    /// Parses a colour in `#RRGGBB` form. Hex digits may be upper or lower case.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the value is not a `#` followed by six hex digits.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let invalid =
            || CoreError::InvalidInput(format!("markup colour must be #RRGGBB, got '{raw}'"));

        let hex = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };

        Ok(Self {
            red: channel(0..2)?,
            green: channel(2..4)?,
            blue: channel(4..6)?,
        })
    }
}

impl Default for MarkupColor {
    fn default() -> Self {
        // DEFAULT_MARKUP_COLOR is a valid literal.
        Self::parse(DEFAULT_MARKUP_COLOR).unwrap_or(Self {
            red: 0xFF,
            green: 0xFF,
            blue: 0x00,
        })
    }
}

impl fmt::Display for MarkupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl Serialize for MarkupColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MarkupColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Strictly parse settings from YAML text.
///
/// # Errors
///
/// Returns [`CoreError::SettingsMismatch`] naming the failing key if the YAML does not match
/// the settings schema, including unknown keys.
pub fn read_settings(yaml: &str) -> CoreResult<AimSettings> {
    if yaml.trim().is_empty() {
        return Ok(AimSettings::default());
    }

    let deserializer = serde_yaml::Deserializer::from_str(yaml);

    match serde_path_to_error::deserialize(deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(CoreError::SettingsMismatch(format!("{path}: {source}")))
        }
    }
}

pub fn write_settings(settings: &AimSettings) -> CoreResult<String> {
    serde_yaml::to_string(settings).map_err(CoreError::YamlSerialization)
}

/// Load settings from `path`, falling back to defaults when the file does not exist.
pub fn load_settings(path: &Path) -> CoreResult<AimSettings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "settings file not found; using defaults");
        return Ok(AimSettings::default());
    }

    let yaml = fs::read_to_string(path).map_err(CoreError::FileRead)?;
    read_settings(&yaml)
}

pub fn save_settings(path: &Path, settings: &AimSettings) -> CoreResult<()> {
    let yaml = write_settings(settings)?;
    fs::write(path, yaml).map_err(CoreError::FileWrite)?;
    tracing::info!(path = %path.display(), "saved AIM settings");
    Ok(())
}
