use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colour {
    pub name: String,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontPair {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_guide: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<FontPair>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colours: Vec<Colour>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Partial theme. `None` keeps the current value; for nullable fields
/// `Some(None)` clears it. Lists and metadata replace wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeUpdate {
    pub name: Option<Option<String>>,
    pub logo: Option<Option<String>>,
    pub brand_guide: Option<Option<String>>,
    pub business: Option<Option<String>>,
    pub icons: Option<Option<String>>,
    pub fonts: Option<Option<FontPair>>,
    pub colours: Option<Vec<Colour>>,
    pub metadata: Option<BTreeMap<String, String>>,
}

impl ThemeUpdate {
    /// An update that overwrites every field with `theme`'s values.
    pub fn replace_all(theme: ThemeData) -> Self {
        Self {
            name: Some(theme.name),
            logo: Some(theme.logo),
            brand_guide: Some(theme.brand_guide),
            business: Some(theme.business),
            icons: Some(theme.icons),
            fonts: Some(theme.fonts),
            colours: Some(theme.colours),
            metadata: Some(theme.metadata),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl ThemeData {
    pub fn merge(&mut self, update: ThemeUpdate) {
        if let Some(value) = update.name {
            self.name = value;
        }
        if let Some(value) = update.logo {
            self.logo = value;
        }
        if let Some(value) = update.brand_guide {
            self.brand_guide = value;
        }
        if let Some(value) = update.business {
            self.business = value;
        }
        if let Some(value) = update.icons {
            self.icons = value;
        }
        if let Some(value) = update.fonts {
            self.fonts = value;
        }
        if let Some(value) = update.colours {
            self.colours = value;
        }
        if let Some(value) = update.metadata {
            self.metadata = value;
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
    #[error("colour name must be non-empty")]
    EmptyColourName,
    #[error("colour '{name}' has invalid hex value '{hex}' (expected #rgb or #rrggbb)")]
    InvalidHex { name: String, hex: String },
    #[error("colour must be given as NAME=HEX, got '{value}'")]
    MalformedColour { value: String },
    #[error("{role} font must be non-empty")]
    EmptyFont { role: &'static str },
    #[error("metadata must be given as KEY=VALUE, got '{value}'")]
    MalformedMetadata { value: String },
}

pub fn parse_colour(name: &str, hex: &str) -> Result<Colour, ThemeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ThemeError::EmptyColourName);
    }

    let hex = hex.trim();
    let digits = hex.strip_prefix('#').unwrap_or("");
    let valid_length = digits.len() == 3 || digits.len() == 6;
    if !valid_length || !digits.chars().all(|character| character.is_ascii_hexdigit()) {
        return Err(ThemeError::InvalidHex {
            name: name.to_string(),
            hex: hex.to_string(),
        });
    }

    Ok(Colour {
        name: name.to_string(),
        hex: hex.to_ascii_lowercase(),
    })
}

/// Parses `primary=#112233`.
pub fn parse_colour_assignment(value: &str) -> Result<Colour, ThemeError> {
    let Some((name, hex)) = value.split_once('=') else {
        return Err(ThemeError::MalformedColour {
            value: value.to_string(),
        });
    };
    parse_colour(name, hex)
}

pub fn parse_font_pair(heading: &str, body: &str) -> Result<FontPair, ThemeError> {
    let heading = heading.trim();
    if heading.is_empty() {
        return Err(ThemeError::EmptyFont { role: "heading" });
    }

    let body = body.trim();
    if body.is_empty() {
        return Err(ThemeError::EmptyFont { role: "body" });
    }

    Ok(FontPair {
        heading: heading.to_string(),
        body: body.to_string(),
    })
}

pub fn parse_metadata_assignment(value: &str) -> Result<(String, String), ThemeError> {
    match value.split_once('=') {
        Some((key, entry)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), entry.trim().to_string()))
        }
        _ => Err(ThemeError::MalformedMetadata {
            value: value.to_string(),
        }),
    }
}
