use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepId {
    Welcome,
    BrandGuide,
    Logo,
    Colours,
    Fonts,
    BusinessQuestion,
    Icons,
    Review,
}

impl StepId {
    pub const ALL: [StepId; 8] = [
        StepId::Welcome,
        StepId::BrandGuide,
        StepId::Logo,
        StepId::Colours,
        StepId::Fonts,
        StepId::BusinessQuestion,
        StepId::Icons,
        StepId::Review,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::BrandGuide => "brandGuide",
            Self::Logo => "logo",
            Self::Colours => "colours",
            Self::Fonts => "fonts",
            Self::BusinessQuestion => "businessQuestion",
            Self::Icons => "icons",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown step '{value}'")]
pub struct UnknownStep {
    pub value: String,
}

impl FromStr for StepId {
    type Err = UnknownStep;

    /// Accepts the camelCase identifiers as well as kebab/snake spellings,
    /// case-insensitively (`brandGuide`, `brand-guide`, `brand_guide`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|character| *character != '-' && *character != '_')
            .map(|character| character.to_ascii_lowercase())
            .collect();

        let step = match normalized.as_str() {
            "welcome" => Self::Welcome,
            "brandguide" => Self::BrandGuide,
            "logo" => Self::Logo,
            "colours" | "colors" => Self::Colours,
            "fonts" => Self::Fonts,
            "businessquestion" | "business" => Self::BusinessQuestion,
            "icons" => Self::Icons,
            "review" => Self::Review,
            _ => {
                return Err(UnknownStep {
                    value: value.to_string(),
                });
            }
        };

        Ok(step)
    }
}

/// Top-level choice made on the welcome screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardPath {
    /// Upload a brand guide.
    A,
    /// Answer the questions manually.
    B,
}

impl fmt::Display for WizardPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown path '{value}', expected A or B")]
pub struct UnknownPath {
    pub value: String,
}

impl FromStr for WizardPath {
    type Err = UnknownPath;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "a" | "A" => Ok(Self::A),
            "b" | "B" => Ok(Self::B),
            _ => Err(UnknownPath {
                value: value.to_string(),
            }),
        }
    }
}

/// The five fields that steer step ordering. Only the flag-owning actions may
/// change them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WizardFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<WizardPath>,
    #[serde(default)]
    pub has_brand_guide: bool,
    #[serde(default)]
    pub has_logo: bool,
    #[serde(default)]
    pub has_colours: bool,
    #[serde(default)]
    pub has_fonts: bool,
}
