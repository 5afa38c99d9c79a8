use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::WizardState;
use crate::step::{StepId, WizardPath};
use crate::theme::{Colour, FontPair};

pub const DESCRIPTOR_SCHEMA: &str = "themewiz/descriptor@1";

/// JSON theme document produced at the end of the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDescriptor {
    pub schema: String,
    pub generated_at: String,
    pub path: Option<WizardPath>,
    pub has_brand_guide: bool,
    pub has_logo: bool,
    pub has_colours: bool,
    pub has_fonts: bool,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub brand_guide: Option<String>,
    pub business: Option<String>,
    pub icons: Option<String>,
    pub fonts: Option<FontPair>,
    pub colours: Vec<Colour>,
    pub metadata: BTreeMap<String, String>,
    pub completed_steps: Vec<StepId>,
}

impl ThemeDescriptor {
    pub fn from_state(state: &WizardState, generated_at: String) -> Self {
        let theme = &state.theme;
        Self {
            schema: DESCRIPTOR_SCHEMA.to_string(),
            generated_at,
            path: state.flags.path,
            has_brand_guide: state.flags.has_brand_guide,
            has_logo: state.flags.has_logo,
            has_colours: state.flags.has_colours,
            has_fonts: state.flags.has_fonts,
            name: theme.name.clone(),
            logo: theme.logo.clone(),
            brand_guide: theme.brand_guide.clone(),
            business: theme.business.clone(),
            icons: theme.icons.clone(),
            fonts: theme.fonts.clone(),
            colours: theme.colours.clone(),
            metadata: theme.metadata.clone(),
            completed_steps: state.completed_steps.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_serializes_camel_case_fields() {
        let mut state = WizardState::default();
        state.flags.path = Some(WizardPath::B);
        state.flags.has_colours = true;
        state.theme.name = Some("Acme".to_string());
        state.completed_steps = vec![StepId::Welcome, StepId::BusinessQuestion];

        let descriptor = ThemeDescriptor::from_state(&state, "2026-01-01T00:00:00Z".to_string());
        let json: serde_json::Value =
            serde_json::from_str(&descriptor.to_json_pretty().expect("json")).expect("parse");

        assert_eq!(json["schema"], DESCRIPTOR_SCHEMA);
        assert_eq!(json["path"], "B");
        assert_eq!(json["hasColours"], true);
        assert_eq!(json["name"], "Acme");
        assert_eq!(json["completedSteps"][1], "businessQuestion");
        assert_eq!(json["logo"], serde_json::Value::Null);
    }
}
