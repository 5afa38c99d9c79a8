use crate::state::WizardState;
use crate::step::{StepId, WizardFlags};

pub type ApplicabilityPredicate = fn(&WizardFlags) -> bool;
pub type AdvancePredicate = fn(&WizardState) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct StepConfig {
    pub id: StepId,
    pub title: &'static str,
    pub is_applicable: ApplicabilityPredicate,
    pub can_advance: AdvancePredicate,
}

/// Static table of steps handed to the order manager and the reducer.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    configs: Vec<StepConfig>,
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl StepRegistry {
    pub fn new(configs: Vec<StepConfig>) -> Self {
        Self { configs }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            StepConfig {
                id: StepId::Welcome,
                title: "Welcome",
                is_applicable: always,
                can_advance: |state| state.flags.path.is_some(),
            },
            StepConfig {
                id: StepId::BrandGuide,
                title: "Brand guide",
                is_applicable: |flags| flags.path.is_some() && flags.has_brand_guide,
                can_advance: |state| has_text(&state.theme.brand_guide),
            },
            StepConfig {
                id: StepId::Logo,
                title: "Logo",
                is_applicable: |flags| flags.path.is_some() && flags.has_logo,
                can_advance: |state| has_text(&state.theme.logo),
            },
            StepConfig {
                id: StepId::Colours,
                title: "Colours",
                is_applicable: path_chosen,
                can_advance: |state| !state.theme.colours.is_empty(),
            },
            StepConfig {
                id: StepId::Fonts,
                title: "Fonts",
                is_applicable: path_chosen,
                can_advance: |state| state.theme.fonts.is_some(),
            },
            StepConfig {
                id: StepId::BusinessQuestion,
                title: "About your business",
                is_applicable: path_chosen,
                can_advance: |state| has_text(&state.theme.business),
            },
            StepConfig {
                id: StepId::Icons,
                title: "Icons",
                is_applicable: path_chosen,
                can_advance: |state| has_text(&state.theme.icons),
            },
            StepConfig {
                id: StepId::Review,
                title: "Review",
                is_applicable: path_chosen,
                can_advance: never,
            },
        ])
    }

    pub fn get(&self, id: StepId) -> Option<&StepConfig> {
        self.configs.iter().find(|config| config.id == id)
    }

    pub fn title(&self, id: StepId) -> &'static str {
        self.get(id).map(|config| config.title).unwrap_or("Unknown step")
    }

    /// Steps missing from the registry are never applicable.
    pub fn is_applicable(&self, id: StepId, flags: &WizardFlags) -> bool {
        self.get(id)
            .is_some_and(|config| (config.is_applicable)(flags))
    }

    pub fn can_advance(&self, id: StepId, state: &WizardState) -> bool {
        self.get(id).is_some_and(|config| (config.can_advance)(state))
    }
}

fn always(_flags: &WizardFlags) -> bool {
    true
}

fn never(_state: &WizardState) -> bool {
    false
}

fn path_chosen(flags: &WizardFlags) -> bool {
    flags.path.is_some()
}

fn has_text(value: &Option<String>) -> bool {
    value
        .as_deref()
        .is_some_and(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::WizardPath;

    #[test]
    fn standard_registry_covers_every_step() {
        let registry = StepRegistry::standard();
        for step in StepId::ALL {
            assert!(registry.get(step).is_some(), "missing config for {step}");
        }
        assert_eq!(registry.title(StepId::BusinessQuestion), "About your business");
    }

    #[test]
    fn only_welcome_is_applicable_without_a_path() {
        let registry = StepRegistry::standard();
        let flags = WizardFlags {
            has_logo: true,
            has_brand_guide: true,
            ..WizardFlags::default()
        };

        let applicable: Vec<_> = StepId::ALL
            .into_iter()
            .filter(|step| registry.is_applicable(*step, &flags))
            .collect();
        assert_eq!(applicable, vec![StepId::Welcome]);
    }

    #[test]
    fn asset_steps_follow_their_flags() {
        let registry = StepRegistry::standard();
        let flags = WizardFlags {
            path: Some(WizardPath::A),
            has_brand_guide: true,
            ..WizardFlags::default()
        };

        assert!(registry.is_applicable(StepId::BrandGuide, &flags));
        assert!(!registry.is_applicable(StepId::Logo, &flags));
    }

    #[test]
    fn can_advance_checks_theme_content() {
        let registry = StepRegistry::standard();
        let mut state = WizardState::default();
        assert!(!registry.can_advance(StepId::Welcome, &state));
        assert!(!registry.can_advance(StepId::Logo, &state));

        state.flags.path = Some(WizardPath::B);
        state.theme.logo = Some("logo.svg".to_string());
        assert!(registry.can_advance(StepId::Welcome, &state));
        assert!(registry.can_advance(StepId::Logo, &state));
        assert!(!registry.can_advance(StepId::Review, &state));
    }

    #[test]
    fn empty_registry_hides_everything() {
        let registry = StepRegistry::new(Vec::new());
        assert!(!registry.is_applicable(StepId::Welcome, &WizardFlags::default()));
    }
}
