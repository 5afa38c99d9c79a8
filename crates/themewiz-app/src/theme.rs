use themewiz_core::state::WizardAction;
use themewiz_core::theme::{Colour, FontPair, ThemeData, ThemeUpdate};

use crate::Wizard;
use crate::navigation::NavigationError;
use crate::persistence::ChangeKind;

impl Wizard<'_> {
    pub fn theme(&self) -> &ThemeData {
        &self.state().theme
    }

    /// Shallow-merges `update` into the theme; empty updates are ignored.
    pub fn update_theme(&mut self, update: ThemeUpdate) -> Result<(), NavigationError> {
        if update.is_empty() {
            return Ok(());
        }
        self.apply(WizardAction::UpdateTheme(update), ChangeKind::Theme)
    }

    pub fn set_logo(&mut self, logo: Option<String>) -> Result<(), NavigationError> {
        self.update_theme(ThemeUpdate {
            logo: Some(logo),
            ..ThemeUpdate::default()
        })
    }

    pub fn set_fonts(&mut self, fonts: FontPair) -> Result<(), NavigationError> {
        self.update_theme(ThemeUpdate {
            fonts: Some(Some(fonts)),
            ..ThemeUpdate::default()
        })
    }

    /// Adds `colour`, replacing an existing colour with the same name.
    pub fn upsert_colour(&mut self, colour: Colour) -> Result<(), NavigationError> {
        let mut colours = self.theme().colours.clone();
        match colours.iter_mut().find(|existing| existing.name == colour.name) {
            Some(existing) => *existing = colour,
            None => colours.push(colour),
        }

        self.update_theme(ThemeUpdate {
            colours: Some(colours),
            ..ThemeUpdate::default()
        })
    }

    pub fn set_metadata(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), NavigationError> {
        let mut metadata = self.theme().metadata.clone();
        metadata.insert(key.into(), value.into());

        self.update_theme(ThemeUpdate {
            metadata: Some(metadata),
            ..ThemeUpdate::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use themewiz_core::session::MemorySessionStore;
    use themewiz_core::step::StepId;

    use super::*;
    use crate::SaveTiming;

    fn colour(name: &str, hex: &str) -> Colour {
        Colour {
            name: name.to_string(),
            hex: hex.to_string(),
        }
    }

    #[test]
    fn upsert_colour_replaces_by_name() {
        let sessions = MemorySessionStore::new();
        let mut wizard = Wizard::new(&sessions, SaveTiming::immediate());

        wizard.upsert_colour(colour("primary", "#000")).expect("add");
        wizard.upsert_colour(colour("accent", "#fff")).expect("add");
        wizard.upsert_colour(colour("primary", "#123456")).expect("replace");

        assert_eq!(
            wizard.theme().colours,
            vec![colour("primary", "#123456"), colour("accent", "#fff")]
        );
    }

    #[test]
    fn metadata_and_logo_updates_keep_other_fields() {
        let sessions = MemorySessionStore::new();
        let mut wizard = Wizard::new(&sessions, SaveTiming::immediate());

        wizard.set_metadata("tone", "warm").expect("meta");
        wizard.set_metadata("audience", "families").expect("meta");
        wizard.set_logo(Some("logo.svg".to_string())).expect("logo");

        let theme = wizard.theme();
        assert_eq!(theme.metadata.len(), 2);
        assert_eq!(theme.logo.as_deref(), Some("logo.svg"));
        assert_eq!(wizard.current_step(), StepId::Welcome);

        wizard.set_logo(None).expect("clear logo");
        assert_eq!(wizard.theme().logo, None);
    }

    #[test]
    fn empty_update_schedules_nothing() {
        let sessions = MemorySessionStore::new();
        let mut wizard = Wizard::new(&sessions, SaveTiming::immediate());
        wizard.update_theme(ThemeUpdate::default()).expect("noop");
        assert!(!wizard.save_pending());

        wizard
            .set_fonts(FontPair {
                heading: "Inter".to_string(),
                body: "Lora".to_string(),
            })
            .expect("fonts");
        assert!(wizard.save_pending());
    }
}
