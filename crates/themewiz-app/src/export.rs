use anyhow::{Context, Result};
use themewiz_core::descriptor::ThemeDescriptor;
use themewiz_core::time::now_utc_rfc3339;

use crate::Wizard;

impl Wizard<'_> {
    pub fn descriptor(&self) -> Result<ThemeDescriptor> {
        let generated_at = now_utc_rfc3339().context("failed to format export timestamp")?;
        Ok(ThemeDescriptor::from_state(self.state(), generated_at))
    }

    pub fn export_json(&self) -> Result<String> {
        self.descriptor()?
            .to_json_pretty()
            .context("failed to serialize theme descriptor")
    }
}

#[cfg(test)]
mod tests {
    use themewiz_core::session::MemorySessionStore;
    use themewiz_core::step::WizardPath;

    use crate::{SaveTiming, Wizard};

    #[test]
    fn export_json_reflects_flags_and_theme() {
        let sessions = MemorySessionStore::new();
        let mut wizard = Wizard::new(&sessions, SaveTiming::immediate());
        wizard.set_has_fonts(true).expect("fonts flag");
        wizard.set_path(Some(WizardPath::A)).expect("path");
        wizard.set_metadata("tone", "playful").expect("meta");

        let json: serde_json::Value =
            serde_json::from_str(&wizard.export_json().expect("export")).expect("parse");
        assert_eq!(json["path"], "A");
        assert_eq!(json["hasFonts"], true);
        assert_eq!(json["metadata"]["tone"], "playful");
        assert!(json["generatedAt"].as_str().is_some_and(|value| value.ends_with('Z')));
    }
}
