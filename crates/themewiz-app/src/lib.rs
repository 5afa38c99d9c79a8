mod export;
pub mod generate;
mod navigation;
pub mod persistence;
mod theme;

use anyhow::{Context, Result};
use themewiz_core::registry::StepRegistry;
use themewiz_core::session::{SessionSnapshot, SessionStore};
use themewiz_core::state::{WizardAction, WizardState, WizardStore};

pub use generate::{
    CommandGenerator, GenerationResponse, GenerationTarget, RetryPolicy, ThemeGenerator,
};
pub use navigation::{NavigationError, StepView};
pub use persistence::{ChangeKind, SaveScheduler, SaveTiming};

/// Navigation facade: the store, the session mirror and the save schedule.
pub struct Wizard<'a> {
    store: WizardStore,
    sessions: &'a dyn SessionStore,
    saves: SaveScheduler,
}

impl<'a> Wizard<'a> {
    pub fn new(sessions: &'a dyn SessionStore, timing: SaveTiming) -> Self {
        Self {
            store: WizardStore::new(StepRegistry::standard()),
            sessions,
            saves: SaveScheduler::new(timing),
        }
    }

    /// Rehydrates from the saved session when one exists.
    pub fn open(sessions: &'a dyn SessionStore, timing: SaveTiming) -> Result<Self> {
        let snapshot = sessions.load().context("failed to load saved wizard session")?;

        let store = match snapshot {
            Some(snapshot) => {
                tracing::debug!(
                    saved_at = %snapshot.saved_at,
                    step = %snapshot.current_step,
                    "rehydrating wizard session"
                );
                let store = snapshot.rehydrate(StepRegistry::standard());
                if store.state().current_step != snapshot.current_step {
                    tracing::warn!(
                        saved = %snapshot.current_step,
                        resumed = %store.state().current_step,
                        "saved step is no longer reachable"
                    );
                }
                store
            }
            None => WizardStore::new(StepRegistry::standard()),
        };

        Ok(Self {
            store,
            sessions,
            saves: SaveScheduler::new(timing),
        })
    }

    pub fn state(&self) -> &WizardState {
        self.store.state()
    }

    pub fn registry(&self) -> &StepRegistry {
        self.store.registry()
    }

    pub fn save_pending(&self) -> bool {
        self.saves.is_pending()
    }

    /// Saves now if a save is pending. Returns whether anything was written.
    pub fn flush(&mut self) -> Result<bool> {
        if !self.saves.is_pending() {
            return Ok(false);
        }
        self.save_now()?;
        Ok(true)
    }

    /// Saves if the pending save's deadline has passed.
    pub fn poll_save(&mut self, now: std::time::Instant) -> Result<bool> {
        if !self.saves.is_due(now) {
            return Ok(false);
        }
        self.save_now()?;
        Ok(true)
    }

    fn save_now(&mut self) -> Result<()> {
        let snapshot = SessionSnapshot::capture_now(self.store.state())
            .context("failed to capture wizard session")?;
        self.sessions
            .save(&snapshot)
            .context("failed to save wizard session")?;
        self.saves.clear();
        Ok(())
    }

    /// Returns to the initial state and forgets the saved session.
    pub fn reset(&mut self) -> Result<()> {
        self.store.dispatch(WizardAction::Reset)?;
        self.saves.clear();
        self.sessions
            .clear()
            .context("failed to clear saved wizard session")?;
        tracing::debug!("wizard reset");
        Ok(())
    }
}
