use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::StepRegistry;
use crate::state::{WizardAction, WizardState, WizardStore};
use crate::step::{StepId, WizardFlags};
use crate::theme::{ThemeData, ThemeUpdate};
use crate::time::now_utc_rfc3339;

pub const SESSION_VERSION: i64 = 1;

/// Persisted mirror of the wizard: flags, position, progress and theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: i64,
    pub saved_at: String,
    pub current_step: StepId,
    #[serde(default)]
    pub completed_steps: Vec<StepId>,
    #[serde(default)]
    pub visited_steps: Vec<StepId>,
    #[serde(default)]
    pub step_history: Vec<StepId>,
    #[serde(default)]
    pub flags: WizardFlags,
    #[serde(default)]
    pub theme: ThemeData,
}

impl SessionSnapshot {
    pub fn capture(state: &WizardState, saved_at: String) -> Self {
        Self {
            version: SESSION_VERSION,
            saved_at,
            current_step: state.current_step,
            completed_steps: state.completed_steps.clone(),
            visited_steps: state.visited_steps.clone(),
            step_history: state.step_history.clone(),
            flags: state.flags,
            theme: state.theme.clone(),
        }
    }

    pub fn capture_now(state: &WizardState) -> Result<Self, SessionError> {
        Ok(Self::capture(state, now_utc_rfc3339()?))
    }

    /// Replays the snapshot into a fresh store as a sequence of dispatches.
    ///
    /// A saved step that is no longer reachable leaves the store on the step
    /// the derivation pass anchored it to.
    pub fn rehydrate(&self, registry: StepRegistry) -> WizardStore {
        let mut store = WizardStore::new(registry);

        let actions = [
            WizardAction::SetHasBrandGuide(self.flags.has_brand_guide),
            WizardAction::SetHasLogo(self.flags.has_logo),
            WizardAction::SetHasColours(self.flags.has_colours),
            WizardAction::SetHasFonts(self.flags.has_fonts),
            WizardAction::SetPath(self.flags.path),
            WizardAction::UpdateTheme(ThemeUpdate::replace_all(self.theme.clone())),
            WizardAction::JumpToStep(self.current_step),
            WizardAction::RestoreProgress {
                completed: self.completed_steps.clone(),
                visited: self.visited_steps.clone(),
                history: self.step_history.clone(),
            },
        ];

        for action in actions {
            let name = action.name();
            if let Err(error) = store.dispatch(action) {
                tracing::warn!(action = name, %error, "could not replay saved session step");
            }
        }

        store
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not resolve home directory for session path")]
    HomeDirectoryUnavailable,
    #[error("failed to read session at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse session at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write session at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to format session timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("unsupported session version at {path} (expected {expected}, found {found})")]
    UnsupportedVersion {
        path: PathBuf,
        expected: i64,
        found: i64,
    },
}

pub trait SessionStore {
    fn load(&self) -> Result<Option<SessionSnapshot>, SessionError>;
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

pub fn resolve_session_path() -> Result<PathBuf, SessionError> {
    crate::config::resolve_config_dir()
        .map(|dir| dir.join("session.toml"))
        .ok_or(SessionError::HomeDirectoryUnavailable)
}

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionSnapshot>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| SessionError::Read {
            path: self.path.clone(),
            source,
        })?;

        let snapshot: SessionSnapshot =
            toml::from_str(&raw).map_err(|source| SessionError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if snapshot.version != SESSION_VERSION {
            return Err(SessionError::UnsupportedVersion {
                path: self.path.clone(),
                expected: SESSION_VERSION,
                found: snapshot.version,
            });
        }

        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SessionError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let serialized = toml::to_string(snapshot)?;
        fs::write(&self.path, serialized).map_err(|source| SessionError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), step = %snapshot.current_step, "saved session");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// In-process store; keeps the last saved snapshot and counts saves.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    snapshot: Mutex<Option<SessionSnapshot>>,
    saves: Mutex<usize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn save_count(&self) -> usize {
        *self
            .saves
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionSnapshot>, SessionError> {
        Ok(self.snapshot())
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SessionError> {
        *self
            .snapshot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(snapshot.clone());
        *self
            .saves
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self
            .snapshot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::WizardPath;
    use crate::theme::Colour;

    fn progressed_store() -> WizardStore {
        let mut store = WizardStore::default();
        store.dispatch(WizardAction::SetHasLogo(true)).expect("logo");
        store.dispatch(WizardAction::SetHasColours(true)).expect("colours");
        store
            .dispatch(WizardAction::SetPath(Some(WizardPath::B)))
            .expect("path");
        store
            .dispatch(WizardAction::UpdateTheme(ThemeUpdate {
                name: Some(Some("Acme".to_string())),
                colours: Some(vec![Colour {
                    name: "primary".to_string(),
                    hex: "#112233".to_string(),
                }]),
                ..ThemeUpdate::default()
            }))
            .expect("theme");
        store.dispatch(WizardAction::NextStep).expect("logo step");
        store.dispatch(WizardAction::NextStep).expect("colours step");
        store
    }

    #[test]
    fn rehydrate_restores_position_flags_progress_and_theme() {
        let store = progressed_store();
        let snapshot = SessionSnapshot::capture(store.state(), "2026-01-01T00:00:00Z".to_string());

        let restored = snapshot.rehydrate(StepRegistry::standard());
        assert_eq!(restored.state(), store.state());
    }

    #[test]
    fn rehydrate_anchors_unreachable_step() {
        let store = progressed_store();
        let mut snapshot =
            SessionSnapshot::capture(store.state(), "2026-01-01T00:00:00Z".to_string());
        snapshot.current_step = StepId::BrandGuide;

        let restored = snapshot.rehydrate(StepRegistry::standard());
        assert_eq!(restored.state().current_step, StepId::Welcome);
        assert_eq!(restored.state().flags, store.state().flags);
    }

    #[test]
    fn file_store_round_trips_snapshot() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = FileSessionStore::new(temp.path().join("nested").join("session.toml"));
        assert_eq!(store.load().expect("load missing"), None);

        let snapshot = SessionSnapshot::capture(
            progressed_store().state(),
            "2026-01-01T00:00:00Z".to_string(),
        );
        store.save(&snapshot).expect("save");
        assert_eq!(store.load().expect("load"), Some(snapshot));

        store.clear().expect("clear");
        store.clear().expect("clear twice");
        assert_eq!(store.load().expect("load cleared"), None);
    }

    #[test]
    fn file_store_rejects_unsupported_version() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("session.toml");
        fs::write(
            &path,
            "version = 7\nsaved_at = \"x\"\ncurrent_step = \"welcome\"\n",
        )
        .expect("write");

        let error = FileSessionStore::new(&path)
            .load()
            .expect_err("should fail");
        assert!(error.to_string().contains("unsupported session version"));
    }

    #[test]
    fn file_store_reports_parse_errors_with_path() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("session.toml");
        fs::write(&path, "current_step = 12").expect("write");

        let error = FileSessionStore::new(&path)
            .load()
            .expect_err("should fail");
        assert!(matches!(error, SessionError::Parse { .. }));
        assert!(error.to_string().contains("session.toml"));
    }

    #[test]
    fn memory_store_counts_saves() {
        let store = MemorySessionStore::new();
        let snapshot = SessionSnapshot::capture(&WizardState::default(), "t".to_string());
        store.save(&snapshot).expect("save");
        store.save(&snapshot).expect("save");
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load().expect("load"), Some(snapshot));
    }
}
