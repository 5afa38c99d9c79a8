use std::env;
use std::fmt;
use std::path::Path;

use crate::config::{GeneratorConfig, load_config};
use crate::order::ordering_is_consistent;
use crate::registry::StepRegistry;
use crate::session::{FileSessionStore, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|check| check.state == CheckState::Fail)
    }

    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

/// Checks the config file, the saved session and the generator program.
pub fn run_doctor(config_path: &Path, session_path: &Path) -> DoctorReport {
    let mut checks = Vec::new();
    let mut generator = None;

    if config_path.exists() {
        checks.push(pass_check(
            "config file",
            format!("found at {}", config_path.display()),
        ));

        match load_config(config_path) {
            Ok(config) => {
                checks.push(pass_check("config parses and validates", "config is valid"));
                generator = config.generator;
            }
            Err(error) => {
                checks.push(fail_check("config parses and validates", error.to_string()));
            }
        }
    } else {
        checks.push(pass_check(
            "config file",
            format!("not found at {}, using defaults", config_path.display()),
        ));
    }

    checks.extend(check_session(session_path));
    checks.push(check_generator(generator.as_ref()));

    DoctorReport { checks }
}

fn check_session(session_path: &Path) -> Vec<DoctorCheck> {
    let store = FileSessionStore::new(session_path);
    let snapshot = match store.load() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            return vec![pass_check(
                "session file",
                format!("no saved session at {}", session_path.display()),
            )];
        }
        Err(error) => {
            return vec![
                fail_check("session file", error.to_string()),
                skipped_check("session step order", "session file is unreadable"),
            ];
        }
    };

    let mut checks = vec![pass_check(
        "session file",
        format!(
            "saved at {} on step {}",
            snapshot.saved_at, snapshot.current_step
        ),
    )];

    let restored = snapshot.rehydrate(StepRegistry::standard());
    let state = restored.state();
    checks.push(
        if !ordering_is_consistent(&state.flags, &state.step_sequence) {
            fail_check(
                "session step order",
                "visible steps do not match the saved choices",
            )
        } else if state.current_step != snapshot.current_step {
            fail_check(
                "session step order",
                format!(
                    "saved step {} is not reachable; resuming at {}",
                    snapshot.current_step, state.current_step
                ),
            )
        } else {
            pass_check(
                "session step order",
                format!("{} visible steps", state.step_sequence.len()),
            )
        },
    );

    checks
}

fn check_generator(generator: Option<&GeneratorConfig>) -> DoctorCheck {
    let Some(generator) = generator else {
        return pass_check("generator program", "no generator configured");
    };

    if is_executable_in_path(&generator.program) {
        pass_check(
            "generator program",
            format!("'{}' found", generator.program),
        )
    } else {
        fail_check(
            "generator program",
            format!("'{}' not found in PATH", generator.program),
        )
    }
}

fn pass_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: details.into(),
    }
}

fn skipped_check(name: &str, reason: &str) -> DoctorCheck {
    fail_check(name, format!("skipped because {reason}"))
}

fn is_executable_in_path(program: &str) -> bool {
    let program_path = Path::new(program);

    if program_path.is_absolute() || program.contains('/') {
        return is_executable_file(program_path);
    }

    let path_value = match env::var_os("PATH") {
        Some(value) => value,
        None => return false,
    };

    env::split_paths(&path_value)
        .map(|directory| directory.join(program))
        .any(|candidate| is_executable_file(&candidate))
}

fn is_executable_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match path.metadata() {
            Ok(metadata) => metadata.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::session::SessionSnapshot;
    use crate::state::{WizardAction, WizardStore};
    use crate::step::{StepId, WizardPath};

    fn check<'a>(report: &'a DoctorReport, name: &str) -> &'a DoctorCheck {
        report
            .checks
            .iter()
            .find(|check| check.name == name)
            .unwrap_or_else(|| panic!("missing check {name}"))
    }

    #[test]
    fn missing_config_and_session_pass() {
        let temp = tempfile::tempdir().expect("temp dir");
        let report = run_doctor(
            &temp.path().join("config.toml"),
            &temp.path().join("session.toml"),
        );

        assert!(!report.has_failures(), "{report:?}");
        assert!(check(&report, "config file").details.contains("using defaults"));
        assert_eq!(
            check(&report, "generator program").details,
            "no generator configured"
        );
    }

    #[test]
    fn invalid_config_fails() {
        let temp = tempfile::tempdir().expect("temp dir");
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "version = 9\n").expect("write config");

        let report = run_doctor(&config_path, &temp.path().join("session.toml"));
        assert_eq!(
            check(&report, "config parses and validates").state,
            CheckState::Fail
        );
    }

    #[test]
    fn missing_generator_program_fails() {
        let temp = tempfile::tempdir().expect("temp dir");
        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            "version = 1\n\n[generator]\nprogram = \"themewiz-missing-generator\"\n",
        )
        .expect("write config");

        let report = run_doctor(&config_path, &temp.path().join("session.toml"));
        assert_eq!(check(&report, "generator program").state, CheckState::Fail);
    }

    #[test]
    fn saved_session_is_checked_for_reachability() {
        let temp = tempfile::tempdir().expect("temp dir");
        let session_path = temp.path().join("session.toml");

        let mut store = WizardStore::default();
        store
            .dispatch(WizardAction::SetPath(Some(WizardPath::B)))
            .expect("path");
        let mut snapshot = SessionSnapshot::capture(store.state(), "t".to_string());
        FileSessionStore::new(&session_path)
            .save(&snapshot)
            .expect("save");

        let report = run_doctor(&temp.path().join("config.toml"), &session_path);
        assert_eq!(check(&report, "session step order").state, CheckState::Pass);

        snapshot.current_step = StepId::Logo;
        FileSessionStore::new(&session_path)
            .save(&snapshot)
            .expect("save");
        let report = run_doctor(&temp.path().join("config.toml"), &session_path);
        let order = check(&report, "session step order");
        assert_eq!(order.state, CheckState::Fail);
        assert!(order.details.contains("not reachable"));
    }

    #[test]
    fn unreadable_session_skips_order_check() {
        let temp = tempfile::tempdir().expect("temp dir");
        let session_path = temp.path().join("session.toml");
        fs::write(&session_path, "not toml at all [").expect("write session");

        let report = run_doctor(&temp.path().join("config.toml"), &session_path);
        assert_eq!(check(&report, "session file").state, CheckState::Fail);
        assert!(
            check(&report, "session step order")
                .details
                .starts_with("skipped because")
        );
    }

    #[test]
    fn doctor_summary_counts_pass_and_fail() {
        let report = DoctorReport {
            checks: vec![
                pass_check("a", "ok"),
                fail_check("b", "no"),
                pass_check("c", "ok"),
            ],
        };

        assert_eq!(report.summary(), "2 passed, 1 failed");
        assert!(report.has_failures());
        assert_eq!(CheckState::Fail.to_string(), "FAIL");
    }
}
