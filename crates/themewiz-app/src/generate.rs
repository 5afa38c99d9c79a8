use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use themewiz_core::command_runner::CommandRunner;
use themewiz_core::config::GeneratorConfig;
use themewiz_core::theme::{Colour, FontPair, ThemeData, ThemeUpdate, parse_colour};

use crate::Wizard;

pub const EXPLANATION_METADATA_KEY: &str = "generation.explanation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationTarget {
    Colours,
    Fonts,
    All,
}

impl GenerationTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Colours => "colours",
            Self::Fonts => "fonts",
            Self::All => "all",
        }
    }

    fn wants_colours(self) -> bool {
        matches!(self, Self::Colours | Self::All)
    }

    fn wants_fonts(self) -> bool {
        matches!(self, Self::Fonts | Self::All)
    }
}

impl fmt::Display for GenerationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationTarget {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "colours" | "colors" => Ok(Self::Colours),
            "fonts" => Ok(Self::Fonts),
            "all" => Ok(Self::All),
            other => bail!("unknown generation target '{other}' (expected colours, fonts or all)"),
        }
    }
}

/// Suggestions returned by a generator backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub colors: Option<Vec<Colour>>,
    #[serde(default)]
    pub fonts: Option<FontPair>,
    #[serde(default)]
    pub explanation: Option<String>,
}

pub trait ThemeGenerator {
    fn generate(&self, theme: &ThemeData, target: GenerationTarget) -> Result<GenerationResponse>;
}

/// Runs an external program: theme JSON on stdin, target as the last
/// argument, response JSON on stdout.
pub struct CommandGenerator<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
    args: Vec<String>,
}

impl<'a> CommandGenerator<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            args,
        }
    }

    pub fn from_config(runner: &'a dyn CommandRunner, config: &GeneratorConfig) -> Self {
        Self::new(runner, config.program.clone(), config.args.clone())
    }
}

impl ThemeGenerator for CommandGenerator<'_> {
    fn generate(&self, theme: &ThemeData, target: GenerationTarget) -> Result<GenerationResponse> {
        let input = serde_json::to_string(theme).context("failed to serialize theme")?;

        let mut args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        args.push(target.as_str());

        let output = self.runner.run(&self.program, &args, Some(&input))?;
        if !output.success() {
            bail!(
                "{} exited with status {}: {}",
                self.program,
                output.status_code,
                output.stderr.trim()
            );
        }

        serde_json::from_str(output.stdout.trim())
            .with_context(|| format!("{} returned invalid JSON", self.program))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.backoff_ms),
        }
    }

    fn backoff_for(&self, failed_attempts: u32) -> Duration {
        let factor = 2u32.saturating_pow(failed_attempts.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

/// Calls `generator` until it succeeds or the attempt budget runs out,
/// doubling the pause after each failure.
pub fn generate_with_retry(
    generator: &dyn ThemeGenerator,
    theme: &ThemeData,
    target: GenerationTarget,
    policy: RetryPolicy,
    sleep: &mut dyn FnMut(Duration),
) -> Result<GenerationResponse> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match generator.generate(theme, target) {
            Ok(response) => return Ok(response),
            Err(error) if attempt < max_attempts => {
                let backoff = policy.backoff_for(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %format!("{error:#}"),
                    "theme generation failed; retrying"
                );
                sleep(backoff);
                attempt += 1;
            }
            Err(error) => {
                return Err(error.context(format!(
                    "theme generation failed after {attempt} attempt(s)"
                )));
            }
        }
    }
}

impl Wizard<'_> {
    /// Merges a generator response into the theme. Only the parts asked for
    /// by `target` are applied; colours are validated before anything changes.
    pub fn apply_generation(
        &mut self,
        target: GenerationTarget,
        response: GenerationResponse,
    ) -> Result<ThemeUpdate> {
        let mut update = ThemeUpdate::default();

        if let Some(colours) = response.colors.filter(|_| target.wants_colours()) {
            let colours = colours
                .iter()
                .map(|colour| parse_colour(&colour.name, &colour.hex))
                .collect::<Result<Vec<_>, _>>()
                .context("generator returned an invalid colour")?;
            update.colours = Some(colours);
        }

        if let Some(fonts) = response.fonts.filter(|_| target.wants_fonts()) {
            update.fonts = Some(Some(fonts));
        }

        if let Some(explanation) = response.explanation.filter(|text| !text.trim().is_empty()) {
            let mut metadata = self.theme().metadata.clone();
            metadata.insert(EXPLANATION_METADATA_KEY.to_string(), explanation);
            update.metadata = Some(metadata);
        }

        self.update_theme(update.clone())?;
        tracing::debug!(generation = %target, "applied generated theme suggestions");
        Ok(update)
    }
}
