use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use themewiz_app::GenerationTarget;
use themewiz_core::step::{StepId, WizardPath};

#[derive(Debug, Parser)]
#[command(name = "themewiz")]
#[command(bin_name = "themewiz")]
#[command(version)]
#[command(about = "Step-by-step theme setup wizard")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Write a debug log to ~/.config/themewiz/diagnostics
    #[arg(long, global = true)]
    pub diagnostics: bool,

    /// Session file to use instead of the configured one
    #[arg(long, global = true, value_name = "FILE")]
    pub session: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Show the current step and the visible sequence")]
    Status,
    #[command(about = "Answer the welcome questions")]
    Start(StartArgs),
    #[command(about = "Change one of the welcome answers")]
    Set {
        #[arg(value_enum)]
        flag: FlagName,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    #[command(about = "Advance to the next step")]
    Next,
    #[command(about = "Go back one step")]
    Back,
    #[command(about = "Jump to a step that was already reached")]
    Jump { step: StepId },
    #[command(about = "Mark a step as completed")]
    Complete { step: StepId },
    #[command(about = "Clear a step's completed mark")]
    Uncomplete { step: StepId },
    #[command(about = "Edit the theme being built")]
    Theme(ThemeArgs),
    #[command(about = "Ask the configured generator for colours or fonts")]
    Generate { target: GenerationTarget },
    #[command(about = "Write the theme descriptor as JSON")]
    Export {
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    #[command(about = "Forget the saved session and start over")]
    Reset,
    #[command(about = "Run environment and configuration checks")]
    Doctor,
}

#[derive(Debug, Args)]
pub struct StartArgs {
    #[arg(long, value_name = "A|B")]
    pub path: WizardPath,
    #[arg(long)]
    pub logo: bool,
    #[arg(long)]
    pub colours: bool,
    #[arg(long)]
    pub fonts: bool,
    #[arg(long)]
    pub brand_guide: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagName {
    Logo,
    Colours,
    Fonts,
    BrandGuide,
}

#[derive(Debug, Default, Args)]
pub struct ThemeArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub logo: Option<String>,
    #[arg(long)]
    pub brand_guide: Option<String>,
    /// NAME=HEX, repeatable
    #[arg(long = "colour", value_name = "NAME=HEX")]
    pub colours: Vec<String>,
    #[arg(long, requires = "body_font")]
    pub heading_font: Option<String>,
    #[arg(long, requires = "heading_font")]
    pub body_font: Option<String>,
    #[arg(long)]
    pub icons: Option<String>,
    #[arg(long)]
    pub business: Option<String>,
    /// KEY=VALUE, repeatable
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,
}
