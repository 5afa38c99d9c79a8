use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, ContentArrangement, Table};
use themewiz_app::generate::{EXPLANATION_METADATA_KEY, generate_with_retry};
use themewiz_app::{CommandGenerator, RetryPolicy, SaveTiming, Wizard};
use themewiz_core::command_runner::CommandRunner;
use themewiz_core::config::{ThemewizConfig, load_config_or_default, resolve_config_path};
use themewiz_core::doctor::{DoctorReport, run_doctor};
use themewiz_core::session::{FileSessionStore, SessionStore, resolve_session_path};
use themewiz_core::step::StepId;
use themewiz_core::theme::{
    ThemeUpdate, parse_colour_assignment, parse_font_pair, parse_metadata_assignment,
};

use crate::cli::{Cli, Command, FlagName, StartArgs, ThemeArgs};

/// Where the run reads its config and session from.
pub struct Paths {
    pub config: PathBuf,
    pub session: PathBuf,
}

/// `doctor` and `reset` never load the wizard, so a broken config or session
/// file cannot block them.
pub fn run_with_deps(cli: Cli, runner: &dyn CommandRunner) -> Result<()> {
    let config_path = resolve_config_path()?;

    match cli.command {
        Command::Doctor => {
            let session = session_path_without_config(cli.session, &config_path)?;
            run_doctor_command(&Paths {
                config: config_path,
                session,
            })
        }
        Command::Reset => {
            let session = session_path_without_config(cli.session, &config_path)?;
            FileSessionStore::new(&session)
                .clear()
                .context("failed to clear saved wizard session")?;
            println!("Session cleared");
            Ok(())
        }
        command => {
            let config = load_config_or_default(&config_path)?;
            let session = match cli.session.or_else(|| config.session.file.clone()) {
                Some(path) => path,
                None => resolve_session_path().context("failed to resolve session path")?,
            };
            let paths = Paths {
                config: config_path,
                session,
            };
            let sessions = FileSessionStore::new(&paths.session);
            run_wizard_command(command, &sessions, &config, &paths, runner)
        }
    }
}

/// `--session`, then the configured file if the config still loads, then the
/// default location.
fn session_path_without_config(
    cli_session: Option<PathBuf>,
    config_path: &Path,
) -> Result<PathBuf> {
    if let Some(path) = cli_session {
        return Ok(path);
    }

    let configured = match load_config_or_default(config_path) {
        Ok(config) => config.session.file,
        Err(error) => {
            tracing::debug!(%error, "ignoring unreadable config when resolving session path");
            None
        }
    };

    match configured {
        Some(path) => Ok(path),
        None => resolve_session_path().context("failed to resolve session path"),
    }
}

fn run_wizard_command(
    command: Command,
    sessions: &FileSessionStore,
    config: &ThemewizConfig,
    paths: &Paths,
    runner: &dyn CommandRunner,
) -> Result<()> {
    let mut wizard = Wizard::open(sessions, SaveTiming::from_config(&config.session))?;

    match command {
        Command::Status => print_status(&wizard),
        Command::Start(args) => run_start(&mut wizard, args)?,
        Command::Set { flag, value } => {
            match flag {
                FlagName::Logo => wizard.set_has_logo(value)?,
                FlagName::Colours => wizard.set_has_colours(value)?,
                FlagName::Fonts => wizard.set_has_fonts(value)?,
                FlagName::BrandGuide => wizard.set_has_brand_guide(value)?,
            }
            print_position(&wizard);
        }
        Command::Next => {
            wizard.next()?;
            print_position(&wizard);
        }
        Command::Back => {
            wizard.previous()?;
            print_position(&wizard);
        }
        Command::Jump { step } => {
            wizard.jump_to(step)?;
            print_position(&wizard);
        }
        Command::Complete { step } => {
            wizard.complete_step(step)?;
            println!("Marked {} as completed", wizard.step_title(step));
        }
        Command::Uncomplete { step } => {
            wizard.uncomplete_step(step)?;
            println!("Cleared completion of {}", wizard.step_title(step));
        }
        Command::Theme(args) => run_theme(&mut wizard, args)?,
        Command::Generate { target } => {
            let generator_config = config.generator.as_ref().ok_or_else(|| {
                anyhow!(
                    "no generator configured; add a [generator] section to {}",
                    paths.config.display()
                )
            })?;
            let generator = CommandGenerator::from_config(runner, generator_config);
            let response = generate_with_retry(
                &generator,
                wizard.theme(),
                target,
                RetryPolicy::from_config(generator_config),
                &mut std::thread::sleep,
            )?;
            let update = wizard.apply_generation(target, response)?;

            println!(
                "Applied generated {target}: {} colour(s), fonts {}",
                update.colours.as_ref().map_or(0, Vec::len),
                if matches!(update.fonts, Some(Some(_))) { "updated" } else { "unchanged" }
            );
            if let Some(explanation) = wizard.theme().metadata.get(EXPLANATION_METADATA_KEY) {
                println!("{explanation}");
            }
        }
        Command::Export { output } => {
            let json = wizard.export_json()?;
            match output {
                Some(path) => {
                    write_export(&path, &json)?;
                    println!("Wrote theme descriptor to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        // Run without a session in run_with_deps.
        Command::Doctor | Command::Reset => {}
    }

    wizard.flush()?;
    Ok(())
}

fn run_start(wizard: &mut Wizard<'_>, args: StartArgs) -> Result<()> {
    wizard.set_has_logo(args.logo)?;
    wizard.set_has_colours(args.colours)?;
    wizard.set_has_fonts(args.fonts)?;
    wizard.set_has_brand_guide(args.brand_guide)?;
    wizard.set_path(Some(args.path))?;

    print_status(wizard);
    Ok(())
}

fn run_theme(wizard: &mut Wizard<'_>, args: ThemeArgs) -> Result<()> {
    let mut update = ThemeUpdate {
        name: args.name.map(Some),
        logo: args.logo.map(Some),
        brand_guide: args.brand_guide.map(Some),
        icons: args.icons.map(Some),
        business: args.business.map(Some),
        ..ThemeUpdate::default()
    };

    if !args.colours.is_empty() {
        let mut colours = wizard.theme().colours.clone();
        for assignment in &args.colours {
            let colour = parse_colour_assignment(assignment)?;
            match colours.iter_mut().find(|existing| existing.name == colour.name) {
                Some(existing) => *existing = colour,
                None => colours.push(colour),
            }
        }
        update.colours = Some(colours);
    }

    if let (Some(heading), Some(body)) = (&args.heading_font, &args.body_font) {
        update.fonts = Some(Some(parse_font_pair(heading, body)?));
    }

    if !args.metadata.is_empty() {
        let mut metadata = wizard.theme().metadata.clone();
        for assignment in &args.metadata {
            let (key, value) = parse_metadata_assignment(assignment)?;
            metadata.insert(key, value);
        }
        update.metadata = Some(metadata);
    }

    let changed = !update.is_empty();
    wizard.update_theme(update)?;
    print_theme(wizard);
    if changed && wizard.can_navigate_next() {
        println!(
            "{} is ready; run `themewiz next` to continue",
            wizard.step_title(wizard.current_step())
        );
    }
    Ok(())
}

fn write_export(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("failed to write theme descriptor to {}", path.display()))
}

fn print_position(wizard: &Wizard<'_>) {
    let (position, total) = wizard.progress();
    let step = wizard.current_step();
    println!(
        "Step {position}/{total}: {} ({step})",
        wizard.step_title(step)
    );
}

fn print_status(wizard: &Wizard<'_>) {
    print_position(wizard);

    let flags = wizard.flags();
    println!(
        "Path: {}",
        flags.path.map_or_else(|| "not chosen".to_string(), |path| path.to_string())
    );
    println!(
        "Has: logo={} colours={} fonts={} brand-guide={}",
        yes_no(flags.has_logo),
        yes_no(flags.has_colours),
        yes_no(flags.has_fonts),
        yes_no(flags.has_brand_guide)
    );

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Step", "Title", "Visited", "Completed"]);
    for view in wizard.step_views() {
        let marker = if view.current { ">" } else { "" };
        table.add_row(vec![
            Cell::new(format!("{marker}{}", view.position)),
            Cell::new(view.step.as_str()),
            Cell::new(view.title),
            Cell::new(yes_no(view.visited)),
            Cell::new(yes_no(view.completed)),
        ]);
    }
    println!("{table}");

    let step = wizard.current_step();
    if step != StepId::Review && !wizard.can_advance() {
        println!("Finish this step before moving on: {}", advance_hint(step));
    }
}

fn print_theme(wizard: &Wizard<'_>) {
    let theme = wizard.theme();
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("Name: {}", show(&theme.name));
    println!("Logo: {}", show(&theme.logo));
    println!("Brand guide: {}", show(&theme.brand_guide));
    println!("Business: {}", show(&theme.business));
    println!("Icons: {}", show(&theme.icons));
    match &theme.fonts {
        Some(fonts) => println!("Fonts: {} / {}", fonts.heading, fonts.body),
        None => println!("Fonts: -"),
    }
    for colour in &theme.colours {
        println!("Colour {}: {}", colour.name, colour.hex);
    }
    for (key, value) in &theme.metadata {
        println!("Meta {key}: {value}");
    }
}

fn advance_hint(step: StepId) -> &'static str {
    match step {
        StepId::Welcome => "run `themewiz start --path <A|B>`",
        StepId::BrandGuide => "run `themewiz theme --brand-guide <FILE>`",
        StepId::Logo => "run `themewiz theme --logo <FILE>`",
        StepId::Colours => "run `themewiz theme --colour NAME=HEX` or `themewiz generate colours`",
        StepId::Fonts => "run `themewiz theme --heading-font <FONT> --body-font <FONT>`",
        StepId::BusinessQuestion => "run `themewiz theme --business <TEXT>`",
        StepId::Icons => "run `themewiz theme --icons <STYLE>`",
        StepId::Review => "run `themewiz export`",
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn run_doctor_command(paths: &Paths) -> Result<()> {
    let report = run_doctor(&paths.config, &paths.session);
    print_doctor_report(&report);
    Ok(())
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(check.state.to_string()),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    println!("{}", report.summary());
}
