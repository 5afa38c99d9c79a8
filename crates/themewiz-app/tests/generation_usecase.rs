mod support;

use themewiz_app::generate::{EXPLANATION_METADATA_KEY, generate_with_retry};
use themewiz_app::{CommandGenerator, GenerationTarget, RetryPolicy, SaveTiming, Wizard};
use themewiz_core::config::GeneratorConfig;
use themewiz_core::session::MemorySessionStore;
use themewiz_core::step::WizardPath;

use support::{QueueRunner, output};

fn generator_config() -> GeneratorConfig {
    GeneratorConfig {
        program: "theme-suggest".to_string(),
        args: vec!["--model".to_string(), "small".to_string()],
        max_attempts: 3,
        backoff_ms: 250,
    }
}

#[test]
fn generated_fonts_are_merged_after_a_retry() {
    let runner = QueueRunner::new(vec![
        output("", "temporarily unavailable", 1),
        output(
            r#"{"fonts":{"heading":"Playfair Display","body":"Source Sans"},"explanation":"editorial feel"}"#,
            "",
            0,
        ),
    ]);
    let config = generator_config();
    let generator = CommandGenerator::from_config(&runner, &config);

    let sessions = MemorySessionStore::new();
    let mut wizard = Wizard::new(&sessions, SaveTiming::immediate());
    wizard.set_has_fonts(true).expect("fonts flag");
    wizard.set_path(Some(WizardPath::A)).expect("path");

    let mut pauses = Vec::new();
    let response = generate_with_retry(
        &generator,
        wizard.theme(),
        GenerationTarget::Fonts,
        RetryPolicy::from_config(&config),
        &mut |pause| pauses.push(pause.as_millis()),
    )
    .expect("second attempt succeeds");
    wizard
        .apply_generation(GenerationTarget::Fonts, response)
        .expect("apply");

    assert_eq!(pauses, vec![250]);
    let fonts = wizard.theme().fonts.clone().expect("fonts set");
    assert_eq!(fonts.heading, "Playfair Display");
    assert_eq!(
        wizard.theme().metadata.get(EXPLANATION_METADATA_KEY).map(String::as_str),
        Some("editorial feel")
    );

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].program, "theme-suggest");
    assert_eq!(calls[1].args, vec!["--model", "small", "fonts"]);
    assert!(calls[1].stdin.is_some());
}

#[test]
fn invalid_generator_output_is_an_error() {
    let runner = QueueRunner::new(vec![output("not json", "", 0)]);
    let config = GeneratorConfig {
        max_attempts: 1,
        ..generator_config()
    };
    let generator = CommandGenerator::from_config(&runner, &config);
    let sessions = MemorySessionStore::new();
    let wizard = Wizard::new(&sessions, SaveTiming::immediate());

    let error = generate_with_retry(
        &generator,
        wizard.theme(),
        GenerationTarget::All,
        RetryPolicy::from_config(&config),
        &mut |_| {},
    )
    .expect_err("invalid json");

    assert!(format!("{error:#}").contains("returned invalid JSON"));
    assert_eq!(runner.calls().len(), 1);
}
