//! Non-interactive CLI commands driven through `RunContext` with a scripted gateway.

use crate::integration::{analysis_reply, scripted_gateway, story_reply, verdict_reply};
use clap::Parser;
use storyloom::cli::{Cli, RunContext};
use storyloom::config::StoryloomConfig;
use storyloom::error::ApiError;
use storyloom::provider::ScriptedProvider;
use tempfile::TempDir;

fn tell_provider() -> ScriptedProvider {
    ScriptedProvider::with_texts([
        analysis_reply(),
        story_reply("Pip and the Harbor", "Pip waddled to the water."),
        verdict_reply(4, "Give Pip a friend"),
        story_reply("Pip and the Harbor", "Pip and Walrus swam together."),
        verdict_reply(8, "Lovely"),
    ])
}

fn run(provider: &ScriptedProvider, args: &[&str]) -> Result<String, ApiError> {
    let cli = Cli::try_parse_from(args).unwrap();
    RunContext::with_gateway(StoryloomConfig::default(), scripted_gateway(provider, 1))
        .execute(&cli.command)
}

#[test]
fn test_tell_json_report() {
    let provider = tell_provider();
    let out = run(&provider, &["storyloom", "tell", "Pip the penguin", "--format", "json"]).unwrap();

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["request"]["category"], "adventure");
    assert_eq!(value["story"]["body"], "Pip and Walrus swam together.");
    assert_eq!(value["story"]["version"], 2);
    assert_eq!(value["history"].as_array().unwrap().len(), 2);
    assert_eq!(value["stop_reason"]["reason"], "threshold_reached");
    assert_eq!(value["threshold"], 7);
}

#[test]
fn test_tell_overrides_reach_the_storyteller() {
    let provider = tell_provider();
    run(
        &provider,
        &[
            "storyloom",
            "tell",
            "Pip the penguin",
            "--category",
            "bedtime",
            "--tone",
            "3",
            "--quiet-judge",
        ],
    )
    .unwrap();

    let draft = &provider.requests()[1];
    assert!(draft.system.as_deref().unwrap().contains("BEDTIME FOCUS"));
    assert!(draft.prompt.contains("Tone: calming"));
    assert!(draft.prompt.contains("Setting: an icy harbor"));
}

#[test]
fn test_tell_text_and_save() {
    let provider = tell_provider();
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("pip.txt");
    let out = run(
        &provider,
        &[
            "storyloom",
            "tell",
            "Pip the penguin",
            "--save",
            target.to_str().unwrap(),
        ],
    )
    .unwrap();

    assert!(out.starts_with("Pip and the Harbor"));
    assert!(out.contains("Give Pip a friend") || out.contains("Lovely"));
    assert!(out.contains(&format!("Saved to {}", target.display())));
    let saved = std::fs::read_to_string(&target).unwrap();
    assert!(saved.contains("Pip and Walrus swam together."));
}

#[test]
fn test_tell_fails_cleanly_when_service_is_down() {
    let provider = ScriptedProvider::new();
    let err = run(&provider, &["storyloom", "tell", "anything"]).unwrap_err();
    assert!(err.is_gateway_exhausted());
    let message = storyloom::cli::map_error(&err);
    assert!(!message.contains('\n'));
}
