//! Request analysis against scripted replies.

use crate::integration::{analysis_reply, scripted_gateway};
use storyloom::analyzer::RequestAnalyzer;
use storyloom::config::PipelineConfig;
use storyloom::provider::ScriptedProvider;
use storyloom::story::{RequestOverrides, StoryCategory, StoryRequest, StoryTone, DEFAULT_SETTING};

#[tokio::test]
async fn test_full_analysis() {
    let provider = ScriptedProvider::with_texts([analysis_reply()]);
    let gateway = scripted_gateway(&provider, 3);
    let analyzer = RequestAnalyzer::new(&gateway, &PipelineConfig::default());

    let request = analyzer.analyze("Pip the penguin sails away").await.unwrap();
    assert_eq!(request.raw_input, "Pip the penguin sails away");
    assert_eq!(request.category, StoryCategory::Adventure);
    assert_eq!(request.tone, StoryTone::Exciting);
    assert_eq!(request.setting, "an icy harbor");
    assert_eq!(request.characters, vec!["Pip the penguin", "Old Walrus"]);
    assert_eq!(request.themes, vec!["courage", "friendship"]);
}

#[tokio::test]
async fn test_unknown_values_fall_back_to_defaults() {
    let provider = ScriptedProvider::with_texts([
        "category: horror\ntone: gloomy\nsetting:   \ncharacters: none",
    ]);
    let gateway = scripted_gateway(&provider, 3);
    let analyzer = RequestAnalyzer::new(&gateway, &PipelineConfig::default());

    let request = analyzer.analyze("something spooky").await.unwrap();
    assert_eq!(request.category, StoryCategory::Bedtime);
    assert_eq!(request.tone, StoryTone::Whimsical);
    assert_eq!(request.setting, DEFAULT_SETTING);
}

#[tokio::test]
async fn test_retries_then_succeeds() {
    let provider = ScriptedProvider::new();
    provider.push_failure("timeout").push_text(analysis_reply());
    let gateway = scripted_gateway(&provider, 3);
    let analyzer = RequestAnalyzer::new(&gateway, &PipelineConfig::default());

    let request = analyzer.analyze("Pip").await.unwrap();
    assert_eq!(request.category, StoryCategory::Adventure);
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_fallback_with_overrides_matches_session_recovery() {
    let provider = ScriptedProvider::new();
    let gateway = scripted_gateway(&provider, 2);
    let analyzer = RequestAnalyzer::new(&gateway, &PipelineConfig::default());
    let overrides = RequestOverrides {
        category: Some(StoryCategory::Funny),
        tone: None,
        setting: None,
    };

    let err = analyzer.analyze_with("a silly goose", &overrides).await.unwrap_err();
    assert!(err.is_gateway_exhausted());
    assert_eq!(provider.request_count(), 2);

    let recovered = StoryRequest::fallback("a silly goose").with_overrides(&overrides);
    assert_eq!(recovered.category, StoryCategory::Funny);
    assert_eq!(recovered.setting, DEFAULT_SETTING);
}
