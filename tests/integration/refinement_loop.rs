//! Draft, judge and refine loop over scripted replies.

use crate::integration::{scripted_gateway, story_reply, verdict_reply};
use storyloom::config::PipelineConfig;
use storyloom::provider::ScriptedProvider;
use storyloom::refinement::{LoopState, RefinementSession, StopReason};
use storyloom::story::StoryRequest;

fn request() -> StoryRequest {
    StoryRequest::fallback("a penguin who is scared of water")
}

#[tokio::test]
async fn test_stops_at_first_passing_round() {
    let provider = ScriptedProvider::with_texts([
        story_reply("Draft One", "Pip stood at the edge."),
        verdict_reply(5, "Add tension"),
        story_reply("Draft Two", "Pip took a breath."),
        verdict_reply(7, "Polish the ending"),
        // Never consumed.
        story_reply("Draft Three", "unused"),
    ]);
    let gateway = scripted_gateway(&provider, 1);
    let pipeline = PipelineConfig::default();

    let outcome = RefinementSession::new(&gateway, &pipeline, request())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::ThresholdReached { round: 2, score: 7 });
    assert_eq!(outcome.story.title(), "Draft Two");
    assert_eq!(outcome.story.version(), 2);
    assert_eq!(outcome.history.len(), 2);
    assert_eq!(provider.request_count(), 4);
    assert_eq!(provider.remaining(), 1);
}

#[tokio::test]
async fn test_first_draft_can_pass_immediately() {
    let provider = ScriptedProvider::with_texts([
        story_reply("Perfect", "Just right."),
        verdict_reply(9, "None"),
    ]);
    let gateway = scripted_gateway(&provider, 1);
    let pipeline = PipelineConfig::default();

    let outcome = RefinementSession::new(&gateway, &pipeline, request())
        .run()
        .await
        .unwrap();
    assert_eq!(outcome.story.version(), 1);
    assert_eq!(outcome.history.len(), 1);
}

#[tokio::test]
async fn test_max_rounds_caps_versions() {
    let provider = ScriptedProvider::new();
    for round in 1..=5 {
        provider.push_text(story_reply(&format!("Draft {round}"), "Body."));
        provider.push_text(verdict_reply(4, &format!("Fix issue {round}")));
    }
    provider.set_fallback(story_reply("Never", "should not be requested"));
    let gateway = scripted_gateway(&provider, 1);
    let pipeline = PipelineConfig::default();

    let outcome = RefinementSession::new(&gateway, &pipeline, request())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::MaxRounds { rounds: 5 });
    assert_eq!(outcome.story.version(), 5);
    assert_eq!(outcome.story.title(), "Draft 5");
    assert_eq!(outcome.history.len(), 5);
    assert_eq!(provider.request_count(), 10);
}

#[tokio::test]
async fn test_judge_sees_every_prior_round() {
    let provider = ScriptedProvider::new();
    for round in 1..=3 {
        provider.push_text(story_reply(&format!("Draft {round}"), "Body."));
        let score = if round == 3 { 8 } else { 3 };
        provider.push_text(verdict_reply(score, &format!("Fix issue {round}")));
    }
    let gateway = scripted_gateway(&provider, 1);
    let pipeline = PipelineConfig::default();

    RefinementSession::new(&gateway, &pipeline, request())
        .run()
        .await
        .unwrap();

    let requests = provider.requests();
    // Calls alternate draft/judge: judge prompts are at odd indices.
    let judge_prompts: Vec<&str> = requests
        .iter()
        .skip(1)
        .step_by(2)
        .map(|r| r.prompt.as_str())
        .collect();
    assert_eq!(judge_prompts.len(), 3);

    assert!(judge_prompts[0].contains("Be extremely critical"));
    assert!(!judge_prompts[0].contains("PRIOR FEEDBACK"));

    assert!(judge_prompts[1].contains("revision #2"));
    assert!(judge_prompts[1].contains("ROUND 1 FEEDBACK"));
    assert!(judge_prompts[1].contains("Fix issue 1"));
    assert!(!judge_prompts[1].contains("ROUND 2 FEEDBACK"));

    assert!(judge_prompts[2].contains("ROUND 1 FEEDBACK"));
    assert!(judge_prompts[2].contains("ROUND 2 FEEDBACK"));
    assert!(judge_prompts[2].contains("Fix issue 2"));
}

#[tokio::test]
async fn test_refine_uses_only_latest_feedback() {
    let provider = ScriptedProvider::new();
    for round in 1..=3 {
        provider.push_text(story_reply(&format!("Draft {round}"), "Body."));
        let score = if round == 3 { 8 } else { 3 };
        provider.push_text(verdict_reply(score, &format!("Fix issue {round}")));
    }
    let gateway = scripted_gateway(&provider, 1);
    let pipeline = PipelineConfig::default();

    RefinementSession::new(&gateway, &pipeline, request())
        .run()
        .await
        .unwrap();

    let second_refine = &provider.requests()[4].prompt;
    assert!(second_refine.contains("Fix issue 2"));
    assert!(!second_refine.contains("Fix issue 1"));
    assert!(second_refine.contains("TITLE: Draft 2"));
}

#[tokio::test]
async fn test_unreadable_verdict_scores_midpoint_and_continues() {
    let provider = ScriptedProvider::with_texts([
        story_reply("Draft", "Body."),
        "I liked it a lot!".to_string(),
        story_reply("Draft Again", "Body."),
        verdict_reply(10, "none"),
    ]);
    let gateway = scripted_gateway(&provider, 1);
    let pipeline = PipelineConfig::default();

    let outcome = RefinementSession::new(&gateway, &pipeline, request())
        .run()
        .await
        .unwrap();
    assert_eq!(outcome.history.round(1).unwrap().overall.get(), 5);
    assert_eq!(outcome.history.len(), 2);
}

#[tokio::test]
async fn test_exhaustion_mid_loop_is_resumable() {
    let provider = ScriptedProvider::with_texts([
        story_reply("Draft", "Body."),
        verdict_reply(3, "More stars"),
    ]);
    let gateway = scripted_gateway(&provider, 2);
    let pipeline = PipelineConfig::default();
    let mut session = RefinementSession::new(&gateway, &pipeline, request());

    let err = session.run().await.unwrap_err();
    assert!(err.is_gateway_exhausted());
    assert_eq!(session.state(), LoopState::Refining);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.story().unwrap().version(), 1);

    // The service comes back: the same session picks up where it stopped.
    provider.push_text(story_reply("Draft", "Better body."));
    provider.push_text(verdict_reply(8, "none"));
    let outcome = session.run().await.unwrap();
    assert_eq!(outcome.story.version(), 2);
    assert_eq!(outcome.history.len(), 2);
}

#[tokio::test]
async fn test_custom_threshold_and_rounds() {
    let provider = ScriptedProvider::with_texts([
        story_reply("One", "Body."),
        verdict_reply(8, "x"),
        story_reply("Two", "Body."),
        verdict_reply(8, "y"),
    ]);
    let gateway = scripted_gateway(&provider, 1);
    let pipeline = PipelineConfig {
        judge_threshold: 9,
        max_rounds: 2,
        ..PipelineConfig::default()
    };

    let outcome = RefinementSession::new(&gateway, &pipeline, request())
        .run()
        .await
        .unwrap();
    assert_eq!(outcome.stop_reason, StopReason::MaxRounds { rounds: 2 });
}
