//! Branching continuation over scripted replies.

use crate::integration::{beat_reply, choices_reply, scripted_gateway};
use storyloom::branching::{
    BranchEnd, BranchState, BranchingSession, ChoiceSelector, FixedSelector, Selection,
};
use storyloom::config::PipelineConfig;
use storyloom::provider::ScriptedProvider;
use storyloom::story::{
    Choice, ChoiceProposal, ContinuationResult, Story, StoryRequest, DEFAULT_FIRST_CHOICE,
    DEFAULT_SECOND_CHOICE,
};

fn start_story() -> Story {
    Story::draft("Pip Sets Sail", "Pip looked at the sea.", "Try new things.")
}

/// Picks from a fixed list, then stops; records what it was offered.
struct ScriptedSelector {
    picks: Vec<Selection>,
    offered: Vec<(usize, usize, ChoiceProposal)>,
    beats: Vec<usize>,
}

impl ScriptedSelector {
    fn new(picks: Vec<Selection>) -> Self {
        Self {
            picks,
            offered: Vec::new(),
            beats: Vec::new(),
        }
    }
}

impl ChoiceSelector for ScriptedSelector {
    fn select(&mut self, step: usize, total_steps: usize, proposal: &ChoiceProposal) -> Selection {
        self.offered.push((step, total_steps, proposal.clone()));
        if self.picks.is_empty() {
            Selection::Stop
        } else {
            self.picks.remove(0)
        }
    }

    fn on_beat(&mut self, step: usize, _beat: &ContinuationResult, _story: &Story) {
        self.beats.push(step);
    }
}

#[tokio::test]
async fn test_moral_at_step_two_ends_early() {
    let provider = ScriptedProvider::with_texts([
        choices_reply("Jump in", "Build a boat"),
        beat_reply("Pip jumped in with a splash.", None),
        choices_reply("Swim to the island", "Float on a log"),
        beat_reply("Pip reached the island, proud and happy.", Some("Courage grows when you try.")),
    ]);
    let gateway = scripted_gateway(&provider, 1);
    let mut session = BranchingSession::new(
        &gateway,
        &PipelineConfig::default(),
        StoryRequest::fallback("penguin"),
        start_story(),
    );

    let mut selector = ScriptedSelector::new(vec![
        Selection::Pick(Choice::First),
        Selection::Pick(Choice::Second),
    ]);
    let end = session.run(&mut selector).await.unwrap();

    assert_eq!(end, BranchEnd::Concluded { step: 2 });
    assert_eq!(session.beats(), 2);
    assert_eq!(selector.beats, vec![1, 2]);
    assert_eq!(provider.request_count(), 4);
    assert_eq!(selector.offered[1].0, 2);
    assert_eq!(selector.offered[1].1, 3);

    let story = session.into_story();
    assert_eq!(story.version(), 3);
    assert_eq!(story.moral(), "Courage grows when you try.");
    assert_eq!(
        story.body(),
        "Pip looked at the sea.\n\nPip jumped in with a splash.\n\nPip reached the island, proud and happy."
    );

    let final_prompt = &provider.requests()[3].prompt;
    assert!(final_prompt.contains("Float on a log"));
}

#[tokio::test]
async fn test_stop_leaves_story_unchanged() {
    let provider = ScriptedProvider::with_texts([choices_reply("Left", "Right")]);
    let gateway = scripted_gateway(&provider, 1);
    let mut session = BranchingSession::new(
        &gateway,
        &PipelineConfig::default(),
        StoryRequest::fallback("penguin"),
        start_story(),
    );

    let end = session
        .run(&mut ScriptedSelector::new(vec![Selection::Stop]))
        .await
        .unwrap();
    assert_eq!(end, BranchEnd::Stopped { step: 1 });
    assert_eq!(session.story(), &start_story());
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_final_step_is_marked_in_prompt() {
    let provider = ScriptedProvider::new();
    for step in 1..=3 {
        provider.push_text(choices_reply("A", "B"));
        provider.push_text(beat_reply(&format!("Beat {step}."), None));
    }
    let gateway = scripted_gateway(&provider, 1);
    let mut session = BranchingSession::new(
        &gateway,
        &PipelineConfig::default(),
        StoryRequest::fallback("penguin"),
        start_story(),
    );

    let end = session.run(&mut FixedSelector(Choice::First)).await.unwrap();
    assert_eq!(end, BranchEnd::StepsExhausted { steps: 3 });

    let requests = provider.requests();
    assert!(requests[1].prompt.contains("NOT FINAL YET"));
    assert!(requests[3].prompt.contains("NOT FINAL YET"));
    assert!(requests[5].prompt.contains("FINAL STEP"));
    // No moral came back, so the original one survives.
    assert_eq!(session.story().moral(), "Try new things.");
    assert_eq!(session.story().version(), 4);
}

#[tokio::test]
async fn test_garbled_choices_use_defaults() {
    let provider = ScriptedProvider::with_texts(["Hmm, let me think about that."]);
    let gateway = scripted_gateway(&provider, 1);
    let mut session = BranchingSession::new(
        &gateway,
        &PipelineConfig::default(),
        StoryRequest::fallback("penguin"),
        start_story(),
    );

    let proposal = session.propose().await.unwrap().unwrap();
    assert_eq!(proposal.first(), DEFAULT_FIRST_CHOICE);
    assert_eq!(proposal.second(), DEFAULT_SECOND_CHOICE);
    assert!(matches!(session.state(), BranchState::AwaitingSelection(_)));
}

#[tokio::test]
async fn test_failed_continuation_keeps_pending_proposal() {
    let provider = ScriptedProvider::with_texts([choices_reply("Up", "Down")]);
    let gateway = scripted_gateway(&provider, 2);
    let mut session = BranchingSession::new(
        &gateway,
        &PipelineConfig::default(),
        StoryRequest::fallback("penguin"),
        start_story(),
    );

    session.propose().await.unwrap();
    let err = session.choose(Choice::First).await.unwrap_err();
    assert!(err.is_gateway_exhausted());
    assert_eq!(session.beats(), 0);
    assert_eq!(session.story(), &start_story());

    // Retrying the same pick works once the service answers again.
    provider.push_text(beat_reply("Up they flew.", None));
    let beat = session.choose(Choice::First).await.unwrap().unwrap();
    assert_eq!(beat.beat, "Up they flew.");
    assert_eq!(session.story().version(), 2);
}
