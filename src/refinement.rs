//! Draft, judge, refine.
//!
//! [`RefinementSession`] is a small state machine:
//!
//! ```text
//! Drafting -> Judging -> Done
//!                ^    \
//!                |     v
//!                +-- Refining
//! ```
//!
//! Judging stops the loop once the overall score reaches the threshold or once the
//! maximum number of drafts has been judged. Each transition is one gateway call; a failed
//! call leaves the session in the state it was in, with the story and history so far intact.

use crate::config::{CallBudget, PipelineConfig};
use crate::error::ApiError;
use crate::extract::{parse_feedback, parse_story};
use crate::gateway::{CallGateway, GenerationCall};
use crate::prompts;
use crate::story::{FeedbackHistory, JudgeFeedback, Story, StoryRequest, UNTITLED};
use serde::Serialize;
use tracing::{debug, info};

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum StopReason {
    ThresholdReached { round: usize, score: u8 },
    MaxRounds { rounds: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Drafting,
    Judging,
    Refining,
    Done(StopReason),
}

/// Final story, every verdict, and the reason the loop stopped.
#[derive(Debug, Clone, Serialize)]
pub struct RefinementOutcome {
    pub story: Story,
    pub history: FeedbackHistory,
    pub stop_reason: StopReason,
}

pub struct RefinementSession<'g> {
    gateway: &'g CallGateway,
    pipeline: PipelineConfig,
    request: StoryRequest,
    story: Option<Story>,
    history: FeedbackHistory,
    drafts: usize,
    state: LoopState,
}

impl<'g> RefinementSession<'g> {
    pub fn new(gateway: &'g CallGateway, pipeline: &PipelineConfig, request: StoryRequest) -> Self {
        Self {
            gateway,
            pipeline: pipeline.clone(),
            request,
            story: None,
            history: FeedbackHistory::new(),
            drafts: 0,
            state: LoopState::Drafting,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, LoopState::Done(_))
    }

    pub fn request(&self) -> &StoryRequest {
        &self.request
    }

    /// Current draft, if one has been produced.
    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    pub fn history(&self) -> &FeedbackHistory {
        &self.history
    }

    /// Number of drafts produced so far, the initial one included.
    pub fn drafts(&self) -> usize {
        self.drafts
    }

    /// Perform one transition and return the new state.
    pub async fn step(&mut self) -> Result<LoopState, ApiError> {
        let next = match (self.state, self.story.as_ref()) {
            (LoopState::Done(reason), _) => LoopState::Done(reason),
            (LoopState::Drafting, _) | (_, None) => {
                let story = self.draft().await?;
                self.commit_draft(story);
                LoopState::Judging
            }
            (LoopState::Judging, Some(story)) => {
                let feedback = self.judge(story).await?;
                self.record_verdict(feedback)
            }
            (LoopState::Refining, Some(story)) => {
                let refined = self.refine(story).await?;
                self.commit_draft(refined);
                LoopState::Judging
            }
        };
        debug!(from = ?self.state, to = ?next, drafts = self.drafts, "Refinement transition");
        self.state = next;
        Ok(next)
    }

    /// Drive the loop to completion.
    pub async fn run(&mut self) -> Result<RefinementOutcome, ApiError> {
        loop {
            if let LoopState::Done(stop_reason) = self.step().await? {
                return Ok(self.outcome(stop_reason));
            }
        }
    }

    fn outcome(&self, stop_reason: StopReason) -> RefinementOutcome {
        RefinementOutcome {
            story: self
                .story
                .clone()
                .unwrap_or_else(|| Story::draft(UNTITLED, "", "")),
            history: self.history.clone(),
            stop_reason,
        }
    }

    /// Finished outcome, or `None` while the loop is still running.
    pub fn into_outcome(self) -> Option<RefinementOutcome> {
        match self.state {
            LoopState::Done(stop_reason) => Some(self.outcome(stop_reason)),
            _ => None,
        }
    }

    fn commit_draft(&mut self, story: Story) {
        self.drafts += 1;
        info!(
            version = story.version(),
            title = %story.title(),
            words = story.word_count(),
            "Draft ready"
        );
        self.story = Some(story);
    }

    fn record_verdict(&mut self, feedback: JudgeFeedback) -> LoopState {
        let score = feedback.overall.get();
        let passed = feedback.meets(self.pipeline.judge_threshold);
        let round = self.history.record(feedback);
        info!(
            round,
            score,
            threshold = self.pipeline.judge_threshold,
            "Judge verdict recorded"
        );

        if passed {
            info!(round, score, "Threshold reached, stopping");
            LoopState::Done(StopReason::ThresholdReached { round, score })
        } else if self.drafts >= self.pipeline.max_rounds {
            info!(rounds = round, "Maximum rounds reached, keeping final draft");
            LoopState::Done(StopReason::MaxRounds { rounds: round })
        } else {
            LoopState::Refining
        }
    }

    async fn draft(&self) -> Result<Story, ApiError> {
        let reply = self
            .story_call(prompts::draft_prompt(&self.request), self.pipeline.draft)
            .await?;
        let parts = parse_story(&reply, UNTITLED);
        Ok(Story::draft(parts.title, parts.body, parts.moral))
    }

    async fn judge(&self, story: &Story) -> Result<JudgeFeedback, ApiError> {
        let round = self.history.len() + 1;
        let call = GenerationCall::new(
            prompts::judge_prompt(story, &self.request, round, &self.history),
            prompts::JUDGE_INSTRUCTIONS,
            self.pipeline.judge.max_tokens,
            self.pipeline.judge.temperature,
        );
        let reply = self.gateway.invoke(&call).await?;
        Ok(parse_feedback(&reply))
    }

    async fn refine(&self, story: &Story) -> Result<Story, ApiError> {
        // Refining is only entered after a verdict was recorded.
        let latest = self.history.latest().cloned().unwrap_or_default();
        let reply = self
            .story_call(
                prompts::refine_prompt(story, &self.request, &latest),
                self.pipeline.refine,
            )
            .await?;
        let parts = parse_story(&reply, story.title());
        Ok(story.revise(parts.title, parts.body, parts.moral))
    }

    async fn story_call(&self, prompt: String, budget: CallBudget) -> Result<String, ApiError> {
        storyteller_call(self.gateway, &self.request, prompt, budget).await
    }
}

async fn storyteller_call(
    gateway: &CallGateway,
    request: &StoryRequest,
    prompt: String,
    budget: CallBudget,
) -> Result<String, ApiError> {
    let call = GenerationCall::new(
        prompt,
        prompts::storyteller_instructions(request.category),
        budget.max_tokens,
        budget.temperature,
    );
    gateway.invoke(&call).await
}

/// Rewrites a story on the reader's request.
pub struct StoryReviser<'g> {
    gateway: &'g CallGateway,
    budget: CallBudget,
}

impl<'g> StoryReviser<'g> {
    pub fn new(gateway: &'g CallGateway, pipeline: &PipelineConfig) -> Self {
        Self {
            gateway,
            budget: pipeline.refine,
        }
    }

    /// New version of `story` with the requested change applied; keeps the old title if
    /// the reply has none.
    pub async fn revise(
        &self,
        story: &Story,
        request: &StoryRequest,
        instruction: &str,
    ) -> Result<Story, ApiError> {
        let prompt = prompts::revision_prompt(story, request, instruction);
        let reply = storyteller_call(self.gateway, request, prompt, self.budget).await?;
        let parts = parse_story(&reply, story.title());
        let revised = story.revise(parts.title, parts.body, parts.moral);
        info!(version = revised.version(), "Story revised on request");
        Ok(revised)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RetryPolicy;
    use crate::provider::ScriptedProvider;

    fn story_reply(title: &str) -> String {
        format!("TITLE: {title}\nSTORY:\nOnce upon a time.\nMORAL: Be kind.")
    }

    fn verdict(score: u8) -> String {
        format!("OVERALL_SCORE: {score}\nFEEDBACK: ok\nSUGGESTIONS:\n- more stars")
    }

    fn gateway(provider: &ScriptedProvider) -> CallGateway {
        CallGateway::new(Box::new(provider.clone()), RetryPolicy::immediate(1))
    }

    #[tokio::test]
    async fn test_step_walks_the_states() {
        let provider = ScriptedProvider::with_texts([
            story_reply("One"),
            verdict(4),
            story_reply("Two"),
            verdict(8),
        ]);
        let gateway = gateway(&provider);
        let pipeline = PipelineConfig::default();
        let mut session =
            RefinementSession::new(&gateway, &pipeline, StoryRequest::fallback("idea"));

        assert_eq!(session.state(), LoopState::Drafting);
        assert_eq!(session.step().await.unwrap(), LoopState::Judging);
        assert_eq!(session.step().await.unwrap(), LoopState::Refining);
        assert_eq!(session.step().await.unwrap(), LoopState::Judging);
        assert_eq!(
            session.step().await.unwrap(),
            LoopState::Done(StopReason::ThresholdReached { round: 2, score: 8 })
        );
        // Done is absorbing and makes no further calls.
        assert!(matches!(
            session.step().await.unwrap(),
            LoopState::Done(StopReason::ThresholdReached { .. })
        ));
        assert_eq!(provider.request_count(), 4);

        let outcome = session.into_outcome().unwrap();
        assert_eq!(outcome.story.title(), "Two");
        assert_eq!(outcome.story.version(), 2);
        assert_eq!(outcome.history.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_partial_state() {
        let provider = ScriptedProvider::with_texts([story_reply("Kept")]);
        let gateway = gateway(&provider);
        let pipeline = PipelineConfig::default();
        let mut session =
            RefinementSession::new(&gateway, &pipeline, StoryRequest::fallback("idea"));

        let err = session.run().await.unwrap_err();
        assert!(err.is_gateway_exhausted());
        assert_eq!(session.state(), LoopState::Judging);
        assert_eq!(session.story().unwrap().title(), "Kept");
        assert!(session.history().is_empty());
        assert!(session.into_outcome().is_none());
    }

    #[tokio::test]
    async fn test_refine_keeps_title_when_missing() {
        let provider = ScriptedProvider::with_texts([
            story_reply("Original"),
            verdict(3),
            "STORY:\nA better tale.\nMORAL: Share.".to_string(),
            verdict(9),
        ]);
        let gateway = gateway(&provider);
        let pipeline = PipelineConfig::default();
        let mut session =
            RefinementSession::new(&gateway, &pipeline, StoryRequest::fallback("idea"));

        let outcome = session.run().await.unwrap();
        assert_eq!(outcome.story.title(), "Original");
        assert_eq!(outcome.story.body(), "A better tale.");

        let refine_request = &provider.requests()[2];
        assert!(refine_request.prompt.contains("IMPROVEMENT NOTES"));
        assert!(refine_request.prompt.contains("- more stars"));
        assert_eq!(refine_request.temperature, Some(0.7));
    }

    #[tokio::test]
    async fn test_reviser_bumps_version() {
        let provider = ScriptedProvider::with_texts([story_reply("Changed")]);
        let gateway = gateway(&provider);
        let reviser = StoryReviser::new(&gateway, &PipelineConfig::default());
        let story = Story::draft("Before", "Body", "Moral");

        let revised = reviser
            .revise(&story, &StoryRequest::fallback("idea"), "add a dragon")
            .await
            .unwrap();
        assert_eq!(revised.version(), 2);
        assert_eq!(revised.title(), "Changed");
        assert!(provider.requests()[0]
            .prompt
            .contains("USER'S REQUEST: \"add a dragon\""));
    }
}
