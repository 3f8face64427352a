//! Branching continuation: offer two options, take a pick, append a beat, repeat.
//!
//! The session runs at most `max_branch_steps` steps and ends early when a beat comes back
//! with a moral, or when the reader stops. Every committed beat replaces the story with a
//! new version; stopping keeps the last committed story untouched.

use crate::config::PipelineConfig;
use crate::error::ApiError;
use crate::extract::{parse_choices, parse_continuation};
use crate::gateway::{CallGateway, GenerationCall};
use crate::prompts;
use crate::story::{Choice, ChoiceProposal, ContinuationResult, Story, StoryRequest};
use serde::Serialize;
use tracing::{debug, info};

/// The reader's answer to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Pick(Choice),
    Stop,
}

/// Whoever picks between the two options.
pub trait ChoiceSelector {
    fn select(&mut self, step: usize, total_steps: usize, proposal: &ChoiceProposal) -> Selection;

    /// Called after each committed beat.
    fn on_beat(&mut self, _step: usize, _beat: &ContinuationResult, _story: &Story) {}
}

/// Picks the same option every step.
#[derive(Debug, Clone, Copy)]
pub struct FixedSelector(pub Choice);

impl ChoiceSelector for FixedSelector {
    fn select(&mut self, _step: usize, _total_steps: usize, _proposal: &ChoiceProposal) -> Selection {
        Selection::Pick(self.0)
    }
}

/// How a branching session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum BranchEnd {
    /// A beat carried a moral.
    Concluded { step: usize },
    /// Every allowed step was used.
    StepsExhausted { steps: usize },
    /// The reader stopped before picking at this step.
    Stopped { step: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchState {
    Proposing,
    AwaitingSelection(ChoiceProposal),
    Final(BranchEnd),
}

pub struct BranchingSession<'g> {
    gateway: &'g CallGateway,
    pipeline: PipelineConfig,
    request: StoryRequest,
    story: Story,
    beats: usize,
    state: BranchState,
}

impl<'g> BranchingSession<'g> {
    pub fn new(
        gateway: &'g CallGateway,
        pipeline: &PipelineConfig,
        request: StoryRequest,
        story: Story,
    ) -> Self {
        Self {
            gateway,
            pipeline: pipeline.clone(),
            request,
            story,
            beats: 0,
            state: BranchState::Proposing,
        }
    }

    pub fn state(&self) -> &BranchState {
        &self.state
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn into_story(self) -> Story {
        self.story
    }

    /// Beats committed so far.
    pub fn beats(&self) -> usize {
        self.beats
    }

    pub fn max_steps(&self) -> usize {
        self.pipeline.max_branch_steps
    }

    /// 1-based number of the step in progress.
    pub fn current_step(&self) -> usize {
        self.beats + 1
    }

    pub fn end(&self) -> Option<BranchEnd> {
        match self.state {
            BranchState::Final(end) => Some(end),
            _ => None,
        }
    }

    /// Generate the two options for the current step. Returns the pending proposal
    /// unchanged if one is already waiting, and `None` once the session is final.
    pub async fn propose(&mut self) -> Result<Option<ChoiceProposal>, ApiError> {
        match &self.state {
            BranchState::Final(_) => return Ok(None),
            BranchState::AwaitingSelection(pending) => return Ok(Some(pending.clone())),
            BranchState::Proposing => {}
        }

        let step = self.current_step();
        let call = GenerationCall::new(
            prompts::choice_prompt(&self.story, &self.request, step, self.max_steps()),
            prompts::CHOICE_INSTRUCTIONS,
            self.pipeline.choice.max_tokens,
            self.pipeline.choice.temperature,
        );
        let reply = self.gateway.invoke(&call).await?;
        let proposal = parse_choices(&reply);
        debug!(
            step,
            first = proposal.first(),
            second = proposal.second(),
            "Choices proposed"
        );

        self.state = BranchState::AwaitingSelection(proposal.clone());
        Ok(Some(proposal))
    }

    /// End the session, keeping the story as last committed.
    pub fn stop(&mut self) {
        if !matches!(self.state, BranchState::Final(_)) {
            let step = self.current_step();
            info!(step, "Branching stopped by reader");
            self.state = BranchState::Final(BranchEnd::Stopped { step });
        }
    }

    /// Continue with the picked option and commit the beat. `None` if no proposal is pending.
    pub async fn choose(&mut self, choice: Choice) -> Result<Option<ContinuationResult>, ApiError> {
        let option = match &self.state {
            BranchState::AwaitingSelection(proposal) => proposal.get(choice).to_string(),
            _ => return Ok(None),
        };

        let step = self.current_step();
        let call = GenerationCall::new(
            prompts::continuation_prompt(&self.story, &option, step, self.max_steps()),
            prompts::storyteller_instructions(self.request.category),
            self.pipeline.continuation.max_tokens,
            self.pipeline.continuation.temperature,
        );
        let reply = self.gateway.invoke(&call).await?;
        let beat = parse_continuation(&reply);

        self.story = self.story.with_beat(&beat);
        self.beats += 1;
        info!(
            step,
            version = self.story.version(),
            concluded = beat.concludes(),
            "Continuation committed"
        );

        self.state = if beat.concludes() {
            BranchState::Final(BranchEnd::Concluded { step })
        } else if self.beats >= self.max_steps() {
            BranchState::Final(BranchEnd::StepsExhausted { steps: self.beats })
        } else {
            BranchState::Proposing
        };
        Ok(Some(beat))
    }

    /// Run until the session ends, asking `selector` at every step.
    pub async fn run(&mut self, selector: &mut dyn ChoiceSelector) -> Result<BranchEnd, ApiError> {
        loop {
            if let Some(end) = self.end() {
                return Ok(end);
            }
            let Some(proposal) = self.propose().await? else {
                continue;
            };
            match selector.select(self.current_step(), self.max_steps(), &proposal) {
                Selection::Stop => self.stop(),
                Selection::Pick(choice) => {
                    let step = self.current_step();
                    if let Some(beat) = self.choose(choice).await? {
                        selector.on_beat(step, &beat, &self.story);
                    }
                }
            }
        }
    }
}
