//! Storyloom: children's bedtime stories, drafted, judged and refined by a language model.
//!
//! The pipeline is strictly sequential. A [`RequestAnalyzer`](analyzer::RequestAnalyzer)
//! turns a free-form idea into a [`StoryRequest`](story::StoryRequest); a
//! [`RefinementSession`](refinement::RefinementSession) drafts a story and alternates judging
//! and refining until the judge is satisfied or the round limit is hit; a
//! [`BranchingSession`](branching::BranchingSession) can then continue the story one reader
//! choice at a time. Every model call goes through the [`CallGateway`](gateway::CallGateway),
//! and every reply is read by the tolerant extractors in [`extract`].

pub mod analyzer;
pub mod branching;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod gateway;
pub mod logging;
pub mod prompts;
pub mod provider;
pub mod refinement;
pub mod story;
