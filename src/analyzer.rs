//! Request analysis: free-form story idea in, normalized [`StoryRequest`] out.

use crate::config::{CallBudget, PipelineConfig};
use crate::error::ApiError;
use crate::extract::parse_request;
use crate::gateway::{CallGateway, GenerationCall};
use crate::prompts;
use crate::story::{RequestOverrides, StoryRequest};
use tracing::{debug, info};

pub struct RequestAnalyzer<'g> {
    gateway: &'g CallGateway,
    budget: CallBudget,
}

impl<'g> RequestAnalyzer<'g> {
    pub fn new(gateway: &'g CallGateway, pipeline: &PipelineConfig) -> Self {
        Self {
            gateway,
            budget: pipeline.analysis,
        }
    }

    /// Analyze the idea. Malformed replies degrade to defaults; only gateway exhaustion fails.
    pub async fn analyze(&self, user_text: &str) -> Result<StoryRequest, ApiError> {
        let call = GenerationCall::new(
            prompts::analysis_prompt(user_text),
            prompts::ANALYZER_INSTRUCTIONS,
            self.budget.max_tokens,
            self.budget.temperature,
        );
        let reply = self.gateway.invoke(&call).await?;
        debug!(reply_chars = reply.len(), "Analysis reply received");

        let request = parse_request(user_text, &reply);
        info!(
            category = %request.category,
            tone = %request.tone,
            setting = %request.setting,
            characters = request.characters.len(),
            themes = request.themes.len(),
            "Story request analyzed"
        );
        Ok(request)
    }

    /// Analyze, then apply operator overrides.
    pub async fn analyze_with(
        &self,
        user_text: &str,
        overrides: &RequestOverrides,
    ) -> Result<StoryRequest, ApiError> {
        let request = self.analyze(user_text).await?;
        if overrides.is_empty() {
            return Ok(request);
        }
        let request = request.with_overrides(overrides);
        debug!(
            category = %request.category,
            tone = %request.tone,
            setting = %request.setting,
            "Overrides applied"
        );
        Ok(request)
    }
}
