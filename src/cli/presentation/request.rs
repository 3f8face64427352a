//! Request presentation.

use crate::error::ApiError;
use crate::story::StoryRequest;

pub fn format_request_text(request: &StoryRequest) -> String {
    let characters = request
        .characters_line()
        .unwrap_or_else(|| "(the storyteller will invent them)".to_string());
    let themes = request
        .themes_line()
        .unwrap_or_else(|| "(friendship and kindness)".to_string());
    format!(
        "Category:   {} ({})\nTone:       {} ({})\nSetting:    {}\nCharacters: {}\nThemes:     {}",
        request.category,
        request.category.describe(),
        request.tone,
        request.tone.describe(),
        request.setting,
        characters,
        themes
    )
}

pub fn format_request_json(request: &StoryRequest) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(request)?)
}
