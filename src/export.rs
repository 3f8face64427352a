//! Plain-text story files.

use crate::error::ApiError;
use crate::story::Story;
use std::path::{Path, PathBuf};
use tracing::info;

const HEAVY_RULE: &str = "============================================================";
const LIGHT_RULE: &str = "------------------------------------------------------------";

pub struct StoryExport;

impl StoryExport {
    /// Banner layout: title between heavy rules, body, then the moral under a light rule.
    pub fn render(story: &Story) -> String {
        format!(
            "{HEAVY_RULE}\n{}\n{HEAVY_RULE}\n\n{}\n\n{LIGHT_RULE}\nMoral: {}\n{HEAVY_RULE}\n",
            story.title(),
            story.body(),
            story.moral()
        )
    }

    /// `<slug>.txt` derived from the title, `story.txt` if nothing usable remains.
    pub fn file_name(story: &Story) -> String {
        let slug = slugify(story.title());
        if slug.is_empty() {
            "story.txt".to_string()
        } else {
            format!("{slug}.txt")
        }
    }

    /// Write the story. A directory target gets the default file name inside it.
    /// Returns the path written.
    pub fn write(target: &Path, story: &Story) -> Result<PathBuf, ApiError> {
        let path = if target.is_dir() {
            target.join(Self::file_name(story))
        } else {
            target.to_path_buf()
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Self::render(story))?;
        info!(path = %path.display(), version = story.version(), "Story saved");
        Ok(path)
    }
}

fn slugify(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
