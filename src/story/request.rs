//! Story requests: the normalized record the pipeline is driven by.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Setting used when neither the analysis nor the operator supplies one.
pub const DEFAULT_SETTING: &str = "a magical land";

/// Kind of story. Free text always maps onto one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryCategory {
    Adventure,
    Fantasy,
    Animal,
    Friendship,
    #[default]
    Bedtime,
    Educational,
    Funny,
}

impl StoryCategory {
    /// Menu order.
    pub const ALL: [StoryCategory; 7] = [
        StoryCategory::Adventure,
        StoryCategory::Fantasy,
        StoryCategory::Animal,
        StoryCategory::Friendship,
        StoryCategory::Bedtime,
        StoryCategory::Educational,
        StoryCategory::Funny,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoryCategory::Adventure => "adventure",
            StoryCategory::Fantasy => "fantasy",
            StoryCategory::Animal => "animal",
            StoryCategory::Friendship => "friendship",
            StoryCategory::Bedtime => "bedtime",
            StoryCategory::Educational => "educational",
            StoryCategory::Funny => "funny",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            StoryCategory::Adventure => "Exciting discoveries and brave choices",
            StoryCategory::Fantasy => "Magic, talking animals, enchanted objects",
            StoryCategory::Animal => "Stories about animals with relatable personalities",
            StoryCategory::Friendship => "Cooperation, sharing, and kindness",
            StoryCategory::Bedtime => "Calm, soothing stories perfect for sleep",
            StoryCategory::Educational => "Learning woven into the story",
            StoryCategory::Funny => "Silly situations and gentle humor",
        }
    }

    /// Map free text to a category; anything unrecognized is `Bedtime`.
    pub fn parse(text: &str) -> Self {
        let wanted = text.trim().trim_matches(|c| c == '[' || c == ']').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .unwrap_or_default()
    }

    /// Map a 1-based menu number; out of range or non-numeric input is `Bedtime`.
    pub fn from_menu(choice: &str) -> Self {
        menu_index(choice, Self::ALL.len())
            .map(|index| Self::ALL[index])
            .unwrap_or_default()
    }

    /// Menu number if the input is numeric, otherwise a category name.
    pub fn from_selection(input: &str) -> Self {
        if is_menu_number(input) {
            Self::from_menu(input)
        } else {
            Self::parse(input)
        }
    }
}

impl fmt::Display for StoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrative tone. Free text always maps onto one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryTone {
    #[default]
    Whimsical,
    Exciting,
    Calming,
    Humorous,
    Heartwarming,
    Inspiring,
}

impl StoryTone {
    pub const ALL: [StoryTone; 6] = [
        StoryTone::Whimsical,
        StoryTone::Exciting,
        StoryTone::Calming,
        StoryTone::Humorous,
        StoryTone::Heartwarming,
        StoryTone::Inspiring,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoryTone::Whimsical => "whimsical",
            StoryTone::Exciting => "exciting",
            StoryTone::Calming => "calming",
            StoryTone::Humorous => "humorous",
            StoryTone::Heartwarming => "heartwarming",
            StoryTone::Inspiring => "inspiring",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            StoryTone::Whimsical => "Light, playful, and magical",
            StoryTone::Exciting => "Adventurous and energetic",
            StoryTone::Calming => "Peaceful and soothing",
            StoryTone::Humorous => "Funny and silly",
            StoryTone::Heartwarming => "Touching and emotional",
            StoryTone::Inspiring => "Uplifting and motivational",
        }
    }

    /// Map free text to a tone; anything unrecognized is `Whimsical`.
    pub fn parse(text: &str) -> Self {
        let wanted = text.trim().trim_matches(|c| c == '[' || c == ']').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tone| tone.as_str() == wanted)
            .unwrap_or_default()
    }

    pub fn from_menu(choice: &str) -> Self {
        menu_index(choice, Self::ALL.len())
            .map(|index| Self::ALL[index])
            .unwrap_or_default()
    }

    pub fn from_selection(input: &str) -> Self {
        if is_menu_number(input) {
            Self::from_menu(input)
        } else {
            Self::parse(input)
        }
    }
}

impl fmt::Display for StoryTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preset settings offered by the session menu: (menu label, setting text).
pub const PRESET_SETTINGS: [(&str, &str); 9] = [
    (
        "Magical forest - Enchanted woods with talking trees",
        "a magical forest with enchanted trees",
    ),
    (
        "Under the sea - Ocean depths with colorful sea creatures",
        "under the sea with colorful coral reefs",
    ),
    (
        "Cozy village - A friendly neighborhood",
        "a cozy village where everyone is friendly",
    ),
    (
        "Outer space - Stars, planets, and friendly aliens",
        "outer space among twinkling stars and friendly planets",
    ),
    (
        "Farm - Barns, fields, and farm animals",
        "a sunny farm with happy animals",
    ),
    (
        "Castle - Royal kingdoms and brave knights",
        "a grand castle in a peaceful kingdom",
    ),
    (
        "Jungle - Tropical wilderness with exotic animals",
        "a lush jungle full of wonder",
    ),
    (
        "Arctic - Snowy landscapes with polar animals",
        "the snowy Arctic with playful polar animals",
    ),
    (
        "Child's bedroom - Toys and imagination come alive",
        "a child's bedroom where toys come to life",
    ),
];

/// Setting text for a 1-based preset number, or [`DEFAULT_SETTING`].
pub fn preset_setting(choice: &str) -> &'static str {
    menu_index(choice, PRESET_SETTINGS.len())
        .map(|index| PRESET_SETTINGS[index].1)
        .unwrap_or(DEFAULT_SETTING)
}

/// Preset text for a menu number, otherwise the input itself as a free-form setting.
pub fn setting_from_selection(input: &str) -> String {
    if is_menu_number(input) {
        preset_setting(input).to_string()
    } else {
        input.trim().to_string()
    }
}

fn is_menu_number(input: &str) -> bool {
    let trimmed = input.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

fn menu_index(choice: &str, len: usize) -> Option<usize> {
    let number: usize = choice.trim().parse().ok()?;
    (1..=len).contains(&number).then(|| number - 1)
}

/// Normalized story request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRequest {
    pub raw_input: String,
    pub category: StoryCategory,
    pub characters: Vec<String>,
    pub themes: Vec<String>,
    pub setting: String,
    pub tone: StoryTone,
}

impl StoryRequest {
    /// Request carrying only the user's words and defaults, for when analysis is unavailable.
    pub fn fallback(raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            category: StoryCategory::default(),
            characters: Vec::new(),
            themes: Vec::new(),
            setting: DEFAULT_SETTING.to_string(),
            tone: StoryTone::default(),
        }
    }

    /// Apply operator overrides, producing a new request.
    pub fn with_overrides(self, overrides: &RequestOverrides) -> Self {
        let setting = overrides
            .setting
            .as_deref()
            .map(str::trim)
            .filter(|setting| !setting.is_empty())
            .map(str::to_string)
            .unwrap_or(self.setting);
        Self {
            category: overrides.category.unwrap_or(self.category),
            tone: overrides.tone.unwrap_or(self.tone),
            setting,
            ..self
        }
    }

    pub fn characters_line(&self) -> Option<String> {
        (!self.characters.is_empty()).then(|| self.characters.join(", "))
    }

    pub fn themes_line(&self) -> Option<String> {
        (!self.themes.is_empty()).then(|| self.themes.join(", "))
    }
}

/// Operator choices applied to an analyzed request before generation starts.
/// Characters and themes always come from the analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOverrides {
    pub category: Option<StoryCategory>,
    pub tone: Option<StoryTone>,
    pub setting: Option<String>,
}

impl RequestOverrides {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.tone.is_none() && self.setting.is_none()
    }
}
