//! Instruction sets and prompt builders for every generation role.
//!
//! Each builder returns plain text. The layouts requested here are the ones the
//! [`crate::extract`] parsers read back.

use crate::story::{FeedbackHistory, JudgeFeedback, Story, StoryCategory, StoryRequest};

pub const ANALYZER_INSTRUCTIONS: &str = "You are a story request analyzer for a children's bedtime story generator (ages 5-10).
Analyze the user's request and extract structured information.

Respond ONLY in this exact format (one per line):
CATEGORY: [adventure|fantasy|animal|friendship|bedtime|educational|funny]
CHARACTERS: [comma-separated list of characters mentioned or suggested]
THEMES: [comma-separated list of themes like courage, friendship, kindness, curiosity]
SETTING: [where the story takes place]
TONE: [whimsical|exciting|calming|humorous|heartwarming|inspiring]

If information is not provided, make reasonable child-friendly suggestions.
Do not add extra lines.
";

const STORYTELLER_BASE: &str = "You are a master children's storyteller creating bedtime stories for ages 5-10.

STORY STRUCTURE (Follow the classic story arc):
1. OPENING: Introduce the main character and their world in a cozy, inviting way
2. INCITING INCIDENT: Something happens that starts the adventure
3. RISING ACTION: The character faces challenges and meets helpers
4. CLIMAX: The most exciting moment where the character must be brave/clever/kind
5. FALLING ACTION: The problem begins to resolve
6. RESOLUTION: A satisfying, peaceful ending perfect for bedtime

GUIDELINES:
- Use simple, vivid language that children can understand
- Include sensory details (colors, sounds, textures)
- Add gentle repetition and rhythm where appropriate
- Include dialogue to bring characters to life
- Ensure a clear, positive moral lesson
- End with a calming, sleep-inducing conclusion
- Story length: 400-600 words
- Avoid scary elements, violence, or anything inappropriate for young children

FORMAT YOUR RESPONSE AS:
TITLE: [Story Title]
STORY:
[The full story text]
MORAL: [The lesson of the story in one sentence]";

fn category_focus(category: StoryCategory) -> &'static str {
    match category {
        StoryCategory::Adventure => "ADVENTURE FOCUS: Include exciting discoveries, brave choices, and exploration. The character should show courage but always stay safe.",
        StoryCategory::Fantasy => "FANTASY FOCUS: Include magical elements like talking animals, enchanted objects, or gentle magic. Keep magic whimsical and wonder-inducing.",
        StoryCategory::Animal => "ANIMAL FOCUS: Feature animals with relatable personalities. Show their natural behaviors mixed with child-like emotions and adventures.",
        StoryCategory::Friendship => "FRIENDSHIP FOCUS: Emphasize cooperation, sharing, understanding differences, and the joy of having friends.",
        StoryCategory::Bedtime => "BEDTIME FOCUS: Create a soothing atmosphere. Include cozy imagery like warm blankets, twinkling stars, and peaceful nights.",
        StoryCategory::Educational => "EDUCATIONAL FOCUS: Weave in a learning element naturally (counting, colors, nature facts, kindness lessons).",
        StoryCategory::Funny => "HUMOR FOCUS: Include silly situations, playful wordplay, and gentle humor that makes children giggle.",
    }
}

/// Shared storyteller instructions plus the category's focus paragraph.
pub fn storyteller_instructions(category: StoryCategory) -> String {
    format!("{STORYTELLER_BASE}\n\n{}", category_focus(category))
}

pub const JUDGE_INSTRUCTIONS: &str = "You are a careful children's literature critic.

SCORING RULES:
- Round 1: Be critical. Cap scores at 6/10 unless perfection.
- Round 2+: REWARD IMPROVEMENT. If the story fixed previous issues, the score MUST go up.
- Be honest. If it got worse, lower the score.

EVALUATION CRITERIA (1-10):
1. AGE_APPROPRIATENESS (Vocabulary suitable for 5-10?)
2. ENGAGEMENT (Is it boring?)
3. MORAL_CLARITY (Is the lesson clear?)
4. STORY_STRUCTURE (Beginning, Middle, End?)
5. LANGUAGE_QUALITY (Vivid descriptions?)

IMPORTANT FORMATTING:
- Your FEEDBACK section must be a single paragraph summary.
- Do NOT list the scores again inside the FEEDBACK section.
- Put detailed bullet points ONLY in the SUGGESTIONS section.

Respond in this exact format:
OVERALL_SCORE: [1-10]
AGE_APPROPRIATENESS: [1-10]
ENGAGEMENT: [1-10]
MORAL_CLARITY: [1-10]
STORY_STRUCTURE: [1-10]
LANGUAGE_QUALITY: [1-10]
FEEDBACK: [2-3 sentences summarizing the critique. Do not repeat scores here.]
SUGGESTIONS:
- [bullet 1]
- [bullet 2]
";

pub const CHOICE_INSTRUCTIONS: &str = "You help create interactive bedtime stories for children ages 5-10.
Given the story so far, propose EXACTLY two safe, child-friendly options for what could happen next.

RULES:
- No violence, gore, self-harm, abuse, hate, or sexual content
- Avoid scary elements (no monsters that harm, no kidnapping, no realistic danger)
- Keep each option to ONE short sentence
- Options should be meaningfully different

OUTPUT FORMAT (exactly two lines):
CHOICE_1: ...
CHOICE_2: ...
";

pub fn analysis_prompt(user_text: &str) -> String {
    format!("Analyze this bedtime story request: {user_text}")
}

pub fn draft_prompt(request: &StoryRequest) -> String {
    format!(
        "Create a bedtime story with these elements:\n\
         - Characters: {}\n\
         - Themes: {}\n\
         - Setting: {}\n\
         - Tone: {}\n\
         - Original request: \"{}\"\n",
        request
            .characters_line()
            .unwrap_or_else(|| "Create appropriate characters".to_string()),
        request
            .themes_line()
            .unwrap_or_else(|| "friendship and kindness".to_string()),
        request.setting,
        request.tone,
        request.raw_input,
    )
}

/// Judge prompt for a 1-based round; `history` holds every earlier round.
pub fn judge_prompt(
    story: &Story,
    request: &StoryRequest,
    round: usize,
    history: &FeedbackHistory,
) -> String {
    let round_context = if round <= 1 {
        "This is a first draft. Be extremely critical. Do not give a score higher than 6 unless it is a masterpiece.".to_string()
    } else {
        format!(
            "This is revision #{round}. Check if they fixed the previous issues. You can raise the score if they did."
        )
    };
    let previous = if history.is_empty() {
        String::new()
    } else {
        format!("PRIOR FEEDBACK:\n{}\n", history.to_context_text())
    };

    format!(
        "Evaluate this draft (Round {round}):\n\n\
         REQUEST: \"{}\"\n\
         CATEGORY: {}\n\
         TONE: {}\n\n\
         STORY:\n{}\n\n\
         CONTEXT:\n{round_context}\n{previous}",
        request.raw_input,
        request.category,
        request.tone,
        story.to_context_text(),
    )
}

fn request_details(request: &StoryRequest) -> String {
    format!(
        "REQUEST DETAILS:\n- Category: {}\n- Tone: {}\n- Setting: {}",
        request.category, request.tone, request.setting
    )
}

/// Full-rewrite prompt driven by the most recent verdict only.
pub fn refine_prompt(story: &Story, request: &StoryRequest, latest: &JudgeFeedback) -> String {
    format!(
        "Revise this children's story using the judge's critique.\n\n\
         GOALS:\n\
         - Keep it suitable for ages 5-10\n\
         - Match the requested category, tone, and setting\n\
         - Keep the moral positive and not preachy\n\
         - Improve weak areas called out by the judge\n\n\
         {}\n\n\
         CURRENT STORY:\n{}\n\n\
         IMPROVEMENT NOTES:\n{}\n\n\
         Return the full revised story in this format:\n\
         TITLE: [Title]\n\
         STORY:\n\
         [Full story]\n\
         MORAL: [Moral]\n",
        request_details(request),
        story.to_context_text(),
        latest.improvement_notes(),
    )
}

/// Rewrite prompt for a change the reader asked for.
pub fn revision_prompt(story: &Story, request: &StoryRequest, instruction: &str) -> String {
    format!(
        "The user wants changes to this story.\n\n\
         {}\n\n\
         CURRENT STORY:\n{}\n\n\
         USER'S REQUEST: \"{instruction}\"\n\n\
         Please modify the story to incorporate the user's feedback while maintaining:\n\
         - Age-appropriate content (5-10 years)\n\
         - A clear story arc (opening, challenge, climax, resolution)\n\
         - A positive moral lesson\n\
         - The requested category, tone, and setting\n\n\
         Format your response as:\n\
         TITLE: [Title]\n\
         STORY:\n\
         [Full modified story]\n\
         MORAL: [Moral]\n",
        request_details(request),
        story.to_context_text(),
    )
}

pub fn choice_prompt(story: &Story, request: &StoryRequest, step: usize, total_steps: usize) -> String {
    format!(
        "Propose two next-step options.\n\n\
         CONTEXT:\n\
         - Interactive step: {step} of {total_steps}\n\
         - Requested category: {}\n\
         - Tone: {}\n\
         - Setting: {}\n\n\
         STORY SO FAR:\n{}\n",
        request.category,
        request.tone,
        request.setting,
        story.to_context_text(),
    )
}

/// Continuation prompt; the final step must resolve the story and give a moral, earlier
/// steps must leave it open and give none.
pub fn continuation_prompt(
    story: &Story,
    option: &str,
    step: usize,
    total_steps: usize,
) -> String {
    let mut prompt = format!(
        "Continue the bedtime story in an interactive way.\n\n\
         STORY SO FAR:\n{}\n\n\
         USER CHOSEN OPTION:\n{option}\n\n\
         CONSTRAINTS:\n\
         - Ages 5-10, safe and not scary\n\
         - Keep it consistent with the setting and tone\n\
         - Write 120-200 words\n\
         - Continue smoothly from the last sentence\n",
        story.to_context_text(),
    );

    if step >= total_steps {
        prompt.push_str(
            "\nFINAL STEP:\n\
             - Resolve the story with a satisfying, cozy ending\n\
             - Include a short calming closing that feels bedtime-ready\n\
             - Output a MORAL in one sentence\n\n\
             OUTPUT FORMAT:\n\
             CONTINUATION:\n\
             [continuation text]\n\
             MORAL: [one sentence]\n",
        );
    } else {
        prompt.push_str(
            "\nNOT FINAL YET:\n\
             - End with a gentle, curious moment (not scary) that invites the next choice\n\
             - Do NOT include a moral yet\n\n\
             OUTPUT FORMAT:\n\
             CONTINUATION:\n\
             [continuation text]\n",
        );
    }
    prompt
}
