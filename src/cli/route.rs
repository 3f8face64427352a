//! CLI route: single dispatch table from parsed commands to the story pipeline.
//! Interactive prompts (dialoguer) live here; formatting is delegated to presentation.

use crate::analyzer::RequestAnalyzer;
use crate::branching::{BranchEnd, BranchingSession, ChoiceSelector, Selection};
use crate::cli::help::command_name;
use crate::cli::output::map_error;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_config, format_feedback_table, format_latest_feedback, format_request_json,
    format_request_text, format_round_score, format_stop_reason, format_story_text,
    format_tell_json, format_tell_text, TellReport,
};
use crate::config::{ConfigLoader, PipelineConfig, StoryloomConfig};
use crate::error::ApiError;
use crate::export::StoryExport;
use crate::gateway::CallGateway;
use crate::refinement::{LoopState, RefinementOutcome, RefinementSession, StoryReviser};
use crate::story::{
    setting_from_selection, Choice, ChoiceProposal, ContinuationResult, RequestOverrides, Story,
    StoryCategory, StoryRequest, StoryTone, PRESET_SETTINGS,
};
use dialoguer::{Input, Select};
use std::future::Future;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// CLI context: loaded configuration plus an optional pre-built gateway.
pub struct RunContext {
    config: StoryloomConfig,
    gateway: Option<CallGateway>,
    color: bool,
}

impl RunContext {
    /// Load and validate configuration. `config_path` replaces the global and workspace files.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => ConfigLoader::load(Path::new("."))?,
        };
        config.ensure_valid()?;
        Ok(Self {
            config,
            gateway: None,
            color: std::io::stdout().is_terminal(),
        })
    }

    /// Context that talks through `gateway` instead of building one from configuration.
    pub fn with_gateway(config: StoryloomConfig, gateway: CallGateway) -> Self {
        Self {
            config,
            gateway: Some(gateway),
            color: false,
        }
    }

    pub fn config(&self) -> &StoryloomConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let name = command_name(command);
        let started = Instant::now();
        info!(command = name, "Command started");

        let result = match command {
            Commands::Tell {
                idea,
                category,
                tone,
                setting,
                choices,
                save,
                format,
                quiet_judge,
            } => self.handle_tell(TellOptions {
                idea,
                overrides: overrides_from_flags(
                    category.as_deref(),
                    tone.as_deref(),
                    setting.as_deref(),
                ),
                choices: *choices,
                save: save.as_ref(),
                format,
                include_feedback: !*quiet_judge,
            }),
            Commands::Analyze { idea, format } => self.handle_analyze(idea, format),
            Commands::Session => self.handle_session(),
            Commands::Config { format } => format_config(&self.config, format),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(command = name, elapsed_ms, "Command finished"),
            Err(e) => warn!(command = name, elapsed_ms, error = %e, "Command failed"),
        }
        result
    }

    fn pipeline(&self) -> &PipelineConfig {
        &self.config.pipeline
    }

    /// Run `f` against the injected gateway, or one built from the provider configuration.
    /// Commands that never call the model do not need a usable provider.
    fn using_gateway<T>(
        &self,
        f: impl FnOnce(&CallGateway) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        match &self.gateway {
            Some(gateway) => f(gateway),
            None => {
                let gateway = CallGateway::from_config(&self.config.provider, &self.config.retry)?;
                info!(
                    provider = gateway.provider_name(),
                    model = gateway.model_name(),
                    "Gateway ready"
                );
                f(&gateway)
            }
        }
    }

    fn handle_analyze(&self, idea: &str, format: &str) -> Result<String, ApiError> {
        check_format(format)?;
        let request = self.using_gateway(|gateway| {
            block_on(RequestAnalyzer::new(gateway, self.pipeline()).analyze(idea))?
        })?;
        match format {
            "json" => format_request_json(&request),
            _ => Ok(format_request_text(&request)),
        }
    }

    fn handle_tell(&self, options: TellOptions<'_>) -> Result<String, ApiError> {
        check_format(options.format)?;
        let show_progress = options.format == "text" && options.include_feedback;
        let threshold = self.pipeline().judge_threshold;

        let (request, outcome, story, branch_end) = self.using_gateway(|gateway| {
            block_on(async {
                let request = RequestAnalyzer::new(gateway, self.pipeline())
                    .analyze_with(options.idea, &options.overrides)
                    .await?;
                let outcome =
                    refine_with_progress(gateway, self.pipeline(), &request, show_progress, self.color)
                        .await?;
                let (story, branch_end) = if options.choices {
                    self.branch(gateway, &request, outcome.story.clone()).await
                } else {
                    (outcome.story.clone(), None)
                };
                Ok::<_, ApiError>((request, outcome, story, branch_end))
            })?
        })?;

        let mut report = TellReport::new(
            &request,
            &story,
            &outcome.history,
            outcome.stop_reason,
            threshold,
        );
        report.branch_end = branch_end;
        report.saved_to = match options.save {
            Some(Some(path)) => Some(StoryExport::write(path, &story)?),
            Some(None) => Some(StoryExport::write(Path::new("."), &story)?),
            None => None,
        };

        match options.format {
            "json" => format_tell_json(&report),
            _ => Ok(format_tell_text(&report, options.include_feedback, self.color)),
        }
    }

    /// Interactive branching. A failed step ends the mode but keeps every committed beat.
    async fn branch(
        &self,
        gateway: &CallGateway,
        request: &StoryRequest,
        story: Story,
    ) -> (Story, Option<BranchEnd>) {
        let mut session = BranchingSession::new(gateway, self.pipeline(), request.clone(), story);
        let mut selector = PromptSelector {
            out: std::io::stderr(),
            color: std::io::stderr().is_terminal(),
        };
        let end = match session.run(&mut selector).await {
            Ok(end) => Some(end),
            Err(e) => {
                warn!(beats = session.beats(), error = %e, "Interactive mode interrupted");
                eprintln!("{}", map_error(&e));
                None
            }
        };
        (session.into_story(), end)
    }

    fn handle_session(&self) -> Result<String, ApiError> {
        self.using_gateway(|gateway| {
            let runtime = runtime()?;
            let mut told = 0usize;
            println!("Welcome to Storyloom! Let's make a bedtime story together.\n");

            'stories: loop {
                let Some(request) = self.prompt_request(gateway, &runtime)? else {
                    break;
                };
                println!("\n{}\n", format_request_text(&request));

                let outcome = match runtime.block_on(refine_with_progress(
                    gateway,
                    self.pipeline(),
                    &request,
                    true,
                    self.color,
                )) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        eprintln!("{}", map_error(&e));
                        continue;
                    }
                };
                self.print_outcome(&outcome);
                let mut story = outcome.story;
                told += 1;

                loop {
                    match prompt_session_action()? {
                        SessionAction::Revise => {
                            let instruction: String = Input::new()
                                .with_prompt("What would you like to change?")
                                .allow_empty(true)
                                .interact_text()?;
                            if instruction.trim().is_empty() {
                                continue;
                            }
                            let reviser = StoryReviser::new(gateway, self.pipeline());
                            match runtime.block_on(reviser.revise(&story, &request, &instruction)) {
                                Ok(revised) => {
                                    story = revised;
                                    println!("\n{}\n", format_story_text(&story, self.color));
                                }
                                Err(e) => eprintln!("{}", map_error(&e)),
                            }
                        }
                        SessionAction::Regenerate => {
                            match runtime.block_on(refine_with_progress(
                                gateway,
                                self.pipeline(),
                                &request,
                                true,
                                self.color,
                            )) {
                                Ok(outcome) => {
                                    self.print_outcome(&outcome);
                                    story = outcome.story;
                                }
                                Err(e) => eprintln!("{}", map_error(&e)),
                            }
                        }
                        SessionAction::Choices => {
                            let (continued, end) =
                                runtime.block_on(self.branch(gateway, &request, story.clone()));
                            story = continued;
                            if end.is_some() {
                                println!("\n{}\n", format_story_text(&story, self.color));
                            }
                        }
                        SessionAction::Save => {
                            let target: String = Input::new()
                                .with_prompt("Save to")
                                .default(StoryExport::file_name(&story))
                                .interact_text()?;
                            match StoryExport::write(Path::new(target.trim()), &story) {
                                Ok(path) => println!("Saved to {}", path.display()),
                                Err(e) => eprintln!("{}", map_error(&e)),
                            }
                        }
                        SessionAction::NewStory => continue 'stories,
                        SessionAction::Quit => break 'stories,
                    }
                }
            }

            Ok(format!(
                "Goodnight! {} {} told.",
                told,
                if told == 1 { "story" } else { "stories" }
            ))
        })
    }

    /// Idea plus category, tone and setting menus. `None` when the idea is left empty.
    fn prompt_request(
        &self,
        gateway: &CallGateway,
        runtime: &tokio::runtime::Runtime,
    ) -> Result<Option<StoryRequest>, ApiError> {
        let idea: String = Input::new()
            .with_prompt("What should tonight's story be about? (empty to quit)")
            .allow_empty(true)
            .interact_text()?;
        let idea = idea.trim().to_string();
        if idea.is_empty() {
            return Ok(None);
        }

        let mut categories = vec![DECIDE_FROM_IDEA.to_string()];
        categories.extend(
            StoryCategory::ALL
                .iter()
                .map(|c| format!("{} - {}", c, c.describe())),
        );
        let category = Select::new()
            .with_prompt("Story category")
            .items(&categories)
            .default(0)
            .interact()?;

        let mut tones = vec![DECIDE_FROM_IDEA.to_string()];
        tones.extend(
            StoryTone::ALL
                .iter()
                .map(|t| format!("{} - {}", t, t.describe())),
        );
        let tone = Select::new()
            .with_prompt("Story tone")
            .items(&tones)
            .default(0)
            .interact()?;

        let mut settings = vec![DECIDE_FROM_IDEA.to_string()];
        settings.extend(PRESET_SETTINGS.iter().map(|(label, _)| label.to_string()));
        settings.push("Somewhere else (describe it)".to_string());
        let setting_index = Select::new()
            .with_prompt("Story setting")
            .items(&settings)
            .default(0)
            .interact()?;
        let setting = match setting_index {
            0 => None,
            i if i <= PRESET_SETTINGS.len() => Some(PRESET_SETTINGS[i - 1].1.to_string()),
            _ => Some(
                Input::<String>::new()
                    .with_prompt("Describe the setting")
                    .allow_empty(true)
                    .interact_text()?,
            ),
        };

        let overrides = RequestOverrides {
            category: category.checked_sub(1).map(|i| StoryCategory::ALL[i]),
            tone: tone.checked_sub(1).map(|i| StoryTone::ALL[i]),
            setting,
        };

        let analyzer = RequestAnalyzer::new(gateway, self.pipeline());
        let request = match runtime.block_on(analyzer.analyze_with(&idea, &overrides)) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Analysis unavailable, continuing with defaults");
                eprintln!("{} Using your choices and defaults instead.", map_error(&e));
                StoryRequest::fallback(idea).with_overrides(&overrides)
            }
        };
        Ok(Some(request))
    }

    fn print_outcome(&self, outcome: &RefinementOutcome) {
        println!("\n{}\n", format_story_text(&outcome.story, self.color));
        println!("{}", format_feedback_table(&outcome.history));
        if let Some(latest) = outcome.history.latest() {
            println!("{}", format_latest_feedback(latest));
        }
        println!(
            "{}\n",
            format_stop_reason(
                &outcome.stop_reason,
                self.pipeline().judge_threshold,
                self.color
            )
        );
    }
}

const DECIDE_FROM_IDEA: &str = "Decide from my idea";

struct TellOptions<'a> {
    idea: &'a str,
    overrides: RequestOverrides,
    choices: bool,
    save: Option<&'a Option<PathBuf>>,
    format: &'a str,
    include_feedback: bool,
}

fn overrides_from_flags(
    category: Option<&str>,
    tone: Option<&str>,
    setting: Option<&str>,
) -> RequestOverrides {
    RequestOverrides {
        category: category.map(StoryCategory::from_selection),
        tone: tone.map(StoryTone::from_selection),
        setting: setting.map(setting_from_selection),
    }
}

fn check_format(format: &str) -> Result<(), ApiError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(ApiError::Input(format!(
            "Unsupported output format '{}' (expected text or json)",
            other
        ))),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, ApiError> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

fn block_on<F: Future>(future: F) -> Result<F::Output, ApiError> {
    Ok(runtime()?.block_on(future))
}

/// Drive the refinement loop, reporting each verdict on stderr when `show` is set.
async fn refine_with_progress(
    gateway: &CallGateway,
    pipeline: &PipelineConfig,
    request: &StoryRequest,
    show: bool,
    color: bool,
) -> Result<RefinementOutcome, ApiError> {
    let mut session = RefinementSession::new(gateway, pipeline, request.clone());
    if show {
        eprintln!("Writing the first draft...");
    }
    loop {
        let state = session.step().await?;
        if !show {
            if session.is_done() {
                break;
            }
            continue;
        }
        match state {
            LoopState::Judging => eprintln!("Draft {} ready, asking the judge...", session.drafts()),
            LoopState::Refining | LoopState::Done(_) => {
                if let Some(latest) = session.history().latest() {
                    eprintln!(
                        "{}",
                        format_round_score(
                            session.history().len(),
                            latest.overall,
                            pipeline.judge_threshold,
                            color
                        )
                    );
                }
                if state == LoopState::Refining {
                    eprintln!("Refining the story...");
                }
            }
            LoopState::Drafting => {}
        }
        if session.is_done() {
            break;
        }
    }
    session
        .into_outcome()
        .ok_or_else(|| ApiError::ProviderError("refinement loop ended early".to_string()))
}

enum SessionAction {
    Revise,
    Regenerate,
    Choices,
    Save,
    NewStory,
    Quit,
}

fn prompt_session_action() -> Result<SessionAction, ApiError> {
    let items = [
        "Revise with my feedback",
        "Write it again from scratch",
        "Continue with choices",
        "Save to a file",
        "New story",
        "Quit",
    ];
    let selection = Select::new()
        .with_prompt("What next?")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(match selection {
        0 => SessionAction::Revise,
        1 => SessionAction::Regenerate,
        2 => SessionAction::Choices,
        3 => SessionAction::Save,
        4 => SessionAction::NewStory,
        _ => SessionAction::Quit,
    })
}

/// Asks the reader at the terminal: option 1, option 2, or stop.
/// Step banners and beats go to `out` (stderr in the CLI) so stdout only carries the report.
struct PromptSelector<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> ChoiceSelector for PromptSelector<W> {
    fn select(&mut self, step: usize, total_steps: usize, proposal: &ChoiceProposal) -> Selection {
        let _ = writeln!(self.out, "\nStep {} of {}: what happens next?", step, total_steps);
        let items = [
            format!("1. {}", proposal.first()),
            format!("2. {}", proposal.second()),
            "Stop here".to_string(),
        ];
        match Select::new().items(&items).default(0).interact() {
            Ok(0) => Selection::Pick(Choice::First),
            Ok(1) => Selection::Pick(Choice::Second),
            Ok(_) => Selection::Stop,
            Err(e) => {
                warn!(error = %e, "Choice prompt failed, stopping");
                Selection::Stop
            }
        }
    }

    fn on_beat(&mut self, _step: usize, beat: &ContinuationResult, story: &Story) {
        let _ = writeln!(self.out, "\n{}", beat.beat);
        if let Some(moral) = &beat.moral {
            let _ = writeln!(self.out, "\nMoral: {}", moral);
            let _ = writeln!(self.out, "\n{}", format_story_text(story, self.color));
        }
    }
}
