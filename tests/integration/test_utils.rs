//! Shared test utilities for integration tests
//!
//! Scripted gateways, canned model replies, and isolated config directories.

use std::sync::Mutex;
use storyloom::gateway::{CallGateway, RetryPolicy};
use storyloom::provider::ScriptedProvider;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const CAPTURED_VARS: [&str; 4] = [
    "HOME",
    "XDG_CONFIG_HOME",
    "STORYLOOM__PIPELINE__JUDGE_THRESHOLD",
    "STORYLOOM__PROVIDER__MODEL",
];

/// Environment variable state to restore after test
struct EnvState {
    vars: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            vars: CAPTURED_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.vars {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into `test_dir` and no
/// `STORYLOOM__*` overrides set. The original environment is restored afterwards.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_config_home = test_dir.path().join("config");
    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_config_home).unwrap();
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_config_home.to_str().unwrap());
    for name in &CAPTURED_VARS[2..] {
        std::env::remove_var(name);
    }

    let result = f();
    env_state.restore();
    result
}

/// Gateway over `provider` with no backoff waits.
pub fn scripted_gateway(provider: &ScriptedProvider, attempts: usize) -> CallGateway {
    CallGateway::new(Box::new(provider.clone()), RetryPolicy::immediate(attempts))
}

pub fn analysis_reply() -> String {
    "CATEGORY: adventure\n\
     CHARACTERS: Pip the penguin, Old Walrus\n\
     THEMES: courage, friendship\n\
     SETTING: an icy harbor\n\
     TONE: exciting"
        .to_string()
}

pub fn story_reply(title: &str, body: &str) -> String {
    format!("TITLE: {title}\nSTORY:\n{body}\nMORAL: Brave hearts help friends.")
}

pub fn verdict_reply(score: u8, suggestion: &str) -> String {
    format!(
        "OVERALL_SCORE: {score}\n\
         AGE_APPROPRIATENESS: 8\n\
         ENGAGEMENT: {score}\n\
         MORAL_CLARITY: 6\n\
         STORY_STRUCTURE: 7\n\
         LANGUAGE_QUALITY: 7\n\
         FEEDBACK: Round critique for score {score}.\n\
         SUGGESTIONS:\n\
         - {suggestion}"
    )
}

pub fn choices_reply(first: &str, second: &str) -> String {
    format!("CHOICE_1: {first}\nCHOICE_2: {second}")
}

pub fn beat_reply(beat: &str, moral: Option<&str>) -> String {
    match moral {
        Some(moral) => format!("CONTINUATION:\n{beat}\nMORAL: {moral}"),
        None => format!("CONTINUATION:\n{beat}"),
    }
}
