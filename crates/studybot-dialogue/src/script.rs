//! The study script: the hidden system instructions plus the fixed texts
//! the instructions ask the model to reproduce.

use std::path::Path;

use studybot_core::config::StudyConfig;
use studybot_core::utils::expand_home;
use studybot_core::ConfigError;

/// Sentinel the model emits as its last line once the scripted dialogue is over.
pub const END_MARKER: &str = "[END_OF_CHAT]";

/// Survey participants are sent back to when no override is configured.
pub const DEFAULT_SURVEY_URL: &str = "https://asu.co1.qualtrics.com/jfe/preview/previewId/62fdf4cc-a69f-4255-a321-4d795485d826/SV_3rutUOKtHWkQaA6?Q_CHL=preview&Q_SurveyVersionID=current";

/// Fixed reply for questions outside Internet troubleshooting.
pub const REFUSAL_TEXT: &str = "I am sorry. I was only trained to handle Internet connectivity issues. Please contact Reihane Boghrati if you have any additional inquires unrelated to the WiFi troubleshooting.";

/// Shown by front-ends once the chat is closed.
pub const CLOSED_NOTICE: &str =
    "End of chat. Thank you! Please return to the survey to complete all questions.";

/// Fixed troubleshooting instructions for slow mobile WiFi.
pub const TROUBLESHOOTING_STEPS: &str = "Sure, I can help you with a solution for slow mobile internet.

Here is a step by step guide to troubleshoot your Mobile WiFi issue:

Restart your phone/tablet
o\tPower off the device, wait 10 seconds, and turn it back on.
Forget and reconnect to the WiFi network
o\tGo to Settings > WiFi > Select the network > Forget
o\tReconnect and re-enter the password carefully.
Check data balance (if using cellular hotspot)
o\tEnsure your data plan allows hotspot usage.
o\tSome carriers throttle hotspot speeds or restrict access after usage limits.";

const PROMPT_TEMPLATE: &str = r#"You are an AI customer service agent. Your goal is to offer Internet support.

First, introduce yourself pro-actively: "Hello. I'm a bot assistant Jerry. Please provide your Prolific ID below:"

Wait for the user to provide a Prolific ID.

Next ask the user: "How can I assist you with your Internet issue today?". Wait for a response from the user.

Next, if the user inquires about WiFi troubleshooting or slow WiFi, provide the mobile Internet instructions exactly as written below:

"{steps}"

After you provide the instructions, thank the user and express hope that the answer was helpful.
You must instruct the user to proceed back to the survey to complete all questions about their experience: {survey_url}

If at any point the user asks questions not related to the modem troubleshooting, reply: "{refusal}"

IMPORTANT BEHAVIOR:
- On the first assistant turn (no prior user messages), output ONLY the greeting and the request for the Prolific ID, then ask how you can assist. Do NOT include troubleshooting steps and do NOT end the chat.
- Provide the troubleshooting steps only after the user asks about WiFi issues / slow internet.
- After you have provided the troubleshooting instructions and directed the user back to the survey, end your message with a single line containing exactly:
{marker}
Do not write anything after that token.
"#;

/// The system instructions a session starts with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    system_prompt: String,
}

impl Default for Script {
    fn default() -> Self {
        Self::builtin(None)
    }
}

impl Script {
    /// The built-in WiFi study script, optionally pointing at another survey.
    pub fn builtin(survey_url: Option<&str>) -> Self {
        let survey_url = survey_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_SURVEY_URL);

        let system_prompt = PROMPT_TEMPLATE
            .replace("{steps}", TROUBLESHOOTING_STEPS)
            .replace("{survey_url}", survey_url)
            .replace("{refusal}", REFUSAL_TEXT)
            .replace("{marker}", END_MARKER);

        Self { system_prompt }
    }

    /// Use `system_prompt` verbatim.
    pub fn custom(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// Read a script file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        std::fs::read_to_string(path)
            .map(Self::custom)
            .map_err(|source| ConfigError::Script {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Pick the script described by the `study` config section.
    pub fn from_config(config: &StudyConfig) -> Result<Self, ConfigError> {
        match config.system_prompt_file.as_deref() {
            Some(file) if !file.trim().is_empty() => Self::from_file(&expand_home(file.trim())),
            _ => Ok(Self::builtin(config.survey_url.as_deref())),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}
