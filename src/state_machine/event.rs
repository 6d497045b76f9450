//! Events that can occur in an intake conversation

use regex::Regex;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Start-collection trigger (begins or restarts the dialogue)
    Start,
    /// Welcome/help trigger, answered without touching the dialogue
    Welcome,
    /// Any other text message
    Text(String),
}

/// Default pattern for the start-collection command
pub const DEFAULT_START_PATTERN: &str = r"/add";
/// Default pattern for the welcome command
pub const DEFAULT_WELCOME_PATTERN: &str = r"/start";

/// Recognizes the two trigger categories in inbound text
#[derive(Debug, Clone)]
pub struct Triggers {
    start: Regex,
    welcome: Regex,
}

impl Triggers {
    pub fn new(start: &str, welcome: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            start: Regex::new(start)?,
            welcome: Regex::new(welcome)?,
        })
    }

    /// Map inbound text to an event. Start-collection takes precedence
    /// when a message matches both patterns.
    pub fn classify(&self, text: &str) -> Event {
        if self.start.is_match(text) {
            Event::Start
        } else if self.welcome.is_match(text) {
            Event::Welcome
        } else {
            Event::Text(text.to_string())
        }
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Self {
            start: Regex::new(DEFAULT_START_PATTERN).expect("default start pattern is valid"),
            welcome: Regex::new(DEFAULT_WELCOME_PATTERN).expect("default welcome pattern is valid"),
        }
    }
}
