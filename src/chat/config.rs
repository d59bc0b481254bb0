//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling the chat front end.

use std::env;
use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::client::{DEFAULT_HOST, HOST_ENV_VAR};
use crate::session_store::default_session_path;

/// Session file used when the home directory cannot be determined.
const FALLBACK_SESSION_FILE: &str = ".kbchat-session.json";

/// Command-line arguments for the kbchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Backend host.
    #[arrrg(optional, "Backend host (default: $KBCHAT_HOST or http://127.0.0.1:8000)", "URL")]
    pub host: Option<String>,

    /// File holding the persisted session identifier.
    #[arrrg(optional, "Session file (default: ~/.kbchat/session.json)", "PATH")]
    pub session_file: Option<String>,

    /// Model preselected for new chats.
    #[arrrg(optional, "Model to select for new chats", "MODEL")]
    pub model: Option<String>,

    /// Knowledge-base index preselected for sends.
    #[arrrg(optional, "Knowledge-base index to consult", "INDEX")]
    pub index: Option<String>,

    /// Tip words sent when a chat is created.
    #[arrrg(optional, "Tip words for new chats", "WORDS")]
    pub tip_words: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Log every backend request to stderr.
    #[arrrg(flag, "Log backend requests to stderr")]
    pub verbose: bool,
}

/// Configuration for the chat front end.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Backend host.
    pub host: String,

    /// File holding the persisted session identifier.
    pub session_path: PathBuf,

    /// Model to select once the model list is known.
    pub model: Option<String>,

    /// Index to select once the index list is known.
    pub index: Option<String>,

    /// Tip words sent when a chat is created.
    pub tip_words: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to log backend requests.
    pub verbose: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Host: `$KBCHAT_HOST`, else http://127.0.0.1:8000
    /// - Session file: ~/.kbchat/session.json
    /// - Model and index: whatever the backend lists first / none
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            host: env::var(HOST_ENV_VAR).unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            session_path: default_session_path()
                .unwrap_or_else(|| PathBuf::from(FALLBACK_SESSION_FILE)),
            model: None,
            index: None,
            tip_words: String::new(),
            use_color: true,
            verbose: false,
        }
    }

    /// Sets the backend host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the session file.
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }

    /// Sets the model to select.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Sets the index to select.
    pub fn with_index(mut self, index: Option<String>) -> Self {
        self.index = index;
        self
    }

    /// Sets the tip words.
    pub fn with_tip_words(mut self, tip_words: impl Into<String>) -> Self {
        self.tip_words = tip_words.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Enables request logging.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            host: args.host.unwrap_or(defaults.host),
            session_path: args
                .session_file
                .map(PathBuf::from)
                .unwrap_or(defaults.session_path),
            model: args.model,
            index: args.index,
            tip_words: args.tip_words.unwrap_or_default(),
            use_color: !args.no_color,
            verbose: args.verbose,
        }
    }
}
