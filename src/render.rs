//! Output adapters for message views.
//!
//! This module provides the [`Renderer`] trait that binds [`MessageView`]s and controller
//! state to an actual display, plus the terminal implementation.

use std::io::{self, Stdout, Write};
use std::sync::LazyLock;

use regex::Regex;
use rustyline::DefaultEditor;
use unicode_width::UnicodeWidthStr;

use crate::chat::Selectors;
use crate::markdown::markdown_to_terminal;
use crate::types::MessageId;
use crate::view::{AvatarPlacement, MessageBody, MessageView};

/// ANSI escape code for dim text (used for reasoning).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for reasoning).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the assistant avatar).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the user avatar).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for the reasoning toggle).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for alerts).
const ANSI_RED: &str = "\x1b[31m";

const USER_AVATAR: &str = "[you]";
const ASSISTANT_AVATAR: &str = "[assistant]";

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("ANSI escape pattern is valid")
});

/// An input event that triggered a controller action.
///
/// Handlers receive the event explicitly so that they can stop it from reaching enclosing
/// handlers (for example, a remove button nested inside a selectable chat entry).
pub trait UiEvent {
    /// Prevent the event from reaching enclosing handlers.
    fn stop_propagation(&mut self);

    /// Returns true once propagation has been stopped.
    fn propagation_stopped(&self) -> bool;
}

/// An event raised by a typed command.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandEvent {
    stopped: bool,
}

impl CommandEvent {
    /// Creates a fresh event.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UiEvent for CommandEvent {
    fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    fn propagation_stopped(&self) -> bool {
        self.stopped
    }
}

/// Trait for displaying chat state.
///
/// This abstraction allows for different display strategies:
/// - ANSI terminal output
/// - Plain text without styling (for piping/redirecting)
/// - recording renderers in tests
pub trait Renderer: Send {
    /// Add a message view at the end of the display.
    fn append(&mut self, view: &MessageView);

    /// Replace the content of the message displayed under `id`.
    ///
    /// Returns false, and displays nothing, if no message with that identifier is shown.
    fn replace(&mut self, id: &MessageId, view: &MessageView) -> bool;

    /// Remove every displayed message.
    fn clear(&mut self);

    /// Make the latest message visible.
    fn scroll_to_end(&mut self) {}

    /// Show the model, index, and chat selectors.
    fn show_selectors(&mut self, selectors: &Selectors);

    /// Report a failure to the user.
    fn alert(&mut self, message: &str);

    /// Ask the user a yes/no question.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// The message the cursor sits at the end of.
struct LiveMessage {
    id: MessageId,
    printed: String,
}

/// Terminal renderer with optional ANSI styling.
///
/// A terminal cannot edit arbitrary earlier output, so only the message the cursor is
/// sitting on is updated in place: growth is printed as a suffix and anything else redraws
/// the message (with color) or prints it again (without).  Replacing an older message
/// prints it again at the bottom.
pub struct TerminalRenderer {
    stdout: Stdout,
    use_color: bool,
    width: usize,
    shown: Vec<MessageId>,
    live: Option<LiveMessage>,
    status: Option<String>,
}

impl TerminalRenderer {
    /// Creates a new TerminalRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new TerminalRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|c| c.parse::<usize>().ok())
            .filter(|w| *w > 0)
            .unwrap_or(80);
        Self {
            stdout: io::stdout(),
            use_color,
            width,
            shown: Vec::new(),
            live: None,
            status: None,
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn write(&mut self, text: &str) {
        let _ = self.stdout.write_all(text.as_bytes());
        self.flush();
    }

    /// Terminate the live message so that further output starts on a fresh line.
    fn close_live(&mut self) {
        if self.live.take().is_some() {
            self.write("\n");
        }
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    /// Format a view as the text printed for it, without a trailing newline.
    pub fn format_view(&self, view: &MessageView) -> String {
        let mut content = String::new();
        match &view.body {
            MessageBody::Loading { label } => {
                content.push_str(&self.styled(ANSI_DIM, &format!("... {label}")));
            }
            MessageBody::Content {
                reasoning,
                answer_markdown,
            } => {
                if let Some(panel) = reasoning {
                    let marker = if panel.expanded { "v" } else { ">" };
                    content.push_str(&self.styled(
                        ANSI_YELLOW,
                        &format!("{marker} {} (/think)", panel.toggle_label),
                    ));
                    content.push('\n');
                    if panel.expanded {
                        for line in markdown_to_terminal(&panel.markdown, false).lines() {
                            let line = format!("  | {line}");
                            if self.use_color {
                                content.push_str(&format!(
                                    "{ANSI_DIM}{ANSI_ITALIC}{line}{ANSI_RESET}"
                                ));
                            } else {
                                content.push_str(&line);
                            }
                            content.push('\n');
                        }
                    }
                }
                content.push_str(&markdown_to_terminal(answer_markdown, self.use_color));
            }
        }
        let content = content.trim_end_matches('\n');
        match view.avatar {
            AvatarPlacement::Before => {
                format!("{}\n{content}", self.styled(ANSI_CYAN, ASSISTANT_AVATAR))
            }
            AvatarPlacement::After => {
                format!("{content}\n{}", self.styled(ANSI_GREEN, USER_AVATAR))
            }
        }
    }

    /// Number of terminal rows `text` occupies.
    fn rows(&self, text: &str) -> usize {
        text.split('\n')
            .map(|line| {
                let visible = UnicodeWidthStr::width(ANSI_ESCAPE.replace_all(line, "").as_ref());
                visible.div_ceil(self.width).max(1)
            })
            .sum()
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalRenderer {
    fn append(&mut self, view: &MessageView) {
        self.close_live();
        let text = self.format_view(view);
        self.write(&text);
        match &view.id {
            Some(id) => {
                self.shown.push(id.clone());
                self.live = Some(LiveMessage {
                    id: id.clone(),
                    printed: text,
                });
            }
            None => self.write("\n"),
        }
    }

    fn replace(&mut self, id: &MessageId, view: &MessageView) -> bool {
        if !self.shown.contains(id) {
            return false;
        }
        let text = self.format_view(view);
        match self.live.take() {
            Some(live) if &live.id == id => {
                if let Some(suffix) = text.strip_prefix(live.printed.as_str()) {
                    self.write(suffix);
                } else if self.use_color {
                    let up = self.rows(&live.printed) - 1;
                    if up > 0 {
                        self.write(&format!("\r\x1b[{up}A\x1b[0J"));
                    } else {
                        self.write("\r\x1b[0J");
                    }
                    self.write(&text);
                } else {
                    self.write("\n");
                    self.write(&text);
                }
            }
            other => {
                self.live = other;
                self.close_live();
                self.write(&text);
            }
        }
        self.live = Some(LiveMessage {
            id: id.clone(),
            printed: text,
        });
        true
    }

    fn clear(&mut self) {
        self.close_live();
        self.shown.clear();
        if self.use_color {
            self.write("\x1b[2J\x1b[H");
        }
    }

    fn scroll_to_end(&mut self) {
        self.flush();
    }

    fn show_selectors(&mut self, selectors: &Selectors) {
        let status = selectors.status_line();
        if self.status.as_deref() == Some(status.as_str()) {
            return;
        }
        self.close_live();
        let line = self.styled(ANSI_DIM, &format!("-- {status} --"));
        self.write(&format!("{line}\n"));
        self.status = Some(status);
    }

    fn alert(&mut self, message: &str) {
        self.close_live();
        let line = self.styled(ANSI_RED, &format!("! {message}"));
        eprintln!("{line}");
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.close_live();
        let Ok(mut editor) = DefaultEditor::new() else {
            return false;
        };
        match editor.readline(&format!("{prompt} [y/N] ")) {
            Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn print_info(&mut self, info: &str) {
        self.close_live();
        self.write(&format!("{info}\n"));
    }
}
