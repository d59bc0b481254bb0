//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to manage chats and selections without sending messages
//! to the backend.

/// A parsed chat command.
///
/// These commands control the session and are not sent as chat messages.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Create a chat, optionally titled.
    New(Option<String>),

    /// List the session's chats.
    Chats,

    /// Switch to a chat by list position or identifier.
    Select(String),

    /// Remove a chat by list position or identifier.
    Remove(String),

    /// Clear the context of the current chat.
    Clear,

    /// Change the model used for new chats.
    Model(String),

    /// List the available models.
    Models,

    /// Change the knowledge-base index; "none" disables retrieval.
    Index(String),

    /// List the available indexes.
    Indexes,

    /// Mention an index at the start of the next message.
    At(String),

    /// Set or clear the tip words sent when a chat is created.
    Tip(Option<String>),

    /// Toggle the reasoning of the n-th most recent reply with reasoning.
    Think(usize),

    /// Stop the session on the backend.
    Stop,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use kbchat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/model qwen2.5:7b").is_some());
/// assert!(parse_command("What does the manual say?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "new" => ChatCommand::New(argument.map(|s| s.to_string())),
        "chats" | "list" => ChatCommand::Chats,
        "select" | "open" => required(argument, ChatCommand::Select, "/select requires a chat"),
        "remove" | "rm" => required(argument, ChatCommand::Remove, "/remove requires a chat"),
        "clear" => ChatCommand::Clear,
        "model" => required(argument, ChatCommand::Model, "/model requires a model name"),
        "models" => ChatCommand::Models,
        "index" => required(argument, ChatCommand::Index, "/index requires an index or 'none'"),
        "indexes" => ChatCommand::Indexes,
        "at" => required(argument, ChatCommand::At, "/at requires an index or 'none'"),
        "tip" => ChatCommand::Tip(argument.map(|s| s.to_string())),
        "think" => match argument {
            None => ChatCommand::Think(1),
            Some(arg) => match arg.parse::<usize>() {
                Ok(n) if n >= 1 => ChatCommand::Think(n),
                _ => ChatCommand::Invalid("/think expects a positive integer".to_string()),
            },
        },
        "stop" => ChatCommand::Stop,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn required<F>(argument: Option<&str>, constructor: F, missing: &str) -> ChatCommand
where
    F: Fn(String) -> ChatCommand,
{
    match argument {
        Some(arg) => constructor(arg.to_string()),
        None => ChatCommand::Invalid(missing.to_string()),
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /new [title]           Start a new chat (the first message titles it otherwise)
  /chats                 List chats, most recent first
  /select <n|id>         Switch to a chat
  /remove <n|id>         Remove a chat
  /clear                 Clear the context of the current chat
  /model <name>          Change the model used for new chats
  /models                List available models
  /index <name|none>     Change the knowledge-base index
  /indexes               List available indexes
  /at <name|none>        Mention an index at the start of the next message
  /tip [words]           Set tip words for new chats (no argument clears them)
  /think [n]             Show or hide the reasoning of the n-th latest reply
  /stop                  Stop the session on the backend
  /help                  Show this help message
  /quit                  Exit the chat"#
}
