//! The chat front end.
//!
//! This module holds everything between the backend client and the display:
//!
//! - Session bootstrap, chat selection, and streamed sends
//! - Model, index, and chat selectors
//! - Slash commands for session control
//!
//! # Architecture
//!
//! - [`controller`]: the state machine driving a [`Backend`](crate::Backend) and a
//!   [`Renderer`](crate::render::Renderer)
//! - [`selectors`]: model/index/chat lists and the current selection
//! - [`transcript`]: displayed messages and their reasoning display state
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: slash command parsing

pub mod commands;
pub mod config;
pub mod controller;
pub mod mention;
pub mod selectors;
pub mod transcript;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use controller::{
    ChatController, ControllerState, DEFAULT_CHAT_TITLE, REQUEST_ERROR_PREFIX, SendOutcome,
};
pub use mention::insert_index_mention;
pub use selectors::{NO_INDEX, Selectors};
pub use transcript::{Transcript, TranscriptEntry};
