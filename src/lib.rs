// Public modules
pub mod accumulator;
pub mod backend;
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod markdown;
pub mod observability;
pub mod render;
pub mod session_store;
pub mod think;
pub mod types;
pub mod utils;
pub mod view;

// Re-exports
pub use accumulator::{TextAccumulator, Utf8Decoder, accumulate, decode_stream};
pub use backend::{Backend, ByteStream};
pub use client::ChatClient;
pub use client_logger::{ClientLogger, StderrLogger};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{CommandEvent, Renderer, TerminalRenderer, UiEvent};
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use think::{ThinkParse, parse_think};
pub use types::*;
pub use view::{MessageView, ReasoningDisplay, render_message};
