//! Logging trait for backend client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! the requests passing through the [`ChatClient`](crate::ChatClient).

use std::io::{self, Write};

use url::Url;

use crate::Error;

/// A trait for logging backend client operations.
///
/// # Example
///
/// ```rust,ignore
/// use kbchat::{ClientLogger, Error};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, endpoint: &str, url: &url::Url) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "POST {endpoint} {url}").unwrap();
///     }
///
///     fn log_response(&self, endpoint: &str, status: u16) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{endpoint} -> {status}").unwrap();
///     }
///
///     fn log_error(&self, endpoint: &str, error: &Error) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{endpoint} failed: {error}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request about to be issued.
    fn log_request(&self, endpoint: &str, url: &Url);

    /// Log the status line of a response.
    fn log_response(&self, endpoint: &str, status: u16);

    /// Log a failed request.
    fn log_error(&self, endpoint: &str, error: &Error);

    /// Log a chunk of a streamed reply.
    fn log_stream_chunk(&self, endpoint: &str, bytes: usize) {
        _ = endpoint;
        _ = bytes;
    }
}

/// Writes one line per event to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger {
    chunks: bool,
}

impl StderrLogger {
    /// Creates a logger that reports requests, responses, and errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report every streamed chunk.
    pub fn with_chunks(mut self) -> Self {
        self.chunks = true;
        self
    }

    fn line(&self, line: std::fmt::Arguments<'_>) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[kbchat] {line}");
    }
}

impl ClientLogger for StderrLogger {
    fn log_request(&self, endpoint: &str, url: &Url) {
        self.line(format_args!("POST {endpoint} {url}"));
    }

    fn log_response(&self, endpoint: &str, status: u16) {
        self.line(format_args!("{endpoint} -> {status}"));
    }

    fn log_error(&self, endpoint: &str, error: &Error) {
        self.line(format_args!("{endpoint} failed: {error}"));
    }

    fn log_stream_chunk(&self, endpoint: &str, bytes: usize) {
        if self.chunks {
            self.line(format_args!("{endpoint} chunk: {bytes} bytes"));
        }
    }
}
