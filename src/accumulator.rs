//! Incremental decoding and accumulation of streamed replies.
//!
//! The backend streams its reply as plain UTF-8 text with arbitrary chunk boundaries.  Bytes
//! are decoded as they arrive, partial multi-byte sequences are held back until the rest of
//! the sequence shows up, and the decoded fragments are folded into one growing string that
//! is redisplayed after every fragment.

use std::char::REPLACEMENT_CHARACTER;
use std::str;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::Result;
use crate::observability::{STREAM_BYTES, STREAM_CHUNKS, STREAM_ERRORS};
use crate::types::MessageId;

/// Streaming UTF-8 decoder.
///
/// Invalid sequences decode to U+FFFD; incomplete trailing sequences are buffered until the
/// next call to [`Utf8Decoder::decode`] or flushed by [`Utf8Decoder::finish`].
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Creates a decoder with nothing buffered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes`, returning all text that is complete so far.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.pending.len());
        let mut pos = 0;
        let rest = loop {
            match str::from_utf8(&self.pending[pos..]) {
                Ok(text) => {
                    out.push_str(text);
                    break self.pending.len();
                }
                Err(err) => {
                    let valid = pos + err.valid_up_to();
                    if let Ok(text) = str::from_utf8(&self.pending[pos..valid]) {
                        out.push_str(text);
                    }
                    match err.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT_CHARACTER);
                            pos = valid + len;
                        }
                        None => break valid,
                    }
                }
            }
        };
        self.pending.drain(..rest);
        out
    }

    /// Returns true if a partial sequence is buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Flush whatever is buffered at end of stream.
    pub fn finish(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        out
    }
}

/// Turn a byte stream into a lazy, finite sequence of decoded text fragments.
///
/// Fragments are never empty.  A transport error is yielded once and ends the sequence.
pub fn decode_stream<S>(byte_stream: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    stream::unfold(
        (byte_stream, Utf8Decoder::new(), false),
        |(mut byte_stream, mut decoder, done)| async move {
            if done {
                return None;
            }
            loop {
                match byte_stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_CHUNKS.click();
                        STREAM_BYTES.count(bytes.len() as u64);
                        let text = decoder.decode(&bytes);
                        if !text.is_empty() {
                            return Some((Ok(text), (byte_stream, decoder, false)));
                        }
                    }
                    Some(Err(err)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(err), (byte_stream, decoder, true)));
                    }
                    None => {
                        let text = decoder.finish();
                        if text.is_empty() {
                            return None;
                        }
                        return Some((Ok(text), (byte_stream, decoder, true)));
                    }
                }
            }
        },
    )
}

/// A growing reply tied to the display identifier of its message.
#[derive(Debug, Clone)]
pub struct TextAccumulator {
    id: MessageId,
    text: String,
    updates: usize,
}

impl TextAccumulator {
    /// Start accumulating for the message `id`.
    pub fn new(id: MessageId) -> Self {
        Self {
            id,
            text: String::new(),
            updates: 0,
        }
    }

    /// The message this accumulator belongs to.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Append a fragment and return the full text so far.
    pub fn push(&mut self, fragment: &str) -> &str {
        self.text.push_str(fragment);
        self.updates += 1;
        &self.text
    }

    /// The full text so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of fragments pushed.
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Consume the accumulator, returning the text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Fold `fragments` into `accumulator`, calling `on_update` with the full text after each.
///
/// On error the accumulator keeps everything received before the failure.
///
/// ```
/// # use futures::stream;
/// # use kbchat::{MessageId, TextAccumulator, accumulate};
/// # tokio_test::block_on(async {
/// let fragments = stream::iter(["Hel", "lo, ", "world"].map(|f| Ok(f.to_string())));
/// let mut accumulator = TextAccumulator::new(MessageId::new("reply"));
/// let mut renders = Vec::new();
/// accumulate(fragments, &mut accumulator, |_, text| renders.push(text.to_string()))
///     .await
///     .unwrap();
/// assert_eq!(renders, ["Hel", "Hello, ", "Hello, world"]);
/// # });
/// ```
pub async fn accumulate<S, F>(
    fragments: S,
    accumulator: &mut TextAccumulator,
    mut on_update: F,
) -> Result<()>
where
    S: Stream<Item = Result<String>>,
    F: FnMut(&MessageId, &str),
{
    futures::pin_mut!(fragments);
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        accumulator.push(&fragment);
        on_update(&accumulator.id, &accumulator.text);
    }
    Ok(())
}
