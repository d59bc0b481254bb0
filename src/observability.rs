use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("kbchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("kbchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("kbchat.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("kbchat.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("kbchat.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("kbchat.stream.bytes");
pub(crate) static STREAM_DURATION: Moments = Moments::new("kbchat.stream.duration_seconds");

pub(crate) static CHAT_SENDS: Counter = Counter::new("kbchat.chat.sends");
pub(crate) static CHAT_SENDS_IGNORED: Counter = Counter::new("kbchat.chat.sends_ignored");
pub(crate) static CHAT_ALERTS: Counter = Counter::new("kbchat.chat.alerts");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&CHAT_SENDS);
    collector.register_counter(&CHAT_SENDS_IGNORED);
    collector.register_counter(&CHAT_ALERTS);
}
