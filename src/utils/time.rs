use rand::Rng;
use time::OffsetDateTime;

/// Milliseconds since the Unix epoch.
pub fn epoch_millis() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

/// Generate an identifier of the form `{epoch-millis}-{6-digit-random}`.
///
/// The random suffix is always six digits (100000..=999999), so identifiers minted in the
/// same millisecond still sort by time and rarely collide.
pub fn timestamp_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    format!("{}-{suffix}", epoch_millis())
}
