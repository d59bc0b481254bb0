use std::sync::LazyLock;

use regex::Regex;

static LEADING_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@\w+\s+").expect("mention pattern is valid"));

/// Replace a leading `@name ` mention in `input` with one naming `index`.
///
/// With no index the existing mention is only removed.
pub fn insert_index_mention(input: &str, index: Option<&str>) -> String {
    let rest = LEADING_MENTION.replace(input, "");
    match index {
        Some(index) => format!("@{index} {rest}"),
        None => rest.into_owned(),
    }
}
