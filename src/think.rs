//! Extraction of `<think>` reasoning blocks from model output.
//!
//! Reasoning models interleave intermediate reasoning with their answer, delimited by
//! `<think>` and `</think>`.  Only the first complete pair is honored.  Multiple or
//! nested pairs are not interpreted: everything after the first `</think>` is answer text.

/// Marker opening a reasoning block.
pub const THINK_START: &str = "<think>";

/// Marker closing a reasoning block.
pub const THINK_END: &str = "</think>";

/// Sentinel content of an assistant message whose reply has not started streaming.
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

/// A message split into its reasoning and answer segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkParse {
    /// Text between the first `<think>` and the first `</think>` after it.
    pub reasoning: Option<String>,
    /// The message with the marked span, markers included, removed.
    pub answer: String,
}

/// Split `input` into reasoning and answer.
///
/// Without a complete marker pair, `reasoning` is `None` and `answer` is `input` unchanged.
/// An unterminated `<think>` (typical mid-stream) therefore renders as plain answer text
/// until its `</think>` arrives.
pub fn parse_think(input: &str) -> ThinkParse {
    let Some(start) = input.find(THINK_START) else {
        return unparsed(input);
    };
    let body_start = start + THINK_START.len();
    let Some(body_len) = input[body_start..].find(THINK_END) else {
        return unparsed(input);
    };
    let body_end = body_start + body_len;
    let mut answer = String::with_capacity(input.len() - (body_end + THINK_END.len() - start));
    answer.push_str(&input[..start]);
    answer.push_str(&input[body_end + THINK_END.len()..]);
    ThinkParse {
        reasoning: Some(input[body_start..body_end].to_string()),
        answer,
    }
}

/// Returns true if `content` is the in-flight placeholder rather than real output.
pub fn is_placeholder(content: &str) -> bool {
    content == THINKING_PLACEHOLDER
}

fn unparsed(input: &str) -> ThinkParse {
    ThinkParse {
        reasoning: None,
        answer: input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_block() {
        let parsed = parse_think("<think>weigh the options</think>Pick the second one.");
        assert_eq!(parsed.reasoning.as_deref(), Some("weigh the options"));
        assert_eq!(parsed.answer, "Pick the second one.");
    }

    #[test]
    fn keeps_text_around_the_block() {
        let parsed = parse_think("Sure. <think>\nmulti\nline\n</think> Done.");
        assert_eq!(parsed.reasoning.as_deref(), Some("\nmulti\nline\n"));
        assert_eq!(parsed.answer, "Sure.  Done.");
    }

    #[test]
    fn no_marker_leaves_input_unchanged() {
        for input in ["", "plain answer", "a < think > b", "</think> only an end"] {
            let parsed = parse_think(input);
            assert_eq!(parsed.reasoning, None);
            assert_eq!(parsed.answer, input);
        }
    }

    #[test]
    fn unterminated_block_is_not_reasoning() {
        let parsed = parse_think("<think>still going");
        assert_eq!(parsed.reasoning, None);
        assert_eq!(parsed.answer, "<think>still going");
    }

    #[test]
    fn empty_block() {
        let parsed = parse_think("<think></think>answer");
        assert_eq!(parsed.reasoning.as_deref(), Some(""));
        assert_eq!(parsed.answer, "answer");
    }

    #[test]
    fn only_first_pair_is_honored() {
        let parsed = parse_think("<think>a</think>x<think>b</think>y");
        assert_eq!(parsed.reasoning.as_deref(), Some("a"));
        assert_eq!(parsed.answer, "x<think>b</think>y");
    }

    #[test]
    fn end_marker_before_start_is_ignored() {
        let parsed = parse_think("</think>x<think>r</think>y");
        assert_eq!(parsed.reasoning.as_deref(), Some("r"));
        assert_eq!(parsed.answer, "</think>xy");
    }

    #[test]
    fn multibyte_content() {
        let parsed = parse_think("<think>思考中</think>答案");
        assert_eq!(parsed.reasoning.as_deref(), Some("思考中"));
        assert_eq!(parsed.answer, "答案");
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder(THINKING_PLACEHOLDER));
        assert!(!is_placeholder("Thinking... done"));
    }
}
