//! Pure construction of message views.
//!
//! [`render_message`] maps a message, its role, its display identifier, and the reasoning
//! panel's display state to a [`MessageView`].  Nothing here touches a terminal; adapters in
//! [`crate::render`] turn views into output.

use crate::think::{THINKING_PLACEHOLDER, is_placeholder, parse_think};
use crate::types::{MessageId, Role};

/// Label of the reasoning toggle while the panel is collapsed.
pub const EXPAND_REASONING_LABEL: &str = "expand reasoning";

/// Label of the reasoning toggle while the panel is expanded.
pub const HIDE_REASONING_LABEL: &str = "hide reasoning";

/// Display state of a message's reasoning panel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReasoningDisplay {
    expanded: bool,
}

impl ReasoningDisplay {
    /// A collapsed panel.
    pub fn collapsed() -> Self {
        Self { expanded: false }
    }

    /// An expanded panel.
    pub fn expanded() -> Self {
        Self { expanded: true }
    }

    /// Returns true if the reasoning is shown.
    pub fn is_expanded(self) -> bool {
        self.expanded
    }

    /// Flip between shown and hidden.
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// The label the toggle control shows in this state.
    pub fn toggle_label(self) -> &'static str {
        if self.expanded {
            HIDE_REASONING_LABEL
        } else {
            EXPAND_REASONING_LABEL
        }
    }
}

/// Where the avatar sits relative to the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarPlacement {
    /// Avatar first, then content (assistant messages).
    Before,
    /// Content first, then avatar (user messages).
    After,
}

/// A collapsible reasoning panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningPanel {
    /// Reasoning text as markdown.
    pub markdown: String,
    /// Whether the panel is shown.
    pub expanded: bool,
    /// Label of the toggle control.
    pub toggle_label: &'static str,
}

/// The body of a rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// The reply has not started; show a loading indicator.
    Loading {
        /// Text shown next to the indicator.
        label: &'static str,
    },
    /// Parsed content.
    Content {
        /// Reasoning panel, present only when the message has a think block.
        reasoning: Option<ReasoningPanel>,
        /// Visible answer as markdown.
        answer_markdown: String,
    },
}

/// Renderable description of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    /// Role the view was rendered for.
    pub role: Role,
    /// Display identifier attached to the content, if supplied.
    pub id: Option<MessageId>,
    /// Avatar placement.
    pub avatar: AvatarPlacement,
    /// Message body.
    pub body: MessageBody,
}

impl MessageView {
    /// Returns the reasoning panel, if any.
    pub fn reasoning(&self) -> Option<&ReasoningPanel> {
        match &self.body {
            MessageBody::Content { reasoning, .. } => reasoning.as_ref(),
            MessageBody::Loading { .. } => None,
        }
    }

    /// Returns true if the view is the loading indicator.
    pub fn is_loading(&self) -> bool {
        matches!(self.body, MessageBody::Loading { .. })
    }
}

/// Build the view of one message.
///
/// Returns `None` for tool and system messages, which are never shown.
pub fn render_message(
    content: &str,
    role: Role,
    id: Option<&MessageId>,
    display: ReasoningDisplay,
) -> Option<MessageView> {
    if !role.is_displayed() {
        return None;
    }
    let avatar = match role {
        Role::User => AvatarPlacement::After,
        _ => AvatarPlacement::Before,
    };
    let body = if is_placeholder(content) {
        MessageBody::Loading {
            label: THINKING_PLACEHOLDER,
        }
    } else {
        let parsed = parse_think(content);
        MessageBody::Content {
            reasoning: parsed.reasoning.map(|markdown| ReasoningPanel {
                markdown,
                expanded: display.is_expanded(),
                toggle_label: display.toggle_label(),
            }),
            answer_markdown: parsed.answer,
        }
    };
    Some(MessageView {
        role,
        id: id.cloned(),
        avatar,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_and_system_are_not_rendered() {
        for role in [Role::Tool, Role::System] {
            assert!(render_message("x", role, None, ReasoningDisplay::collapsed()).is_none());
        }
    }

    #[test]
    fn avatar_placement_by_role() {
        let user = render_message("hi", Role::User, None, ReasoningDisplay::default()).unwrap();
        assert_eq!(user.avatar, AvatarPlacement::After);
        let bot = render_message("hi", Role::Assistant, None, ReasoningDisplay::default()).unwrap();
        assert_eq!(bot.avatar, AvatarPlacement::Before);
    }

    #[test]
    fn placeholder_renders_loading() {
        let id = MessageId::new("m-1");
        let view = render_message(
            THINKING_PLACEHOLDER,
            Role::Assistant,
            Some(&id),
            ReasoningDisplay::default(),
        )
        .unwrap();
        assert!(view.is_loading());
        assert_eq!(view.id, Some(id));
    }

    #[test]
    fn plain_answer_has_no_panel() {
        let view = render_message(
            "**bold** answer",
            Role::Assistant,
            None,
            ReasoningDisplay::default(),
        )
        .unwrap();
        assert_eq!(
            view.body,
            MessageBody::Content {
                reasoning: None,
                answer_markdown: "**bold** answer".to_string(),
            }
        );
    }

    #[test]
    fn reasoning_panel_defaults_to_collapsed() {
        let view = render_message(
            "<think>why</think>because",
            Role::Assistant,
            None,
            ReasoningDisplay::default(),
        )
        .unwrap();
        let panel = view.reasoning().unwrap();
        assert_eq!(panel.markdown, "why");
        assert!(!panel.expanded);
        assert_eq!(panel.toggle_label, EXPAND_REASONING_LABEL);
    }

    #[test]
    fn toggling_twice_restores_state() {
        let mut display = ReasoningDisplay::default();
        let before = (display.is_expanded(), display.toggle_label());
        display.toggle();
        assert!(display.is_expanded());
        assert_eq!(display.toggle_label(), HIDE_REASONING_LABEL);
        display.toggle();
        assert_eq!((display.is_expanded(), display.toggle_label()), before);
    }

    #[test]
    fn expanded_display_flows_into_panel() {
        let view = render_message(
            "<think>why</think>because",
            Role::Assistant,
            None,
            ReasoningDisplay::expanded(),
        )
        .unwrap();
        let panel = view.reasoning().unwrap();
        assert!(panel.expanded);
        assert_eq!(panel.toggle_label, HIDE_REASONING_LABEL);
    }
}
