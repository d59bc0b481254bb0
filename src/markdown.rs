//! Markdown to terminal text.
//!
//! Parsing is delegated to `pulldown-cmark`; this module only decides how each construct
//! looks in a terminal.  With color disabled the output is plain text.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_ITALIC: &str = "\x1b[3m";
const ANSI_UNDERLINE: &str = "\x1b[4m";
const ANSI_STRIKE: &str = "\x1b[9m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_RESET: &str = "\x1b[0m";

const CODE_INDENT: &str = "    ";
const RULE: &str = "────────────────────────────────";

struct Writer {
    out: String,
    use_color: bool,
    styles: Vec<&'static str>,
    lists: Vec<Option<u64>>,
    links: Vec<String>,
    in_code_block: bool,
}

impl Writer {
    fn new(use_color: bool) -> Self {
        Self {
            out: String::new(),
            use_color,
            styles: Vec::new(),
            lists: Vec::new(),
            links: Vec::new(),
            in_code_block: false,
        }
    }

    fn push_style(&mut self, style: &'static str) {
        if self.use_color {
            self.out.push_str(style);
        }
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        self.styles.pop();
        if self.use_color {
            self.out.push_str(ANSI_RESET);
            for style in &self.styles {
                self.out.push_str(style);
            }
        }
    }

    fn ends_with_newline(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn end_line(&mut self) {
        if !self.ends_with_newline() {
            self.out.push('\n');
        }
    }

    fn end_block(&mut self) {
        if self.out.is_empty() {
            return;
        }
        self.end_line();
        if !self.lists.is_empty() {
            return;
        }
        if !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_code_block {
            self.out.push_str(text);
            return;
        }
        for line in text.split_inclusive('\n') {
            if self.ends_with_newline() {
                self.out.push_str(CODE_INDENT);
            }
            self.out.push_str(line);
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.end_block();
                self.push_style(ANSI_BOLD);
                self.out.push_str(&"#".repeat(level as usize));
                self.out.push(' ');
            }
            Tag::CodeBlock(_) => {
                self.end_block();
                self.in_code_block = true;
                self.push_style(ANSI_CYAN);
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.end_block();
                } else {
                    self.end_line();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.end_line();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.out.push_str(&marker);
            }
            Tag::Emphasis => self.push_style(ANSI_ITALIC),
            Tag::Strong => self.push_style(ANSI_BOLD),
            Tag::Strikethrough => self.push_style(ANSI_STRIKE),
            Tag::Link { dest_url, .. } => {
                self.links.push(dest_url.to_string());
                self.push_style(ANSI_UNDERLINE);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.end_block(),
            TagEnd::Heading(_) => {
                self.pop_style();
                self.end_block();
            }
            TagEnd::CodeBlock => {
                self.pop_style();
                self.in_code_block = false;
                self.end_block();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.end_block();
            }
            TagEnd::Item => self.end_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.links.pop() {
                    self.out.push_str(&format!(" ({url})"));
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> String {
        self.out.trim_end_matches('\n').to_string()
    }
}

/// Render `markdown` as terminal text, styled with ANSI escapes when `use_color` is set.
pub fn markdown_to_terminal(markdown: &str, use_color: bool) -> String {
    let mut writer = Writer::new(use_color);
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => writer.start(tag),
            Event::End(tag) => writer.end(tag),
            Event::Text(text) => writer.text(&text),
            Event::Code(code) => {
                writer.push_style(ANSI_CYAN);
                writer.out.push('`');
                writer.out.push_str(&code);
                writer.out.push('`');
                writer.pop_style();
            }
            Event::Html(html) | Event::InlineHtml(html) => writer.text(&html),
            Event::SoftBreak => writer.out.push(' '),
            Event::HardBreak => writer.out.push('\n'),
            Event::Rule => {
                writer.end_block();
                writer.out.push_str(RULE);
                writer.end_block();
            }
            Event::TaskListMarker(done) => {
                writer.out.push_str(if done { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }
    writer.finish()
}
