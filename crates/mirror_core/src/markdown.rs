//! Line-oriented markup to [`ContentBlock`] conversion.
//!
//! The dialect is deliberately small: `# ` and `## ` headings, `- ` list
//! items, whole-line `![alt](ref)` images and paragraphs. Every other line is
//! a paragraph.

use crate::document::ContentBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineState {
    #[default]
    Default,
    InList,
}

/// Output of the converter, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    OpenList,
    CloseList,
    Block(ContentBlock),
}

#[derive(Debug, Default)]
pub struct BlockConverter {
    state: LineState,
    events: Vec<MarkupEvent>,
}

impl BlockConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    /// Applies one input line. Rules are checked in precedence order.
    pub fn push_line(&mut self, raw: &str) {
        let line = raw.trim_end();
        let trimmed = line.trim();

        if trimmed.is_empty() {
            self.close_list();
            return;
        }

        if let Some(reference) = parse_image_line(trimmed) {
            self.close_list();
            self.emit(ContentBlock::Image {
                reference: reference.to_string(),
            });
            return;
        }

        if let Some(rest) = line.strip_prefix("## ") {
            self.close_list();
            self.emit(ContentBlock::Heading {
                level: 2,
                text: rest.trim().to_string(),
            });
            return;
        }

        if let Some(rest) = line.strip_prefix("# ") {
            self.close_list();
            self.emit(ContentBlock::Heading {
                level: 1,
                text: rest.trim().to_string(),
            });
            return;
        }

        if let Some(rest) = line.trim_start().strip_prefix("- ") {
            if self.state == LineState::Default {
                self.events.push(MarkupEvent::OpenList);
                self.state = LineState::InList;
            }
            self.emit(ContentBlock::ListItem {
                text: rest.trim().to_string(),
            });
            return;
        }

        self.close_list();
        self.emit(ContentBlock::Paragraph {
            text: trimmed.to_string(),
        });
    }

    /// End of input: flushes an open list.
    pub fn finish(mut self) -> Vec<MarkupEvent> {
        self.close_list();
        self.events
    }

    fn close_list(&mut self) {
        if self.state == LineState::InList {
            self.events.push(MarkupEvent::CloseList);
            self.state = LineState::Default;
        }
    }

    fn emit(&mut self, block: ContentBlock) {
        self.events.push(MarkupEvent::Block(block));
    }
}

/// Runs the converter over a frontmatter-free body and returns every event.
pub fn markup_events(body: &str) -> Vec<MarkupEvent> {
    let mut converter = BlockConverter::new();
    for line in body.lines() {
        converter.push_line(line);
    }
    converter.finish()
}

/// Converts a frontmatter-free body into content blocks.
pub fn convert_markdown(body: &str) -> Vec<ContentBlock> {
    markup_events(body)
        .into_iter()
        .filter_map(|event| match event {
            MarkupEvent::Block(block) => Some(block),
            MarkupEvent::OpenList | MarkupEvent::CloseList => None,
        })
        .collect()
}

/// Matches `![alt](ref)` spanning the whole (trimmed) line.
fn parse_image_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("![")?;
    let alt_end = rest.find(']')?;
    let rest = rest[alt_end + 1..].strip_prefix('(')?;
    let inner = rest.strip_suffix(')')?;
    if inner.is_empty() || inner.contains(')') {
        return None;
    }
    let reference = inner.trim();
    if reference.is_empty() {
        None
    } else {
        Some(reference)
    }
}
