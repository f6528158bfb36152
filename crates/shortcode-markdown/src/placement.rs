//! Block vs. inline placement of shortcodes.
//!
//! A shortcode that is the only thing on its line becomes a block sibling of
//! paragraphs; anything else stays inline. Lines are delimited by soft breaks
//! (kept as `\n` in text) and hard breaks.

use shortcode_core::ShortcodeNode;

use crate::ast::{Block, Inline, push_inline};

/// How a paragraph line ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineEnd {
    Soft,
    Hard,
}

#[derive(Debug, Default)]
struct Line {
    inlines: Vec<Inline>,
    end: Option<LineEnd>,
}

/// Turn the inline content of a paragraph into blocks.
///
/// Returns a single paragraph unless some line holds nothing but one
/// shortcode, in which case the paragraph is split around each such line.
pub(crate) fn place_paragraph(children: Vec<Inline>) -> Vec<Block> {
    if children.is_empty() {
        return Vec::new();
    }
    if !children.iter().any(|c| matches!(c, Inline::Shortcode(_))) {
        return vec![Block::paragraph(children)];
    }

    let lines = split_lines(children);
    if !lines.iter().any(|line| standalone_shortcode(line).is_some()) {
        return vec![Block::paragraph(join_lines(lines))];
    }

    let mut blocks = Vec::new();
    let mut pending = Vec::new();

    for line in lines {
        if let Some(node) = standalone_shortcode(&line) {
            tracing::debug!(identifier = %node.identifier, "promoting shortcode to block");
            flush_paragraph(&mut blocks, std::mem::take(&mut pending));
            blocks.push(Block::Shortcode(node.clone()));
        } else {
            pending.push(line);
        }
    }
    flush_paragraph(&mut blocks, pending);

    blocks
}

fn split_lines(children: Vec<Inline>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();

    for child in children {
        match child {
            Inline::Text { value } if value.contains('\n') => {
                for (idx, part) in value.split('\n').enumerate() {
                    if idx > 0 {
                        current.end = Some(LineEnd::Soft);
                        lines.push(std::mem::take(&mut current));
                    }
                    if !part.is_empty() {
                        current.inlines.push(Inline::text(part));
                    }
                }
            }
            Inline::Break => {
                current.end = Some(LineEnd::Hard);
                lines.push(std::mem::take(&mut current));
            }
            other => current.inlines.push(other),
        }
    }
    lines.push(current);

    lines
}

fn join_lines(lines: Vec<Line>) -> Vec<Inline> {
    let count = lines.len();
    let mut children = Vec::new();

    for (idx, line) in lines.into_iter().enumerate() {
        for inline in line.inlines {
            push_inline(&mut children, inline);
        }
        if idx + 1 < count {
            match line.end {
                Some(LineEnd::Hard) => children.push(Inline::Break),
                Some(LineEnd::Soft) | None => push_inline(&mut children, Inline::text("\n")),
            }
        }
    }

    children
}

/// The shortcode on a line whose other content is only whitespace.
fn standalone_shortcode(line: &Line) -> Option<&ShortcodeNode> {
    let mut content = line.inlines.iter().filter(|inline| !is_blank_text(inline));
    match (content.next(), content.next()) {
        (Some(Inline::Shortcode(node)), None) => Some(node),
        _ => None,
    }
}

fn is_blank_text(inline: &Inline) -> bool {
    matches!(inline, Inline::Text { value } if value.trim().is_empty())
}

/// Emit the lines collected between promoted shortcodes as a paragraph.
fn flush_paragraph(blocks: &mut Vec<Block>, lines: Vec<Line>) {
    let mut children = join_lines(lines);
    trim_edges(&mut children);
    if !children.is_empty() {
        blocks.push(Block::paragraph(children));
    }
}

/// Strip leading and trailing whitespace and breaks left over from splitting.
fn trim_edges(children: &mut Vec<Inline>) {
    while let Some(first) = children.first_mut() {
        match first {
            Inline::Break => {
                children.remove(0);
            }
            Inline::Text { value } => {
                let trimmed = value.trim_start();
                if trimmed.is_empty() {
                    children.remove(0);
                } else {
                    *value = trimmed.to_owned();
                    break;
                }
            }
            _ => break,
        }
    }

    while let Some(last) = children.last_mut() {
        match last {
            Inline::Break => {
                children.pop();
            }
            Inline::Text { value } => {
                let trimmed = value.trim_end();
                if trimmed.is_empty() {
                    children.pop();
                } else {
                    value.truncate(trimmed.len());
                    break;
                }
            }
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shortcode(id: &str) -> Inline {
        Inline::Shortcode(ShortcodeNode::new(id))
    }

    #[test]
    fn test_plain_paragraph_untouched() {
        let children = vec![Inline::text("a\nb")];
        assert_eq!(
            place_paragraph(children.clone()),
            vec![Block::paragraph(children)]
        );
    }

    #[test]
    fn test_sole_shortcode_becomes_block() {
        let blocks = place_paragraph(vec![shortcode("Youtube")]);
        assert_eq!(blocks, vec![Block::Shortcode(ShortcodeNode::new("Youtube"))]);
    }

    #[test]
    fn test_inline_shortcode_stays_inline() {
        let children = vec![Inline::text("Drum and Bass "), shortcode("Youtube")];
        assert_eq!(
            place_paragraph(children.clone()),
            vec![Block::paragraph(children)]
        );
    }

    #[test]
    fn test_shortcode_line_splits_paragraph() {
        let blocks = place_paragraph(vec![
            Inline::text("before\n"),
            shortcode("X"),
            Inline::text("\nafter"),
        ]);
        assert_eq!(
            blocks,
            vec![
                Block::paragraph(vec![Inline::text("before")]),
                Block::Shortcode(ShortcodeNode::new("X")),
                Block::paragraph(vec![Inline::text("after")]),
            ]
        );
    }

    #[test]
    fn test_hard_break_delimits_line() {
        let blocks = place_paragraph(vec![Inline::text("before"), Inline::Break, shortcode("X")]);
        assert_eq!(
            blocks,
            vec![
                Block::paragraph(vec![Inline::text("before")]),
                Block::Shortcode(ShortcodeNode::new("X")),
            ]
        );
    }

    #[test]
    fn test_two_shortcodes_on_one_line_stay_inline() {
        let children = vec![shortcode("X"), Inline::text(" "), shortcode("Y")];
        assert_eq!(
            place_paragraph(children.clone()),
            vec![Block::paragraph(children)]
        );
    }

    #[test]
    fn test_other_lines_keep_breaks() {
        let blocks = place_paragraph(vec![
            Inline::text("one\ntwo"),
            Inline::Break,
            Inline::text("three\n"),
            shortcode("X"),
        ]);
        assert_eq!(
            blocks,
            vec![
                Block::paragraph(vec![
                    Inline::text("one\ntwo"),
                    Inline::Break,
                    Inline::text("three"),
                ]),
                Block::Shortcode(ShortcodeNode::new("X")),
            ]
        );
    }

    #[test]
    fn test_consecutive_shortcode_lines() {
        let blocks = place_paragraph(vec![shortcode("X"), Inline::text("\n"), shortcode("Y")]);
        assert_eq!(
            blocks,
            vec![
                Block::Shortcode(ShortcodeNode::new("X")),
                Block::Shortcode(ShortcodeNode::new("Y")),
            ]
        );
    }
}
