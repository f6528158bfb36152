//! Document tree to normalized markdown.
//!
//! Output is canonical rather than faithful: ATX headings, `-` bullets,
//! `*` emphasis, backtick fences and `***` rules. Text is escaped so the
//! output parses back to the same tree. Shortcodes are written by the
//! [`NodeRenderer`] and are never escaped.

use shortcode_core::NodeRenderer;

use crate::ast::{Block, Inline, ListItem, Root};
use crate::util::longest_run;

/// Render a document tree to markdown.
///
/// Blocks are separated by a blank line and a non-empty document ends with a
/// single newline.
///
/// # Example
///
/// ```
/// use shortcode_core::{ShortcodeNode, Shortcodes};
/// use shortcode_markdown::{Block, Inline, Root, stringify};
///
/// let root = Root {
///     children: vec![
///         Block::paragraph(vec![Inline::text("Drum and Bass")]),
///         Block::Shortcode(ShortcodeNode::new("Youtube")),
///     ],
/// };
/// assert_eq!(
///     stringify(&root, &Shortcodes::default()),
///     "Drum and Bass\n\n[[ Youtube ]]\n"
/// );
/// ```
pub fn stringify<R: NodeRenderer + ?Sized>(root: &Root, renderer: &R) -> String {
    let writer = Writer { renderer };
    let mut out = writer.blocks(&root.children, "\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    tracing::debug!(bytes = out.len(), "stringified document");
    out
}

struct Writer<'r, R: ?Sized> {
    renderer: &'r R,
}

impl<R: NodeRenderer + ?Sized> Writer<'_, R> {
    fn blocks(&self, blocks: &[Block], separator: &str) -> String {
        blocks
            .iter()
            .map(|block| self.block(block))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn block(&self, block: &Block) -> String {
        match block {
            Block::Paragraph { children } => self.inline_content(children),
            Block::Heading { depth, children } => self.heading(*depth, children),
            Block::Blockquote { children } => prefix_lines(&self.blocks(children, "\n\n")),
            Block::List {
                ordered,
                start,
                spread,
                children,
            } => self.list(*ordered, start.unwrap_or(1), *spread, children),
            Block::Code { lang, meta, value } => code_block(lang.as_deref(), meta.as_deref(), value),
            Block::Html { value } => value.clone(),
            Block::ThematicBreak => "***".to_owned(),
            Block::Shortcode(node) => self.renderer.render(node),
        }
    }

    fn heading(&self, depth: u8, children: &[Inline]) -> String {
        let mut content = self.inline_content(children);

        // Multi-line content only comes from setext headings.
        if content.contains('\n') && depth <= 2 {
            let underline = if depth == 1 { "===" } else { "---" };
            return format!("{content}\n{underline}");
        }

        if content.ends_with('#') && !content.ends_with("\\#") {
            content.insert(content.len() - 1, '\\');
        }
        let marker = "#".repeat(usize::from(depth.clamp(1, 6)));
        if content.is_empty() {
            marker
        } else {
            format!("{marker} {content}")
        }
    }

    fn list(&self, ordered: bool, start: u64, spread: bool, items: &[ListItem]) -> String {
        let separator = if spread { "\n\n" } else { "\n" };

        let rendered: Vec<String> = (start..)
            .zip(items)
            .map(|(number, item)| {
                let marker = if ordered {
                    format!("{number}.")
                } else {
                    "-".to_owned()
                };
                let content = self.blocks(&item.children, separator);
                indent_item(&marker, &content)
            })
            .collect();

        rendered.join(separator)
    }

    fn inline_content(&self, children: &[Inline]) -> String {
        let mut out = String::new();
        for child in children {
            self.inline(child, &mut out);
        }
        out
    }

    fn inline(&self, inline: &Inline, out: &mut String) {
        match inline {
            Inline::Text { value } => push_escaped(out, value),
            Inline::InlineCode { value } => push_code_span(out, value),
            Inline::Emphasis { children } => self.wrapped("*", children, out),
            Inline::Strong { children } => self.wrapped("**", children, out),
            Inline::Link {
                url,
                title,
                children,
            } => {
                if is_autolink(url, children) {
                    out.push('<');
                    out.push_str(url);
                    out.push('>');
                    return;
                }
                out.push('[');
                for child in children {
                    self.inline(child, out);
                }
                out.push(']');
                push_resource(out, url, title.as_deref());
            }
            Inline::Image { url, title, alt } => {
                out.push_str("![");
                push_escaped(out, alt);
                out.push(']');
                push_resource(out, url, title.as_deref());
            }
            Inline::Html { value } => out.push_str(value),
            Inline::Break => out.push_str("\\\n"),
            Inline::Shortcode(node) => out.push_str(&self.renderer.render(node)),
        }
    }

    fn wrapped(&self, marker: &str, children: &[Inline], out: &mut String) {
        out.push_str(marker);
        for child in children {
            self.inline(child, out);
        }
        out.push_str(marker);
    }
}

/// Append text, escaping everything markdown would otherwise interpret.
fn push_escaped(out: &mut String, value: &str) {
    let mut line_start = out.is_empty() || out.ends_with('\n');
    let mut chars = value.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if line_start && ch.is_ascii_digit() {
            // "1." and "1)" open ordered lists.
            let len = value[idx..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(value.len() - idx);
            out.push_str(&value[idx..idx + len]);
            for _ in 1..len {
                chars.next();
            }
            if let Some(&(_, next)) = chars.peek()
                && matches!(next, '.' | ')')
            {
                out.push('\\');
                out.push(next);
                chars.next();
            }
            line_start = false;
            continue;
        }

        let escape = matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '&')
            || (line_start && matches!(ch, '#' | '>' | '-' | '+' | '=' | '~'));
        if escape {
            out.push('\\');
        }
        out.push(ch);
        line_start = ch == '\n';
    }
}

fn push_code_span(out: &mut String, value: &str) {
    let fence = "`".repeat(longest_run(value, '`') + 1);
    let pad = value.starts_with('`')
        || value.ends_with('`')
        || (value.starts_with(' ') && value.ends_with(' ') && !value.trim().is_empty());

    out.push_str(&fence);
    if pad {
        out.push(' ');
    }
    out.push_str(value);
    if pad {
        out.push(' ');
    }
    out.push_str(&fence);
}

/// Append `(destination "title")`.
fn push_resource(out: &mut String, url: &str, title: Option<&str>) {
    out.push('(');
    if url.is_empty() || url.contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>')) {
        out.push('<');
        for ch in url.chars() {
            if matches!(ch, '<' | '>' | '\\') {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push('>');
    } else {
        out.push_str(url);
    }
    if let Some(title) = title {
        out.push_str(" \"");
        for ch in title.chars() {
            if matches!(ch, '"' | '\\') {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push('"');
    }
    out.push(')');
}

/// Whether a link can be written as `<url>`.
fn is_autolink(url: &str, children: &[Inline]) -> bool {
    let [Inline::Text { value }] = children else {
        return false;
    };
    if value != url || url.contains(|c: char| c.is_whitespace() || matches!(c, '<' | '>')) {
        return false;
    }
    let has_scheme = url.split_once(':').is_some_and(|(scheme, _)| {
        scheme.len() >= 2
            && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
    });
    has_scheme || url.contains('@')
}

fn code_block(lang: Option<&str>, meta: Option<&str>, value: &str) -> String {
    let fence = "`".repeat(longest_run(value, '`').max(2) + 1);
    let info = match (lang, meta) {
        (Some(lang), Some(meta)) => format!("{lang} {meta}"),
        (Some(lang), None) => lang.to_owned(),
        (None, _) => String::new(),
    };
    if value.is_empty() {
        format!("{fence}{info}\n{fence}")
    } else {
        format!("{fence}{info}\n{value}\n{fence}")
    }
}

fn prefix_lines(content: &str) -> String {
    content
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                ">".to_owned()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Put `marker` before the first line and indent the rest to match.
fn indent_item(marker: &str, content: &str) -> String {
    if content.is_empty() {
        return marker.to_owned();
    }
    let indent = " ".repeat(marker.len() + 1);
    content
        .split('\n')
        .enumerate()
        .map(|(idx, line)| {
            if idx == 0 {
                format!("{marker} {line}")
            } else if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
