//! Render-time interpretation of the inline content convention.
//!
//! Post bodies are free text with a four-rule line format: `# ` and `## `
//! open level-1/level-2 headings, `- ` opens a list item, and `**text**`
//! spans inside ordinary lines are bold. Nothing is stored as structured
//! data; this module parses on demand and renders escaped HTML for surfaces
//! that want it.

/// A span inside a paragraph line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
}

/// One interpreted line of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading1(String),
    Heading2(String),
    ListItem(String),
    Paragraph(Vec<Inline>),
}

/// Interpret `content` line by line. Blank lines are dropped.
pub fn parse_blocks(content: &str) -> Vec<Block> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Block {
    if let Some(rest) = line.strip_prefix("# ") {
        Block::Heading1(rest.to_string())
    } else if let Some(rest) = line.strip_prefix("## ") {
        Block::Heading2(rest.to_string())
    } else if let Some(rest) = line.strip_prefix("- ") {
        Block::ListItem(rest.to_string())
    } else {
        Block::Paragraph(parse_inlines(line))
    }
}

/// Split a paragraph line on `**` markers; odd segments are bold. An
/// unpaired marker bolds the remainder of the line.
pub fn parse_inlines(line: &str) -> Vec<Inline> {
    line.split("**")
        .enumerate()
        .filter(|(_, segment)| !segment.is_empty())
        .map(|(position, segment)| {
            if position % 2 == 1 {
                Inline::Bold(segment.to_string())
            } else {
                Inline::Text(segment.to_string())
            }
        })
        .collect()
}

/// Render the content as escaped HTML, one element per block.
pub fn render_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for block in parse_blocks(content) {
        match block {
            Block::Heading1(text) => push_wrapped(&mut out, "h1", &text),
            Block::Heading2(text) => push_wrapped(&mut out, "h2", &text),
            Block::ListItem(text) => push_wrapped(&mut out, "li", &text),
            Block::Paragraph(spans) => {
                out.push_str("<p>");
                for span in spans {
                    match span {
                        Inline::Text(text) => push_escaped(&mut out, &text),
                        Inline::Bold(text) => {
                            out.push_str("<strong>");
                            push_escaped(&mut out, &text);
                            out.push_str("</strong>");
                        }
                    }
                }
                out.push_str("</p>\n");
            }
        }
    }
    out
}

fn push_wrapped(out: &mut String, tag: &str, text: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    push_escaped(out, text);
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
}
