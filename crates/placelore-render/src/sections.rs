use crate::blocks::{Block, Span};

/// Split generated text into headings, lists and paragraphs.
///
/// The input uses a loose markdown subset:
/// - `# Heading` … `###### Heading` → heading of that level
/// - a line wholly wrapped in `**…**` (optionally `**…:**` or `**…**:`) →
///   level 2 heading
/// - `* item`, `- item`, `• item` → unordered list item
/// - `1. item` → ordered list item
/// - `**bold**` inside paragraphs and items → bold span
/// - blank lines end the current paragraph or list
/// - everything else → paragraph, consecutive lines joined with a space
///
/// Text matching none of these comes back as a single paragraph.
pub fn render_sections(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pending = Pending::None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            pending.flush_into(&mut blocks);
            continue;
        }

        match classify(trimmed) {
            Line::Heading { level, text } => {
                pending.flush_into(&mut blocks);
                blocks.push(Block::Heading {
                    level,
                    text: text.to_string(),
                });
            }
            Line::Item { ordered, text } => match &mut pending {
                Pending::List {
                    ordered: current,
                    items,
                } if *current == ordered => items.push(text.to_string()),
                _ => {
                    pending.flush_into(&mut blocks);
                    pending = Pending::List {
                        ordered,
                        items: vec![text.to_string()],
                    };
                }
            },
            Line::Text(text) => match &mut pending {
                Pending::Paragraph(lines) => lines.push(text.to_string()),
                _ => {
                    pending.flush_into(&mut blocks);
                    pending = Pending::Paragraph(vec![text.to_string()]);
                }
            },
        }
    }

    pending.flush_into(&mut blocks);
    blocks
}

enum Pending {
    None,
    Paragraph(Vec<String>),
    List { ordered: bool, items: Vec<String> },
}

impl Pending {
    fn flush_into(&mut self, blocks: &mut Vec<Block>) {
        match std::mem::replace(self, Pending::None) {
            Pending::None => {}
            Pending::Paragraph(lines) => blocks.push(Block::Paragraph {
                spans: parse_inline(&lines.join(" ")),
            }),
            Pending::List { ordered, items } => blocks.push(Block::List {
                ordered,
                items: items.iter().map(|item| parse_inline(item)).collect(),
            }),
        }
    }
}

enum Line<'a> {
    Heading { level: u8, text: &'a str },
    Item { ordered: bool, text: &'a str },
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if let Some(heading) = hash_heading(line).or_else(|| bold_heading(line)) {
        return heading;
    }

    for marker in ["* ", "- ", "• "] {
        if let Some(text) = line.strip_prefix(marker) {
            return Line::Item {
                ordered: false,
                text: text.trim(),
            };
        }
    }

    if let Some(text) = ordered_item(line) {
        return Line::Item {
            ordered: true,
            text,
        };
    }

    Line::Text(line)
}

fn hash_heading(line: &str) -> Option<Line<'_>> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }

    let rest = &line[hashes..];
    if !rest.starts_with(' ') {
        return None;
    }

    let text = rest.trim();
    let text = unwrap_bold(text).unwrap_or(text);
    if text.is_empty() {
        return None;
    }

    Some(Line::Heading {
        level: hashes as u8,
        text,
    })
}

fn bold_heading(line: &str) -> Option<Line<'_>> {
    let line = line.strip_suffix(':').unwrap_or(line);
    let text = unwrap_bold(line)?;
    let text = text.strip_suffix(':').unwrap_or(text).trim();
    if text.is_empty() {
        return None;
    }

    Some(Line::Heading { level: 2, text })
}

/// Inner text of a line that is exactly one `**…**` run.
fn unwrap_bold(line: &str) -> Option<&str> {
    let inner = line.strip_prefix("**")?.strip_suffix("**")?;
    if inner.contains("**") {
        return None;
    }
    Some(inner.trim())
}

fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ").map(str::trim)
}

/// Parse simple inline formatting: **bold** segments.
fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut remaining = text;

    while let Some(start) = remaining.find("**") {
        let before = &remaining[..start];
        let after_start = &remaining[start + 2..];

        let Some(end) = after_start.find("**") else {
            // No closing **, keep the rest as written
            break;
        };

        if !before.is_empty() {
            spans.push(Span::plain(before));
        }
        let bold_text = &after_start[..end];
        if !bold_text.is_empty() {
            spans.push(Span::bold(bold_text));
        }
        remaining = &after_start[end + 2..];
    }

    if !remaining.is_empty() {
        spans.push(Span::plain(remaining));
    }

    spans
}
