//! Terminal markdown rendering for `view --render`.

use crate::formatting::FormatContext;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

fn heading_mark(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "# ",
        HeadingLevel::H2 => "## ",
        HeadingLevel::H3 => "### ",
        HeadingLevel::H4 => "#### ",
        HeadingLevel::H5 => "##### ",
        HeadingLevel::H6 => "###### ",
    }
}

/// Render a note body with the session theme: headings in the header
/// color, bullets in the accent color, rules muted, body text plain.
/// Structure markers are kept even when the context disables color, so
/// piped and `--plain` output stays stable.
pub fn render_markdown(input: &str, ctx: &FormatContext) -> String {
    let mut out = String::new();
    let mut list_depth: usize = 0;

    for event in Parser::new(input) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                out.push('\n');
                out.push_str(&ctx.format_header(heading_mark(level)));
            }
            Event::End(TagEnd::Heading(_)) => out.push('\n'),
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                out.push('\n');
            }
            Event::Start(Tag::Item) => {
                out.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                out.push_str(&ctx.format_accent("- "));
            }
            Event::End(TagEnd::Item) => out.push('\n'),
            Event::End(TagEnd::Paragraph) => out.push_str("\n\n"),
            Event::Text(t) | Event::Code(t) => out.push_str(&t),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => out.push_str(&ctx.format_muted("\n---\n")),
            Event::Html(t) => out.push_str(&t),
            _ => {}
        }
    }

    out.trim().to_string()
}
