//! Markdown Reconstructor
//!
//! Inverts encoded rich text back to a markdown fragment using only the
//! recovery attributes. The output is the *inline content* of a block plus a
//! heading prefix or code fence. List markers, quote markers and table pipes
//! belong to the surrounding source, which the patch engine leaves in place
//! because block ranges start after them.

use crate::render::SyntaxToken;
use crate::rich_text::RichText;
use crate::style::MarkupElementType;

const HARD_BREAK: &str = "  \n";

/// Rebuild markdown for a block of `element_type` from its rich text.
/// `language` is the code fence info string and is only used for code blocks.
pub fn reconstruct(rich: &RichText, element_type: MarkupElementType, language: Option<&str>) -> String {
    if element_type == MarkupElementType::CodeBlock {
        return code_fence(rich.as_str(), language);
    }

    let inline = reconstruct_inline(rich);
    match element_type.heading_level() {
        Some(level) => format!("{} {}", "#".repeat(level as usize), inline),
        None => inline,
    }
}

/// Inline markdown for every attribute run, concatenated. A newline inside
/// inline text is a hard break and is written back as two trailing spaces.
pub fn reconstruct_inline(rich: &RichText) -> String {
    let text = rich.as_str();
    rich.attribute_runs()
        .into_iter()
        .map(|(range, recovery)| {
            let body = text[range].replace('\n', HARD_BREAK);
            let wrapped = wrap(&body, &recovery.syntax_tokens());
            match &recovery.link_destination {
                Some(destination) => format!("[{}]({})", wrapped, destination),
                None => wrapped,
            }
        })
        .collect()
}

/// `[t0, .., tn]` around `s` gives `t0..tn s tn..t0`.
pub fn wrap(text: &str, stack: &[SyntaxToken]) -> String {
    stack.iter().rev().fold(text.to_string(), |inner, token| {
        let delimiter = token.as_str();
        format!("{delimiter}{inner}{delimiter}")
    })
}

fn code_fence(text: &str, language: Option<&str>) -> String {
    let newline = if text.is_empty() || text.ends_with('\n') { "" } else { "\n" };
    format!("```{}\n{}{}```", language.unwrap_or(""), text, newline)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
