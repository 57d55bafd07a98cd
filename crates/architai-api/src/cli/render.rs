//! Terminal rendering of conversations and final designs.
//!
//! Designs and transcripts are first built as markdown (also what `--json`-less
//! exports print), then `DesignRenderer` formats prose with `termimad` and
//! highlights fenced blocks with `syntect`.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

use architai_core::diagram::clean_mermaid_markup;
use architai_core::session::ConversationLog;
use architai_types::design::FinalDesign;
use architai_types::message::Message;

const THEME: &str = "base16-ocean.dark";

/// Terminal markdown renderer with syntax highlighting.
pub struct DesignRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl DesignRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        let accent = termimad::crossterm::style::Color::Cyan;
        skin.bold.set_fg(accent);
        skin.headers[0].set_fg(accent);
        skin.headers[1].set_fg(accent);
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render markdown: prose through termimad, fenced blocks highlighted.
    pub fn render(&self, markdown: &str) -> String {
        let mut output = String::new();
        for block in split_blocks(markdown) {
            match block {
                Block::Prose(text) => {
                    let _ = write!(output, "{}", self.skin.term_text(&text));
                }
                Block::Code { lang, body } => {
                    output.push_str(&self.highlight_code(&body, lang));
                    output.push('\n');
                }
            }
        }
        output
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut output = String::new();
        let label = if lang.is_empty() { "code" } else { lang };
        let _ = writeln!(output, "  {}", console::style(format!("--- {label} ---")).dim());

        let Some(theme) = self.theme_set.themes.get(THEME) else {
            for line in code.lines() {
                let _ = writeln!(output, "  {line}");
            }
            return output;
        };

        let mut h = HighlightLines::new(syntax, theme);
        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            let _ = writeln!(output, "  {escaped}\x1b[0m");
        }

        output
    }
}

impl Default for DesignRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Markdown document for a final design. Empty sections are left out.
pub fn design_markdown(design: &FinalDesign) -> String {
    let mut md = String::from("# Final Design\n\n");

    if !design.summary.trim().is_empty() {
        let _ = writeln!(md, "{}\n", design.summary.trim());
    }

    if !design.components.is_empty() {
        md.push_str("## Components\n\n");
        for component in &design.components {
            let _ = writeln!(md, "### {}\n", component.name);
            if !component.description.trim().is_empty() {
                let _ = writeln!(md, "{}\n", component.description.trim());
            }
            let details = &component.details;
            if !details.technology_stack.is_empty() {
                let _ = writeln!(
                    md,
                    "- **Technology stack:** {}",
                    details.technology_stack.join(", ")
                );
            }
            if !details.responsibilities.is_empty() {
                md.push_str("- **Responsibilities:**\n");
                for item in &details.responsibilities {
                    let _ = writeln!(md, "  - {item}");
                }
            }
            if !details.technology_stack.is_empty() || !details.responsibilities.is_empty() {
                md.push('\n');
            }
        }
    }

    if let Some(schema) = non_blank(design.db_schema.as_deref()) {
        md.push_str("## Database Schema\n\n");
        push_fenced(&mut md, "sql", schema);
    }

    if let Some(mermaid) = non_blank(design.mermaid.as_deref()) {
        md.push_str("## Architecture Diagram\n\n");
        push_fenced(&mut md, "mermaid", &clean_mermaid_markup(mermaid));
    }

    for extra in design.extra_diagrams() {
        if let Some(content) = non_blank(extra.content.as_deref()) {
            let _ = writeln!(md, "### {}\n", extra.label());
            push_fenced(&mut md, "mermaid", &clean_mermaid_markup(content));
        }
    }

    if !design.tech_stack.is_empty() {
        md.push_str("## Tech Stack\n\n");
        for item in &design.tech_stack {
            let _ = writeln!(md, "- {item}");
        }
        md.push('\n');
    }

    if !design.integration_steps.is_empty() {
        md.push_str("## Integration Steps\n\n");
        for (idx, step) in design.integration_steps.iter().enumerate() {
            let _ = writeln!(md, "{}. {step}", idx + 1);
        }
        md.push('\n');
    }

    if let Some(rationale) = non_blank(design.rationale.as_deref()) {
        let _ = writeln!(md, "## Rationale\n\n{rationale}\n");
    }

    if let Some(url) = non_blank(design.diagram_url.as_deref()) {
        let _ = writeln!(md, "Diagram: {url}");
    }

    md
}

/// Markdown transcript of a stored conversation.
pub fn conversation_markdown(
    title: &str,
    created_at: Option<DateTime<Utc>>,
    log: &ConversationLog,
) -> String {
    let mut md = format!("# {title}\n\n");
    if let Some(created) = created_at {
        let _ = writeln!(md, "- **Started:** {}", created.format("%Y-%m-%d %H:%M UTC"));
    }
    let _ = writeln!(md, "- **Messages:** {}\n\n---\n", log.len());

    for message in log {
        match message {
            Message::User { text } => {
                let _ = writeln!(md, "### **You**\n\n{text}\n");
            }
            Message::Assistant { text } => {
                let _ = writeln!(md, "### **ArchitAI**\n\n{text}\n");
            }
            Message::FinalDesign { diagram_reference } => {
                let reference = diagram_reference.as_deref().unwrap_or("(no diagram)");
                let _ = writeln!(md, "### **Final design**\n\n{reference}\n");
            }
        }
    }

    md
}

/// A run of prose lines or one fenced code block.
#[derive(Debug, PartialEq, Eq)]
enum Block<'a> {
    Prose(String),
    Code { lang: &'a str, body: String },
}

/// Language tag of a fence line (empty for a bare fence).
fn fence_lang(line: &str) -> Option<&str> {
    line.trim_start()
        .strip_prefix("```")
        .map(|rest| rest.trim_matches('`').trim())
}

/// Split markdown into prose runs and fenced blocks. An unclosed fence runs
/// to the end of the text.
fn split_blocks(markdown: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut prose = String::new();
    let mut open: Option<(&str, String)> = None;

    for line in markdown.lines() {
        match (open.take(), fence_lang(line)) {
            (None, Some(lang)) => {
                if !prose.is_empty() {
                    blocks.push(Block::Prose(std::mem::take(&mut prose)));
                }
                open = Some((lang, String::new()));
            }
            (None, None) => {
                prose.push_str(line);
                prose.push('\n');
            }
            (Some((lang, body)), Some(_)) => blocks.push(Block::Code { lang, body }),
            (Some((lang, mut body)), None) => {
                body.push_str(line);
                body.push('\n');
                open = Some((lang, body));
            }
        }
    }

    if !prose.is_empty() {
        blocks.push(Block::Prose(prose));
    }
    if let Some((lang, body)) = open.filter(|(_, body)| !body.is_empty()) {
        blocks.push(Block::Code { lang, body });
    }
    blocks
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Append a fenced block, keeping text that is already fenced as-is.
fn push_fenced(md: &mut String, lang: &str, body: &str) {
    let body = body.trim();
    if body.lines().next().and_then(fence_lang).is_some() {
        let _ = writeln!(md, "{body}\n");
    } else {
        let _ = writeln!(md, "```{lang}\n{body}\n```\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_design() -> FinalDesign {
        serde_json::from_value(serde_json::json!({
            "summary": "A realtime chat platform.",
            "components": [
                {
                    "name": "Gateway",
                    "description": "WebSocket edge",
                    "details": {
                        "technology_stack": ["Rust", "axum"],
                        "responsibilities": ["Fan-out", "Auth"]
                    }
                },
                { "name": "Store", "desc": "Message history" }
            ],
            "db_schema": "CREATE TABLE messages (id BIGINT);",
            "mermaid": "```mermaid\ngraph TD\nA-->B\n```",
            "tech_stack": ["PostgreSQL", "Redis"],
            "integration_steps": ["Provision DB", "Deploy gateway"],
            "rationale": "Low latency.",
            "diagram_url": "https://diagrams.example/s.png"
        }))
        .unwrap()
    }

    #[test]
    fn test_design_markdown_sections() {
        let md = design_markdown(&sample_design());

        assert!(md.starts_with("# Final Design\n\nA realtime chat platform."));
        assert!(md.contains("### Gateway\n\nWebSocket edge"));
        assert!(md.contains("- **Technology stack:** Rust, axum"));
        assert!(md.contains("  - Fan-out"));
        assert!(md.contains("### Store\n\nMessage history"));
        assert!(md.contains("```sql\nCREATE TABLE messages (id BIGINT);\n```"));
        assert!(md.contains("```mermaid\ngraph TD\nA-->B\n```"));
        assert!(md.contains("1. Provision DB\n2. Deploy gateway"));
        assert!(md.contains("## Rationale\n\nLow latency."));
        assert!(md.ends_with("Diagram: https://diagrams.example/s.png\n"));
        // The service's own fence is not nested inside ours.
        assert!(!md.contains("```mermaid\n```mermaid"));
    }

    #[test]
    fn test_design_markdown_skips_empty_sections() {
        let design: FinalDesign =
            serde_json::from_value(serde_json::json!({ "summary": "Tiny" })).unwrap();
        let md = design_markdown(&design);

        assert_eq!(md, "# Final Design\n\nTiny\n\n");
    }

    #[test]
    fn test_conversation_markdown_labels_roles() {
        let mut log = ConversationLog::new();
        log.append(Message::user("Build a chat app")).unwrap();
        log.append(Message::assistant("How many users?")).unwrap();
        log.append(Message::final_design(None)).unwrap();

        let md = conversation_markdown("How many users?", None, &log);

        assert!(md.starts_with("# How many users?\n\n- **Messages:** 3"));
        assert!(md.contains("### **You**\n\nBuild a chat app"));
        assert!(md.contains("### **ArchitAI**\n\nHow many users?"));
        assert!(md.contains("### **Final design**\n\n(no diagram)"));
    }

    #[test]
    fn test_split_blocks_separates_prose_and_fences() {
        let blocks = split_blocks("# Title\nIntro\n```sql\nSELECT 1;\n```\nAfter\n```\nraw");

        assert_eq!(
            blocks,
            vec![
                Block::Prose("# Title\nIntro\n".to_string()),
                Block::Code {
                    lang: "sql",
                    body: "SELECT 1;\n".to_string()
                },
                Block::Prose("After\n".to_string()),
                Block::Code {
                    lang: "",
                    body: "raw\n".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_render_highlights_code_blocks() {
        let renderer = DesignRenderer::new();
        let out = renderer.render("Intro\n```sql\nSELECT 1;\n```\n");

        assert!(out.contains("--- sql ---"));
        assert!(out.contains("SELECT"));
    }
}
