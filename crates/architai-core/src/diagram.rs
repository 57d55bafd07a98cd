//! Diagram markup handling.
//!
//! The generation service returns diagram markup that is sometimes still
//! wrapped in a markdown code fence. [`clean_mermaid_markup`] strips the fence
//! and [`DiagramRenderer`] is the port a rendering backend implements.
//! Rendering is best-effort: failures are logged and never become session
//! errors.

use std::future::Future;

use architai_types::design::FinalDesign;
use architai_types::error::DiagramError;
use tracing::{debug, warn};

/// Where a rendered diagram ended up (a file path or URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub name: String,
    pub locator: String,
}

/// Turns diagram markup into a graphic.
pub trait DiagramRenderer: Send + Sync {
    fn render(
        &self,
        name: &str,
        markup: &str,
    ) -> impl Future<Output = Result<RenderedDiagram, DiagramError>> + Send;
}

/// Strip a leading ```` ```mermaid ```` fence line and a trailing ```` ``` ````.
///
/// Whatever follows `mermaid` on the opening line (`mermaid-v2`, a title) goes
/// with it.
pub fn clean_mermaid_markup(raw: &str) -> String {
    let mut markup = raw.trim();
    if markup.starts_with("```mermaid") {
        markup = markup.split_once('\n').map_or("", |(_, body)| body);
    } else if let Some(rest) = markup.strip_prefix("```") {
        markup = rest;
    }
    if let Some(rest) = markup.trim_end().strip_suffix("```") {
        markup = rest;
    }
    markup.trim().to_string()
}

/// Render the primary diagram and any extra diagrams of a final design.
///
/// The primary diagram is named after the session; extras get a numeric
/// suffix. Diagrams without markup are skipped and render failures are logged.
pub async fn render_design_diagrams<R: DiagramRenderer>(
    renderer: &R,
    session_id: &str,
    design: &FinalDesign,
) -> Vec<RenderedDiagram> {
    let mut sources = Vec::new();
    if let Some(markup) = design.mermaid.as_deref() {
        sources.push((session_id.to_string(), markup.to_string()));
    }
    for (idx, extra) in design.extra_diagrams().into_iter().enumerate() {
        if let Some(content) = extra.content {
            sources.push((format!("{session_id}-{}", idx + 1), content));
        }
    }

    let mut rendered = Vec::new();
    for (name, raw) in sources {
        let markup = clean_mermaid_markup(&raw);
        if markup.is_empty() {
            debug!(diagram = %name, "Skipping empty diagram markup");
            continue;
        }
        match renderer.render(&name, &markup).await {
            Ok(diagram) => rendered.push(diagram),
            Err(e) => warn!(diagram = %name, error = %e, "Diagram rendering failed"),
        }
    }
    rendered
}
