//! Mermaid file renderer.
//!
//! Writes cleaned diagram markup to `{dir}/{name}.mmd` so it can be opened
//! with any mermaid viewer or fed to `mmdc`.

use std::path::{Path, PathBuf};

use architai_core::diagram::{DiagramRenderer, RenderedDiagram};
use architai_types::error::DiagramError;

/// [`DiagramRenderer`] that stores markup as `.mmd` files.
#[derive(Debug, Clone)]
pub struct MermaidFileRenderer {
    dir: PathBuf,
}

impl MermaidFileRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Target path for a diagram name. Path separators in the name are
    /// replaced so every file lands directly in the output directory.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let file_name: String = name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("{file_name}.mmd"))
    }
}

impl DiagramRenderer for MermaidFileRenderer {
    async fn render(&self, name: &str, markup: &str) -> Result<RenderedDiagram, DiagramError> {
        if markup.trim().is_empty() {
            return Err(DiagramError::EmptyMarkup);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(name);
        let mut content = markup.to_string();
        if !content.ends_with('\n') {
            content.push('\n');
        }
        tokio::fs::write(&path, content).await?;

        tracing::debug!(path = %path.display(), "Wrote diagram");
        Ok(RenderedDiagram {
            name: name.to_string(),
            locator: path.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_render_writes_mmd_file() {
        let dir = tempdir().unwrap();
        let renderer = MermaidFileRenderer::new(dir.path().join("diagrams"));

        let rendered = renderer.render("s-1", "graph TD\nA-->B").await.unwrap();

        let path = dir.path().join("diagrams").join("s-1.mmd");
        assert_eq!(rendered.locator, path.display().to_string());
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "graph TD\nA-->B\n");
    }

    #[tokio::test]
    async fn test_render_rejects_empty_markup() {
        let dir = tempdir().unwrap();
        let renderer = MermaidFileRenderer::new(dir.path());

        let err = renderer.render("s-1", "  \n").await.unwrap_err();
        assert!(matches!(err, DiagramError::EmptyMarkup));
    }

    #[test]
    fn test_path_for_flattens_separators() {
        let renderer = MermaidFileRenderer::new("/out");
        assert_eq!(renderer.path_for("../etc/x"), PathBuf::from("/out/.._etc_x.mmd"));
    }
}
