//! Paginated text export of a resume or cover letter.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::info;

use jobhero_core::{DocumentKind, ExportDocument, JobToolkit, LayoutOptions, ResumeTemplate};

use super::{read_text, write_file, Context};

pub fn run(
    ctx: &Context,
    toolkit: &Path,
    kind: DocumentKind,
    template: &str,
    layout: LayoutOptions,
) -> Result<()> {
    let template: ResumeTemplate = template.parse().map_err(anyhow::Error::msg)?;
    ctx.require_template(template)?;

    if layout.max_columns == 0 || layout.lines_per_page == 0 {
        anyhow::bail!("--columns and --lines-per-page must be positive");
    }

    let toolkit: JobToolkit = serde_json::from_str(&read_text(toolkit)?)
        .with_context(|| format!("Failed to parse toolkit {}", toolkit.display()))?;

    let text = match kind {
        DocumentKind::Resume => &toolkit.resume,
        DocumentKind::CoverLetter => &toolkit.cover_letter,
    };
    if text.trim().is_empty() {
        anyhow::bail!("The toolkit has no {} to export", kind);
    }

    let document = ExportDocument::new(kind, text, layout);
    let path = ctx
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(document.file_name("txt")));

    write_file(&path, &document.to_text())?;
    info!(
        path = %path.display(),
        pages = document.pages.len(),
        template = %template,
        "Exported document"
    );
    Ok(())
}
