//! Atomic report writing
//!
//! The file is written to a temporary sibling and renamed into place, so a
//! failed run never leaves a partial report at the destination.

use crate::output::{RenderContext, ReportRenderer};
use oakreport_core::error::{ReportError, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write `bytes` to `path` atomically
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".oakreport-")
        .tempfile_in(parent)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Render with `renderer` and write the result to `path`
pub fn write_report(
    renderer: &dyn ReportRenderer,
    ctx: &RenderContext<'_>,
    path: &Path,
) -> Result<()> {
    let render_error = |message: String| ReportError::Render {
        path: path.to_path_buf(),
        message,
    };

    let bytes = renderer.render(ctx).map_err(|e| render_error(e.to_string()))?;
    write_atomic(path, &bytes).map_err(|e| render_error(e.to_string()))?;

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
