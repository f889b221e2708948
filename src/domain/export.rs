//! Delimited text export of chain results

use std::path::Path;

use tracing::info;

use super::chain::StepOutput;
use super::DomainError;

/// Extension of exported artifacts
pub const EXPORT_EXTENSION: &str = "txt";

const CHAIN_MARKER: &str = "🔗";

/// Render outputs as numbered, separator-delimited blocks
///
/// Each block carries one link marker per position, a header line, the
/// output's text form and a blank-line separator.
pub fn render_delimited(items: &[StepOutput]) -> String {
    let mut rendered = String::new();

    for (position, item) in items.iter().enumerate().map(|(i, item)| (i + 1, item)) {
        rendered.push_str(&CHAIN_MARKER.repeat(position));
        rendered.push_str(&format!(
            " -------- Prompt Chain Result #{} -------------\n\n",
            position
        ));
        rendered.push_str(&item.to_text());
        rendered.push_str("\n\n");
    }

    rendered
}

/// Write `items` to `<dir>/<name>.txt` and return the rendered text
///
/// An existing artifact with the same name is overwritten.
pub async fn export_delimited(
    dir: impl AsRef<Path>,
    name: &str,
    items: &[StepOutput],
) -> Result<String, DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Export name cannot be empty"));
    }

    let dir = dir.as_ref();
    let rendered = render_delimited(items);
    let path = dir.join(format!("{}.{}", name, EXPORT_EXTENSION));

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, rendered.as_bytes()).await?;

    info!(path = %path.display(), items = items.len(), "Exported chain results");

    Ok(rendered)
}
