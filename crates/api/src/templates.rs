//! Page template loading.

use tera::Tera;

/// Compile every `*.html` template below `dir`.
///
/// Tera autoescapes `.html` templates, so pad names are rendered safely.
pub fn load_templates(dir: &str) -> Result<Tera, tera::Error> {
    let glob = format!("{}/**/*.html", dir.trim_end_matches('/'));
    let tera = Tera::new(&glob)?;
    tracing::debug!(
        dir,
        count = tera.get_template_names().count(),
        "Templates compiled"
    );
    Ok(tera)
}
