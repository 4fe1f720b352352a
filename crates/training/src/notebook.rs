//! Training script templating.

use crate::TrainingError;

/// Token in the script template replaced by the dataset version.
pub const VERSION_PLACEHOLDER: &str = "VERSION_NUMBER_PLACEHOLDER";

/// Substitute the dataset version into a script template.
///
/// Every occurrence of [`VERSION_PLACEHOLDER`] is replaced. A template
/// without the placeholder is rejected, since the run would silently train
/// on whatever version the script hard-codes.
pub fn render_notebook(template: &str, version: u32) -> Result<String, TrainingError> {
    if !template.contains(VERSION_PLACEHOLDER) {
        return Err(TrainingError::Validation(format!(
            "script template has no {VERSION_PLACEHOLDER}"
        )));
    }
    Ok(template.replace(VERSION_PLACEHOLDER, &version.to_string()))
}

/// Turn a kernel title into a Kaggle slug: lowercase ASCII alphanumerics
/// separated by single hyphens.
pub fn kernel_slug(title: &str) -> Result<String, TrainingError> {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();

    if slug.is_empty() {
        return Err(TrainingError::Validation(format!(
            "title '{title}' has no usable characters"
        )));
    }
    Ok(slug)
}
