//! Stack naming convention

/// Derive the stack name for a project deployed to an environment
///
/// `lowercase(project + "-" + environment)` with whitespace replaced by
/// hyphens. The lowercased region code is appended unless the name
/// already contains it.
pub fn derive_stack_name(project: &str, environment: &str, region: &str) -> String {
    let base = format!(
        "{}-{}",
        project.replace(char::is_whitespace, "-"),
        environment.replace(char::is_whitespace, "-")
    )
    .to_lowercase();

    let region = region.trim().to_lowercase();
    if region.is_empty() || base.contains(&region) {
        base
    } else {
        format!("{}-{}", base, region)
    }
}
