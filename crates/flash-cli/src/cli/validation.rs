use flash_transform::classify;

/// Parse a package specifier given on the command line.
///
/// Accepts what an import statement would resolve against the dependency
/// tree: `react`, `react-dom/client`, `@scope/pkg`. Relative paths, URLs
/// and bare `@scope` names are rejected.
pub fn parse_package(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Package name cannot be empty".to_string());
    }

    if !classify(trimmed).is_dependency() {
        return Err(format!(
            "'{}' is not a package specifier; use a name like 'react' or '@scope/pkg'",
            trimmed
        ));
    }

    if trimmed.starts_with('@') && !trimmed.contains('/') {
        return Err(format!(
            "Scoped package '{}' is missing its name, e.g. '{}/pkg'",
            trimmed, trimmed
        ));
    }

    Ok(trimmed.to_string())
}
