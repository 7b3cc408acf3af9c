use std::path::{Component, Path};

/// Normalized module identifier: `path` relative to `root`, `/`-separated
/// and lower-cased.
///
/// Paths outside `root` keep their full normalized form.
pub fn module_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect();

    parts.join("/").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_forward_slash_lower_case() {
        let root = Path::new("/work/site");
        assert_eq!(
            module_id(root, Path::new("/work/site/src/App.tsx")),
            "src/app.tsx"
        );
        assert_eq!(
            module_id(root, Path::new("/work/site/src/./ui/Button.jsx")),
            "src/ui/button.jsx"
        );
    }

    #[test]
    fn outside_root_is_kept_whole() {
        let root = Path::new("/work/site");
        assert_eq!(
            module_id(root, Path::new("/tmp/Other.ts")),
            "tmp/other.ts"
        );
    }
}
