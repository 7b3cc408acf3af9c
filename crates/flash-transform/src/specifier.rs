//! String-based classification of module specifiers.
//!
//! Classification never consults a package manifest: the runtime and asset
//! allow-lists are fixed, and anything else that is not a path falls into
//! [`SpecifierKind::Bare`].

/// Query flag that turns a request into an asset-URL module.
pub const ASSET_FLAG: &str = "import";

/// UI runtime entry points that are always served from pre-bundled artifacts.
pub const RUNTIME_MODULES: &[&str] = &[
    "react",
    "react-dom",
    "react-dom/client",
    "react/jsx-runtime",
    "react/jsx-dev-runtime",
];

/// Image and document extensions imported as URLs rather than code.
pub const ASSET_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg", "webp", "heif", "heic", "avif", "eps",
    "pdf", "ai", "raw", "cr2", "nef", "orf", "sr2", "apng", "ico", "xbm", "pbm", "pgm", "ppm",
    "exr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `./` or `../`, or a server-absolute `/` path
    Relative,
    /// Full URL (`https://`, `data:`); the browser fetches it as-is
    External,
    /// Image or document import; `flagged` when the asset flag is present
    Asset { flagged: bool },
    /// Member of [`RUNTIME_MODULES`]
    Runtime,
    /// Any other package reference
    Bare,
}

impl SpecifierKind {
    /// Whether the specifier is served from the dependency artifact store.
    pub fn is_dependency(self) -> bool {
        matches!(self, Self::Runtime | Self::Bare)
    }
}

/// Classify a specifier. Asset extensions win over path prefixes, so
/// `./logo.png` is an asset import.
pub fn classify(specifier: &str) -> SpecifierKind {
    let (path, query) = split_query(specifier);

    if is_asset_path(path) {
        return SpecifierKind::Asset {
            flagged: query.is_some_and(has_asset_flag),
        };
    }

    if path.starts_with("./") || path.starts_with("../") || path.starts_with('/') {
        return SpecifierKind::Relative;
    }

    if path.starts_with("data:") || path.contains("://") {
        return SpecifierKind::External;
    }

    if RUNTIME_MODULES.contains(&path) {
        return SpecifierKind::Runtime;
    }

    SpecifierKind::Bare
}

/// Split off a `?query` (and any `#hash`) suffix.
pub fn split_query(specifier: &str) -> (&str, Option<&str>) {
    let specifier = specifier
        .split_once('#')
        .map_or(specifier, |(before, _)| before);
    match specifier.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (specifier, None),
    }
}

/// Whether a query string carries the asset flag.
pub fn has_asset_flag(query: &str) -> bool {
    query
        .split('&')
        .any(|pair| pair == ASSET_FLAG || pair.starts_with("import="))
}

fn is_asset_path(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ASSET_EXTENSIONS
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}

/// Append the asset flag unless it is already present.
pub fn with_asset_flag(specifier: &str) -> String {
    let (_, query) = split_query(specifier);
    if query.is_some_and(has_asset_flag) {
        return specifier.to_string();
    }

    let (body, hash) = match specifier.split_once('#') {
        Some((body, hash)) => (body, Some(hash)),
        None => (specifier, None),
    };
    let separator = match query {
        Some("") => "",
        Some(_) => "&",
        None => "?",
    };

    let mut flagged = format!("{body}{separator}{ASSET_FLAG}");
    if let Some(hash) = hash {
        flagged.push('#');
        flagged.push_str(hash);
    }
    flagged
}

/// Cache key for a dependency specifier: the specifier without its query.
///
/// Sub-path imports keep their sub-path, so `lodash/debounce` and `lodash`
/// are cached separately.
pub fn dependency_key(specifier: &str) -> &str {
    split_query(specifier).0.trim_end_matches('/')
}

/// Package name of a dependency specifier. Scoped packages take two
/// segments.
pub fn package_name(specifier: &str) -> &str {
    let key = dependency_key(specifier);
    let segments = if key.starts_with('@') { 2 } else { 1 };

    let mut end = key.len();
    let mut seen = 0;
    for (index, ch) in key.char_indices() {
        if ch == '/' {
            seen += 1;
            if seen == segments {
                end = index;
                break;
            }
        }
    }
    &key[..end]
}

/// Sub-path below the package root, if any (`client` for `react-dom/client`).
pub fn subpath(specifier: &str) -> Option<&str> {
    let key = dependency_key(specifier);
    let package = package_name(key);
    key.get(package.len() + 1..).filter(|rest| !rest.is_empty())
}
