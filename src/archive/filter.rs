//! Path-prefix exclusion for archive entries.

/// Excludes entries whose relative path starts with any configured prefix.
///
/// Matching is a plain string prefix test on the `/`-separated relative
/// path, so `build` also excludes `build.rs` and `build/out`.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    prefixes: Vec<String>,
}

impl ExcludeFilter {
    /// Creates a filter from prefixes. Empty prefixes are ignored.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { prefixes }
    }

    /// Returns true if `relative_path` matches one of the prefixes.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| relative_path.starts_with(prefix.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
