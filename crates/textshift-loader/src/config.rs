//! Loader configuration options

/// Default chunk size for reads (8 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Extensions shown when listing a folder of viewable files
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "csv", "json"];

/// Configuration for loading files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Bytes per read (default: 8192, never below 1)
    pub chunk_size: usize,
    /// Extensions, without the dot, that folder listings keep
    pub extensions: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }
}

impl LoaderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size; zero is raised to one
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Replace the listing extensions. A leading dot is accepted and dropped.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.chunk_size, 8192);
        assert_eq!(config.extensions, vec!["txt", "csv", "json"]);
    }

    #[test]
    fn test_builder_normalizes_values() {
        let config = LoaderConfig::new()
            .chunk_size(0)
            .extensions([".md", "log", ""]);
        assert_eq!(config.chunk_size, 1);
        assert_eq!(config.extensions, vec!["md", "log"]);
    }
}
