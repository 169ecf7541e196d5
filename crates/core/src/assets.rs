//! Embedded UI asset bundle

use bytes::Bytes;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use tracing::debug;

/// Immutable path-to-bytes snapshot of the built admin UI.
///
/// Entries are keyed by forward-slash paths under the bundle root, for
/// example `ui/index.html` or `ui/_next/static/chunks/app.js`. The bundle is
/// built once at startup and shared for the process lifetime.
#[derive(Debug, Clone)]
pub struct AssetBundle {
    entries: HashMap<String, Bytes>,
    root: String,
    immutable_prefix: String,
}

impl AssetBundle {
    /// Prefix all bundle entries live under
    pub const DEFAULT_ROOT: &'static str = "ui";

    /// Prefix of content-hashed build output that may be cached forever
    pub const DEFAULT_IMMUTABLE_PREFIX: &'static str = "ui/_next/static/";

    /// Create an empty bundle with the default prefixes
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            root: Self::DEFAULT_ROOT.to_string(),
            immutable_prefix: Self::DEFAULT_IMMUTABLE_PREFIX.to_string(),
        }
    }

    /// Load every file under `dir` into a bundle, keyed by
    /// `<root>/<relative path>` with forward slashes.
    pub fn from_dir(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        let mut bundle = Self::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            for entry in std::fs::read_dir(&current)? {
                let entry = entry?;
                let path = entry.path();
                if entry.file_type()?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let relative = path
                    .strip_prefix(dir)
                    .map_err(|_| io::Error::other("walked path escaped the bundle directory"))?;
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let data = std::fs::read(&path)?;
                bundle.entries.insert(format!("{}/{key}", bundle.root), data.into());
            }
        }

        debug!(entries = bundle.entries.len(), "loaded UI asset bundle");
        Ok(bundle)
    }

    /// Bundle root prefix request paths are resolved under
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Prefix of assets safe to serve with an immutable cache policy
    pub fn immutable_prefix(&self) -> &str {
        &self.immutable_prefix
    }

    /// Insert a single entry, replacing any previous value
    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.entries.insert(path.into(), data.into());
    }

    /// Bytes stored at `path`, if present
    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.entries.get(path).cloned()
    }

    /// Whether an entry exists at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of entries in the bundle
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the bundle holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AssetBundle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut bundle = AssetBundle::new();
        assert!(bundle.is_empty());

        bundle.insert("ui/index.html", &b"<html></html>"[..]);
        assert_eq!(bundle.len(), 1);
        assert!(bundle.contains("ui/index.html"));
        assert_eq!(bundle.get("ui/index.html"), Some(Bytes::from_static(b"<html></html>")));
        assert!(bundle.get("ui/missing.html").is_none());
    }

    #[test]
    fn from_dir_keys_files_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        std::fs::create_dir_all(dir.path().join("_next/static/chunks")).unwrap();
        std::fs::write(dir.path().join("_next/static/chunks/app.js"), "console.log(1)").unwrap();

        let bundle = AssetBundle::from_dir(dir.path()).unwrap();
        assert_eq!(bundle.len(), 2);
        assert!(bundle.contains("ui/index.html"));
        assert!(bundle.contains("ui/_next/static/chunks/app.js"));
    }
}
