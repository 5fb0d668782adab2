//! Temporary locale directories populated with MO catalogs.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::mo::MoCatalog;

/// A `<root>/<lang>/LC_MESSAGES/<domain>.mo` tree removed on drop.
///
/// # Examples
///
/// ```
/// use test_helpers::{locale_tree::LocaleTree, mo::MoCatalog};
///
/// let tree = LocaleTree::new()?;
/// let path = tree.install("de", "shop", &MoCatalog::new().message("Cart", "Warenkorb"))?;
/// assert!(path.ends_with("de/LC_MESSAGES/shop.mo"));
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct LocaleTree {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl LocaleTree {
    /// Creates an empty tree in a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or its path is
    /// not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create temporary locale directory")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("non-UTF-8 temp dir: {}", path.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Root to pass as a `localedir`.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }

    /// Location of the catalog for `language` and `domain`.
    #[must_use]
    pub fn catalog_path(&self, language: &str, domain: &str) -> Utf8PathBuf {
        self.root
            .join(language)
            .join("LC_MESSAGES")
            .join(format!("{domain}.mo"))
    }

    /// Writes `catalog` for `language` and `domain`, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be written.
    pub fn install(
        &self,
        language: &str,
        domain: &str,
        catalog: &MoCatalog,
    ) -> Result<Utf8PathBuf> {
        let path = self.catalog_path(language, domain);
        catalog.write_to(&path)?;
        Ok(path)
    }

    /// Writes raw bytes where a catalog is expected.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn install_bytes(&self, language: &str, domain: &str, bytes: &[u8]) -> Result<Utf8PathBuf> {
        let path = self.catalog_path(language, domain);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        std::fs::write(&path, bytes).with_context(|| format!("write {path}"))?;
        Ok(path)
    }
}
