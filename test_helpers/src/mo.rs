//! Writer for binary MO catalogs.
//!
//! Produces the little-endian layout read by GNU gettext: a seven word
//! header, the original and translation string tables, then the
//! NUL-terminated strings. No hash table is emitted. Entries are written in
//! sorted order with the metadata entry (empty msgid) first.
//!
//! # Examples
//!
//! ```
//! use test_helpers::mo::MoCatalog;
//!
//! let bytes = MoCatalog::new()
//!     .message("Hello", "Hallo")
//!     .plural("%(n)d file", "%(n)d files", ["%(n)d Datei", "%(n)d Dateien"])
//!     .to_bytes()?;
//! assert_eq!(bytes.get(..4), Some(&[0xde, 0x12, 0x04, 0x95][..]));
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use camino::Utf8Path;

const MAGIC: u32 = 0x9504_12de;
const HEADER_WORDS: u32 = 7;
const DEFAULT_PLURAL_FORMS: &str = "nplurals=2; plural=(n != 1);";

/// In-memory catalog serialised with [`MoCatalog::to_bytes`].
#[derive(Debug, Clone)]
#[must_use]
pub struct MoCatalog {
    plural_forms: String,
    entries: BTreeMap<String, String>,
}

impl Default for MoCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MoCatalog {
    /// Starts an empty catalog using the Germanic plural rule.
    pub fn new() -> Self {
        Self {
            plural_forms: DEFAULT_PLURAL_FORMS.to_owned(),
            entries: BTreeMap::new(),
        }
    }

    /// Replaces the `Plural-Forms` header, for example
    /// `nplurals=1; plural=0;`.
    pub fn plural_forms(mut self, header: impl Into<String>) -> Self {
        self.plural_forms = header.into();
        self
    }

    /// Adds a plain entry.
    pub fn message(mut self, msgid: impl Into<String>, msgstr: impl Into<String>) -> Self {
        self.entries.insert(msgid.into(), msgstr.into());
        self
    }

    /// Adds an entry under `msgctxt`, keyed as `msgctxt\x04msgid`.
    pub fn contextual(
        mut self,
        msgctxt: &str,
        msgid: &str,
        msgstr: impl Into<String>,
    ) -> Self {
        self.entries
            .insert(format!("{msgctxt}\u{4}{msgid}"), msgstr.into());
        self
    }

    /// Adds a plural entry with one translation per plural form.
    pub fn plural<I, S>(mut self, singular: &str, plural: &str, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = forms
            .into_iter()
            .map(|form| form.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("\0");
        self.entries.insert(format!("{singular}\0{plural}"), joined);
        self
    }

    fn header(&self) -> String {
        format!(
            "Content-Type: text/plain; charset=UTF-8\nPlural-Forms: {}\n",
            self.plural_forms
        )
    }

    /// Serialises the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when an offset does not fit in 32 bits.
    #[expect(
        clippy::little_endian_bytes,
        reason = "MO files are written little-endian to match the magic number"
    )]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut entries = self.entries.clone();
        entries.insert(String::new(), self.header());

        let count = u32::try_from(entries.len()).context("too many catalog entries")?;
        let originals_offset = HEADER_WORDS * 4;
        let translations_offset = originals_offset + count * 8;
        let strings_offset = translations_offset + count * 8;

        let mut table = Vec::new();
        let mut strings = Vec::new();
        let mut cursor = strings_offset;
        let mut push_string = |text: &str, descriptors: &mut Vec<u32>| -> Result<()> {
            let length = u32::try_from(text.len()).context("catalog string too long")?;
            descriptors.push(length);
            descriptors.push(cursor);
            strings.extend_from_slice(text.as_bytes());
            strings.push(0);
            cursor = cursor
                .checked_add(length + 1)
                .context("catalog exceeds 4 GiB")?;
            Ok(())
        };
        let mut originals = Vec::new();
        for msgid in entries.keys() {
            push_string(msgid, &mut originals)?;
        }
        let mut translations = Vec::new();
        for msgstr in entries.values() {
            push_string(msgstr, &mut translations)?;
        }
        table.extend(originals);
        table.extend(translations);

        let header = [
            MAGIC,
            0,
            count,
            originals_offset,
            translations_offset,
            0,
            strings_offset,
        ];
        let mut bytes = Vec::new();
        for word in header.iter().chain(&table) {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes.extend_from_slice(&strings);
        Ok(bytes)
    }

    /// Writes the catalog to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error when serialisation or any filesystem operation fails.
    pub fn write_to(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).with_context(|| format!("write {path}"))
    }
}
