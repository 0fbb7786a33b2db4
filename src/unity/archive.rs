//! Archive probe for packaged builds.
//!
//! Wraps a zip reader over an in-memory payload. Opening never fails loudly:
//! bytes that do not parse as a zip are simply not a package, and the caller
//! falls back to opaque handling. Reading a classified entry, by contrast,
//! fails hard with [`Error::ArchiveEntry`](crate::Error::ArchiveEntry) since
//! a runnable build is all-or-nothing.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::unity::{BuildSet, BuildSlot};
use crate::util::{Error, Result};

/// Outcome of probing a payload for a packaged build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// All four build slots matched; holds the matched entry names.
    Package(BuildSet<String>),
    /// Valid archive, but at least one required slot is unfilled.
    Incomplete,
    /// The bytes are not a valid archive at all.
    NotAnArchive,
}

/// A zip payload being inspected for a runnable build.
pub struct PackageArchive<'a> {
    zip: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> PackageArchive<'a> {
    /// Try to interpret raw payload bytes as an archive.
    ///
    /// Returns `None` when parsing fails; the payload is then treated as
    /// opaque binary by the caller, never reported as an error.
    pub fn open(bytes: &'a [u8]) -> Option<Self> {
        match ZipArchive::new(Cursor::new(bytes)) {
            Ok(zip) => Some(Self { zip }),
            Err(e) => {
                tracing::debug!("payload is not an archive: {e}");
                None
            }
        }
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.zip.is_empty()
    }

    /// Scan entry names for the four required build slots.
    ///
    /// Each slot takes the first matching entry in enumeration order.
    /// Returns `None` unless every slot is filled.
    pub fn classify(&mut self) -> Option<BuildSet<String>> {
        let names: Vec<String> = self.zip.file_names().map(String::from).collect();

        let find = |slot: BuildSlot| {
            names.iter().find(|name| slot.matches(name)).cloned()
        };

        let set = BuildSet {
            loader: find(BuildSlot::Loader)?,
            data: find(BuildSlot::Data)?,
            framework: find(BuildSlot::Framework)?,
            code: find(BuildSlot::Code)?,
        };
        tracing::debug!(
            loader = %set.loader,
            data = %set.data,
            framework = %set.framework,
            code = %set.code,
            "classified packaged build"
        );
        Some(set)
    }

    /// Read the raw bytes of a named entry, without decoding.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .zip
            .by_name(name)
            .map_err(|e| Error::archive_entry(name, e.to_string()))?;
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)
            .map_err(|e| Error::archive_entry(name, e.to_string()))?;
        Ok(bytes)
    }
}

/// One-shot probe: parse and classify in a single call.
pub fn probe(bytes: &[u8]) -> Probe {
    match PackageArchive::open(bytes) {
        Some(mut pkg) => match pkg.classify() {
            Some(names) => Probe::Package(names),
            None => Probe::Incomplete,
        },
        None => Probe::NotAnArchive,
    }
}
