//! Unity WebGL build-package knowledge.
//!
//! A runnable build is a zip archive carrying four generated files, matched
//! by name suffix rather than full path (builds nest them under an arbitrary
//! directory): the loader script, the data bundle, the framework script and
//! the wasm code module. Each may ship gzip-compressed with a `.gz` suffix;
//! the compression is passed through untouched and only recorded as an
//! encoding tag on the materialized content type.

pub mod archive;

pub use archive::{PackageArchive, Probe};

use std::fmt;

/// Suffix identifying the loader script entry.
pub const LOADER_SUFFIX: &str = "Build.loader.js";

/// Suffixes identifying the data bundle entry.
pub const DATA_SUFFIXES: [&str; 2] = ["Build.data", "Build.data.gz"];

/// Suffixes identifying the framework script entry.
pub const FRAMEWORK_SUFFIXES: [&str; 2] = ["Build.framework.js", "Build.framework.js.gz"];

/// Suffixes identifying the wasm code entry.
pub const CODE_SUFFIXES: [&str; 2] = ["Build.wasm", "Build.wasm.gz"];

/// The four asset roles a runnable build must fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildSlot {
    /// Runtime loader script (`*Build.loader.js`)
    Loader,
    /// Asset data bundle (`*Build.data[.gz]`)
    Data,
    /// Engine framework script (`*Build.framework.js[.gz]`)
    Framework,
    /// Wasm code module (`*Build.wasm[.gz]`)
    Code,
}

impl BuildSlot {
    /// All slots, in the order the original build tooling lists them.
    pub const ALL: [BuildSlot; 4] =
        [BuildSlot::Loader, BuildSlot::Data, BuildSlot::Framework, BuildSlot::Code];

    /// Check whether an archive entry name fills this slot.
    ///
    /// Matching is by suffix only; when several entries match, the first in
    /// enumeration order wins (callers must not depend on which).
    pub fn matches(&self, name: &str) -> bool {
        match self {
            BuildSlot::Loader => name.ends_with(LOADER_SUFFIX),
            BuildSlot::Data => DATA_SUFFIXES.iter().any(|s| name.ends_with(s)),
            BuildSlot::Framework => FRAMEWORK_SUFFIXES.iter().any(|s| name.ends_with(s)),
            BuildSlot::Code => CODE_SUFFIXES.iter().any(|s| name.ends_with(s)),
        }
    }

    /// Human-readable slot name.
    pub fn label(&self) -> &'static str {
        match self {
            BuildSlot::Loader => "loader",
            BuildSlot::Data => "data",
            BuildSlot::Framework => "framework",
            BuildSlot::Code => "code",
        }
    }
}

impl fmt::Display for BuildSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A quadruple of per-slot values (entry names, bytes, resource handles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSet<T> {
    pub loader: T,
    pub data: T,
    pub framework: T,
    pub code: T,
}

impl<T> BuildSet<T> {
    /// Borrow the value for a slot.
    pub fn get(&self, slot: BuildSlot) -> &T {
        match slot {
            BuildSlot::Loader => &self.loader,
            BuildSlot::Data => &self.data,
            BuildSlot::Framework => &self.framework,
            BuildSlot::Code => &self.code,
        }
    }

    /// Mutably borrow the value for a slot.
    pub fn get_mut(&mut self, slot: BuildSlot) -> &mut T {
        match slot {
            BuildSlot::Loader => &mut self.loader,
            BuildSlot::Data => &mut self.data,
            BuildSlot::Framework => &mut self.framework,
            BuildSlot::Code => &mut self.code,
        }
    }

    /// Iterate (slot, value) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (BuildSlot, &T)> {
        BuildSlot::ALL.iter().map(move |&slot| (slot, self.get(slot)))
    }

    /// Build a set by evaluating a fallible constructor per slot.
    ///
    /// Stops at the first failure; values already built are dropped, which
    /// releases anything (e.g. resource handles) they own.
    pub fn try_build<E>(
        mut f: impl FnMut(BuildSlot) -> std::result::Result<T, E>,
    ) -> std::result::Result<Self, E> {
        Ok(Self {
            loader: f(BuildSlot::Loader)?,
            data: f(BuildSlot::Data)?,
            framework: f(BuildSlot::Framework)?,
            code: f(BuildSlot::Code)?,
        })
    }
}

/// Base media type of a build entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    /// JavaScript source
    Script,
    /// WebAssembly module
    Wasm,
    /// Opaque binary data
    Binary,
}

impl BaseType {
    /// Canonical MIME name.
    pub fn mime(&self) -> &'static str {
        match self {
            BaseType::Script => "application/javascript",
            BaseType::Wasm => "application/wasm",
            BaseType::Binary => "application/octet-stream",
        }
    }
}

/// Transfer encoding recorded on a build entry.
///
/// Informational only: no decoding happens at this layer, the runtime
/// consumes the compressed bytes directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    Brotli,
}

/// Content type inferred from an entry's literal file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryType {
    pub base: BaseType,
    pub encoding: ContentEncoding,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encoding {
            ContentEncoding::Identity => f.write_str(self.base.mime()),
            ContentEncoding::Gzip => write!(f, "{}; encoding=gzip", self.base.mime()),
            ContentEncoding::Brotli => write!(f, "{}; encoding=br", self.base.mime()),
        }
    }
}

/// Fixed suffix-to-type table for build entries.
///
/// `.js` maps to script, `.wasm` to a wasm module, `.data` to binary; a
/// `.gz`/`.br`-suffixed variant of each maps to the same base type tagged
/// with the encoding. Anything else is opaque binary.
pub fn entry_type(name: &str) -> EntryType {
    let (stripped, encoding) = if let Some(base) = name.strip_suffix(".gz") {
        (base, ContentEncoding::Gzip)
    } else if let Some(base) = name.strip_suffix(".br") {
        (base, ContentEncoding::Brotli)
    } else {
        (name, ContentEncoding::Identity)
    };

    let base = if stripped.ends_with(".js") {
        BaseType::Script
    } else if stripped.ends_with(".wasm") {
        BaseType::Wasm
    } else {
        BaseType::Binary
    };

    EntryType { base, encoding }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_matches_by_suffix() {
        assert!(BuildSlot::Loader.matches("mygame/Foo.Build.loader.js"));
        assert!(BuildSlot::Data.matches("Foo.Build.data"));
        assert!(BuildSlot::Data.matches("Foo.Build.data.gz"));
        assert!(BuildSlot::Framework.matches("deep/dir/Foo.Build.framework.js.gz"));
        assert!(BuildSlot::Code.matches("Foo.Build.wasm.gz"));

        // Full-path equality is never required
        assert!(BuildSlot::Loader.matches("Build.loader.js"));
    }

    #[test]
    fn test_slot_rejects_unrelated_names() {
        assert!(!BuildSlot::Loader.matches("Build.loader.js.map"));
        assert!(!BuildSlot::Data.matches("Build.data.br.old"));
        assert!(!BuildSlot::Code.matches("readme.txt"));
        assert!(!BuildSlot::Framework.matches("Build.framework.css"));
    }

    #[test]
    fn test_entry_type_table() {
        assert_eq!(entry_type("Foo.Build.loader.js").to_string(), "application/javascript");
        assert_eq!(entry_type("Foo.Build.wasm").to_string(), "application/wasm");
        assert_eq!(entry_type("Foo.Build.data").to_string(), "application/octet-stream");
        assert_eq!(
            entry_type("Foo.Build.framework.js.gz").to_string(),
            "application/javascript; encoding=gzip"
        );
        assert_eq!(
            entry_type("Foo.Build.wasm.br").to_string(),
            "application/wasm; encoding=br"
        );
        assert_eq!(
            entry_type("Foo.Build.data.gz").to_string(),
            "application/octet-stream; encoding=gzip"
        );
    }

    #[test]
    fn test_entry_type_unknown_suffix_is_binary() {
        let t = entry_type("notes.txt");
        assert_eq!(t.base, BaseType::Binary);
        assert_eq!(t.encoding, ContentEncoding::Identity);
    }

    #[test]
    fn test_build_set_try_build_stops_on_error() {
        let mut calls = 0;
        let result: Result<BuildSet<u32>, &str> = BuildSet::try_build(|slot| {
            calls += 1;
            if slot == BuildSlot::Framework { Err("boom") } else { Ok(1) }
        });
        assert!(result.is_err());
        assert_eq!(calls, 3); // loader, data, framework; code never attempted
    }
}
