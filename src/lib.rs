//! # blobstage
//!
//! Content resolution and presentation core for blob-stored game listings.
//!
//! Given an opaque content identifier, blobstage fetches the raw bytes from a
//! blob-storage aggregator, classifies the payload (plain image vs. packaged
//! Unity WebGL build), materializes the build's runtime assets as revocable
//! resource handles, and drives the strictly-ordered bootstrap sequence that
//! starts the external game runtime. Durable state (listings, blobs) lives in
//! external networks reached through their published endpoints; this crate
//! owns only the resolution pipeline and the bootstrap state machine.
//!
//! ## Modules
//!
//! - [`util`] - Error taxonomy and shared helpers
//! - [`unity`] - Unity WebGL build-package knowledge (patterns, content types, archive probe)
//! - [`resolve`] - Content resolver: fetch, classify, materialize handles, session worker
//! - [`bootstrap`] - Game bootstrap sequencer and its injected capabilities
//! - [`listing`] - Listing metadata record and display helpers
//! - [`settings`] - Persistent configuration (aggregator endpoint, product metadata)
//!
//! ## Example
//!
//! ```ignore
//! use blobstage::prelude::*;
//!
//! let settings = Settings::default();
//! let fetcher = HttpFetcher::from_settings(&settings)?;
//! let registry = UrlRegistry::new();
//! let id = ContentId::new("abc123")?;
//!
//! match resolve(&fetcher, &registry, &id)? {
//!     Classification::Game(assets) => { /* hand to the bootstrap sequencer */ }
//!     Classification::Image(handle) => { /* render via handle.url() */ }
//!     Classification::Unrecognized => {}
//! }
//! ```

pub mod util;
pub mod unity;
pub mod resolve;
pub mod bootstrap;
pub mod listing;
pub mod settings;

// Re-export commonly used types
pub use util::{Error, Result};
pub use resolve::{resolve, Classification, ContentId};
pub use resolve::handle::{ResourceHandle, UrlRegistry};
pub use settings::Settings;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::resolve::{resolve, Classification, ContentId};
    pub use crate::resolve::fetch::{BlobFetcher, HttpFetcher, Payload};
    pub use crate::resolve::handle::{ResourceHandle, UrlRegistry};
    pub use crate::resolve::session::ResolverSession;
    pub use crate::bootstrap::{Phase, RuntimeConfig, Sequencer};
    pub use crate::unity::{BuildSet, BuildSlot};
    pub use crate::settings::Settings;
}
