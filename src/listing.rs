//! Listing metadata for storefront entries.
//!
//! Mirrors the fields the on-chain listing object carries; querying the
//! chain itself is an external collaborator's job, this module only models
//! the record and the display conventions for price and addresses.

use serde::{Deserialize, Serialize};

/// Number of mist per SUI.
const MIST_PER_SUI: f64 = 1_000_000_000.0;

/// A registered game/content listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameListing {
    pub title: String,
    pub description: String,
    pub developer: String,
    pub owner: String,
    pub game_id: String,
    /// Price in mist, kept as the decimal string the chain returns.
    pub price: String,
    pub current_version: String,
    pub cover_image_blob_id: String,
    pub current_content_blob_id: String,
}

/// Format a mist amount as a SUI price, two decimal places.
pub fn format_price(mist: &str) -> String {
    let mist: f64 = mist.parse().unwrap_or(0.0);
    format!("{:.2} SUI", mist / MIST_PER_SUI)
}

/// Shorten an address to its 6-character prefix and 4-character suffix.
pub fn format_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
