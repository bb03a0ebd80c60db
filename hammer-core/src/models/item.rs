use serde::{Deserialize, Serialize};

/// Immutable copy of the listed item, taken when the seller finalizes the
/// listing.
///
/// The catalog collaborator owns the product record itself; the auction keeps
/// this snapshot so that later catalog edits cannot change what was bid on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Display name of the item
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Reference to the item's image in the media store
    pub image_ref: String,
    /// Material the item is made of
    pub material: String,
    /// Weight in grams
    pub weight_grams: u32,
    /// Color of the item
    pub color: String,
}
