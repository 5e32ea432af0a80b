//! Gift model and the request bodies that touch it.

use serde::{Deserialize, Deserializer, Serialize};

/// Priority given to a freshly requested gift: the lowest regular rank.
pub const DEFAULT_PRIORITY: i64 = 1;

/// A gift on one child's wishlist.
///
/// Lists are always presented `priority desc, createdAt desc`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: String,
    pub child_id: String,
    pub image_url: String,
    pub priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub is_bought: bool,
    pub created_at: String,
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

/// Gift as shown in the parents area, with the owning child's name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftWithChild {
    #[serde(flatten)]
    pub gift: Gift,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
}

/// Request body for adding a gift to a child's wishlist.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGiftRequest {
    pub image_url: String,
}

/// Request body for the parent annotation workflow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGiftRequest {
    /// `None` when absent, `Some(None)` when sent as null
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub assigned_to: Option<Option<String>>,
    #[serde(default)]
    pub is_bought: Option<bool>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Request body for taking over an offer from a price comparison.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOfferRequest {
    pub price: f64,
    pub store: String,
}

/// A drag-and-drop move inside one child's wishlist.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub from_index: usize,
    pub to_index: usize,
}

/// Mark a field as present, keeping an explicit null distinct from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
