use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Optional paid add-on for a service. Soft-deleted via `active` so that
/// historical booking lines keep resolving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraItem {
    pub id: String,
    pub service_id: String,
    pub name: String,
    pub price: Decimal,
    pub max_quantity: i32,
    pub active: bool,
}
