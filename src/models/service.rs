use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub establishment_id: String,
    pub name: String,
    pub base_price: Decimal,
    pub duration_minutes: i32,
    pub capacity: i32,
    pub kind: ServiceKind,
    pub active: bool,
}

/// Determines the reservation strategy: `Service` books quantity against
/// slot capacity, `Hotel` books a room for a date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceKind {
    #[serde(rename = "SERVICE")]
    Service,
    #[serde(rename = "HOTEL")]
    Hotel,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Service => "SERVICE",
            ServiceKind::Hotel => "HOTEL",
        }
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "SERVICE" => Ok(ServiceKind::Service),
            "HOTEL" => Ok(ServiceKind::Hotel),
            other => Err(anyhow::anyhow!("unknown service kind: {other}")),
        }
    }
}
