use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub service_id: String,
    pub number: String,
    pub floor: i32,
    pub status: RoomStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Occupied,
    Cleaning,
    Maintenance,
    Blocked,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "AVAILABLE",
            RoomStatus::Occupied => "OCCUPIED",
            RoomStatus::Cleaning => "CLEANING",
            RoomStatus::Maintenance => "MAINTENANCE",
            RoomStatus::Blocked => "BLOCKED",
        }
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "AVAILABLE" => Ok(RoomStatus::Available),
            "OCCUPIED" => Ok(RoomStatus::Occupied),
            "CLEANING" => Ok(RoomStatus::Cleaning),
            "MAINTENANCE" => Ok(RoomStatus::Maintenance),
            "BLOCKED" => Ok(RoomStatus::Blocked),
            other => Err(anyhow::anyhow!("unknown room status: {other}")),
        }
    }
}
