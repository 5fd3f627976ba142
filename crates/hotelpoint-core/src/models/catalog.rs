//! Hotel and room catalog references
//!
//! Catalog entities are managed elsewhere; the booking core only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Hotel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: None,
            description: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(hotel_id: Uuid, name: impl Into<String>, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            hotel_id,
            name: name.into(),
            capacity,
            created_at: Utc::now(),
        }
    }

    pub fn belongs_to(&self, hotel_id: Uuid) -> bool {
        self.hotel_id == hotel_id
    }
}
