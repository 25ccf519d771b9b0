use crate::dashboard_resource;
use serde::{Deserialize, Serialize};

dashboard_resource! {
    /// A bookable room.
    pub struct Room("rooms", unique = name) {
        name: String,
        category_id: String,
        capacity: u32,
        description: String,
        #[serde(default)]
        amenities: Vec<String>,
        #[serde(default)]
        images: Vec<String>,
        is_active: bool,
    }
}

dashboard_resource! {
    /// Grouping of rooms (suite, deluxe, dormitory ...).
    pub struct RoomCategory("room-categories", unique = name) {
        name: String,
        description: String,
    }
}

dashboard_resource! {
    /// Nightly price for a room over a date range.
    pub struct RoomRate("room-rates", unique = name) {
        name: String,
        room_id: String,
        /// Price in minor currency units.
        amount: i64,
        currency: String,
        valid_from: chrono::NaiveDate,
        valid_to: chrono::NaiveDate,
    }
}

dashboard_resource! {
    /// A dish or drink offered by the property's kitchen.
    pub struct FoodMenu("food-menus", unique = name) {
        name: String,
        description: String,
        /// Price in minor currency units.
        price: i64,
        #[serde(default)]
        tags: Vec<String>,
        rating: Rating,
    }
}

dashboard_resource! {
    pub struct BlogCategory("blog-categories", unique = name) {
        name: String,
        slug: String,
    }
}

dashboard_resource! {
    pub struct Blog("blogs", unique = slug) {
        title: String,
        slug: String,
        category_id: String,
        /// Rich-text body as produced by the editor widget.
        body: String,
        #[serde(default)]
        tags: Vec<String>,
        published: bool,
    }
}

dashboard_resource! {
    /// A nearby place promoted to guests, pinned on the map picker.
    pub struct Destination("destinations", unique = name) {
        name: String,
        description: String,
        location: GeoPoint,
    }
}

dashboard_resource! {
    /// A fee or tax applied on top of room rates.
    pub struct FeeTax("fees-taxes", unique = name) {
        name: String,
        kind: ChargeKind,
        /// Basis points for percentages, minor currency units for flat fees.
        value: i64,
        is_active: bool,
    }
}

dashboard_resource! {
    /// An uploaded file in the file manager.
    pub struct FileEntry("files", unique = path) {
        name: String,
        path: String,
        mime_type: String,
        size_bytes: u64,
    }
}

/// Star rating shown by the rating widget, clamped to 0..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Self {
        Self(stars.min(Self::MAX))
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > Self::MAX {
            return Err(format!("rating must be between 0 and {}, got {}", Self::MAX, value));
        }
        Ok(Self(value))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Latitude/longitude pair chosen with the map picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    Percentage,
    Flat,
}
