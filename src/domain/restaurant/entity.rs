//! Restaurant entity and related types

use std::hash::{Hash, Hasher};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Stable unique restaurant identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RestaurantId(String);

impl RestaurantId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(DomainError::validation("Restaurant ID cannot be empty"));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RestaurantId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RestaurantId> for String {
    fn from(id: RestaurantId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time-of-day wire format: `HH:MM` or `HH:MM:SS`
pub mod time_of_day {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::domain::DomainError;

    pub fn parse(value: &str) -> Result<NaiveTime, DomainError> {
        let value = value.trim();

        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .map_err(|e| DomainError::validation(format!("Invalid time '{}': {}", value, e)))
    }

    pub fn format(time: &NaiveTime) -> String {
        if time.second() == 0 && time.nanosecond() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        }
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A restaurant as returned to callers.
///
/// Two restaurants are equal when their IDs are equal; the remaining fields
/// are ignored by `PartialEq` and `Hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    restaurant_id: RestaurantId,
    name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    image_url: String,
    latitude: f64,
    longitude: f64,
    #[serde(with = "time_of_day")]
    opens_at: NaiveTime,
    #[serde(with = "time_of_day")]
    closes_at: NaiveTime,
    #[serde(default)]
    attributes: Vec<String>,
}

impl Restaurant {
    pub fn new(
        restaurant_id: RestaurantId,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        opens_at: NaiveTime,
        closes_at: NaiveTime,
    ) -> Self {
        Self {
            restaurant_id,
            name: name.into(),
            city: String::new(),
            image_url: String::new(),
            latitude,
            longitude,
            opens_at,
            closes_at,
            attributes: Vec::new(),
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Sets the cuisine tags; duplicates (case-insensitive) are dropped
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.clear();

        for attribute in attributes {
            let attribute = attribute.into();

            if !self.has_attribute(&attribute) {
                self.attributes.push(attribute);
            }
        }
        self
    }

    pub fn id(&self) -> &RestaurantId {
        &self.restaurant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn opens_at(&self) -> NaiveTime {
        self.opens_at
    }

    pub fn closes_at(&self) -> NaiveTime {
        self.closes_at
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Case-insensitive full-name equality
    pub fn matches_name_exactly(&self, query: &str) -> bool {
        self.name.to_lowercase() == query.trim().to_lowercase()
    }

    /// Case-insensitive substring match on the name
    pub fn name_contains(&self, query: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&query.trim().to_lowercase())
    }

    /// Case-insensitive membership in the cuisine tags
    pub fn has_attribute(&self, attribute: &str) -> bool {
        let wanted = attribute.trim().to_lowercase();
        self.attributes.iter().any(|a| a.to_lowercase() == wanted)
    }
}

impl PartialEq for Restaurant {
    fn eq(&self, other: &Self) -> bool {
        self.restaurant_id == other.restaurant_id
    }
}

impl Eq for Restaurant {}

impl Hash for Restaurant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.restaurant_id.hash(state);
    }
}

/// A dish on a restaurant's menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl MenuItem {
    pub fn new(item_id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            price,
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive substring match on the item name
    pub fn name_contains(&self, query: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&query.trim().to_lowercase())
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        let wanted = attribute.trim().to_lowercase();
        self.attributes.iter().any(|a| a.to_lowercase() == wanted)
    }
}

/// All items served by one restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub restaurant_id: RestaurantId,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(restaurant_id: RestaurantId, items: Vec<MenuItem>) -> Self {
        Self {
            restaurant_id,
            items,
        }
    }
}
