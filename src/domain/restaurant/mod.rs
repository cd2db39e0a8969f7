//! Restaurant domain - entities and the authoritative store contract

mod entity;
mod repository;

pub use entity::{time_of_day, Menu, MenuItem, Restaurant, RestaurantId};
pub use repository::in_memory::{InMemoryRestaurantRepository, RestaurantFixtures};
pub use repository::RestaurantRepository;

#[cfg(test)]
pub use repository::mock::{MockRestaurantRepository, Query};
