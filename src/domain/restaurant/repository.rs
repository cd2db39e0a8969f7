//! Restaurant repository trait

use async_trait::async_trait;

use super::Restaurant;
use crate::domain::DomainError;

/// Authoritative restaurant store.
///
/// Every query returns restaurants in the store's natural iteration order and
/// may be called concurrently with the others.
#[async_trait]
pub trait RestaurantRepository: Send + Sync + std::fmt::Debug {
    /// All restaurants
    async fn find_all(&self) -> Result<Vec<Restaurant>, DomainError>;

    /// Restaurants whose name equals the query, `None` when there are none
    async fn find_by_name_exact(&self, name: &str)
        -> Result<Option<Vec<Restaurant>>, DomainError>;

    /// Restaurants whose name contains the query
    async fn find_by_name_partial(&self, name: &str) -> Result<Vec<Restaurant>, DomainError>;

    /// Restaurants tagged with the given cuisine attribute
    async fn find_by_attributes(&self, attribute: &str) -> Result<Vec<Restaurant>, DomainError>;

    /// Restaurants serving an item whose name contains the query
    async fn find_by_item_name(&self, item_name: &str) -> Result<Vec<Restaurant>, DomainError>;

    /// Restaurants serving an item tagged with the given attribute
    async fn find_by_item_attributes(
        &self,
        attribute: &str,
    ) -> Result<Vec<Restaurant>, DomainError>;

    /// Connectivity check for readiness
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// In-memory implementation of RestaurantRepository
pub mod in_memory {
    use super::*;
    use std::collections::HashMap;

    use serde::Deserialize;

    use crate::domain::restaurant::{Menu, MenuItem, RestaurantId};

    /// Seed file layout: `{"restaurants": [...], "menus": [...]}`
    #[derive(Debug, Default, Deserialize)]
    pub struct RestaurantFixtures {
        #[serde(default)]
        pub restaurants: Vec<Restaurant>,
        #[serde(default)]
        pub menus: Vec<Menu>,
    }

    /// In-memory implementation of RestaurantRepository for tests and development
    ///
    /// Insertion order is the natural iteration order.
    #[derive(Debug, Default)]
    pub struct InMemoryRestaurantRepository {
        restaurants: Vec<Restaurant>,
        menus: HashMap<RestaurantId, Vec<MenuItem>>,
    }

    impl InMemoryRestaurantRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_restaurant(mut self, restaurant: Restaurant) -> Self {
            self.upsert(restaurant);
            self
        }

        pub fn with_restaurants(mut self, restaurants: Vec<Restaurant>) -> Self {
            for restaurant in restaurants {
                self.upsert(restaurant);
            }
            self
        }

        pub fn with_menu(mut self, menu: Menu) -> Self {
            self.menus.insert(menu.restaurant_id, menu.items);
            self
        }

        pub fn with_fixtures(self, fixtures: RestaurantFixtures) -> Self {
            let repository = self.with_restaurants(fixtures.restaurants);
            fixtures
                .menus
                .into_iter()
                .fold(repository, |repository, menu| repository.with_menu(menu))
        }

        /// Loads restaurants and menus from a JSON document
        pub fn from_json(json: &str) -> Result<Self, DomainError> {
            let fixtures: RestaurantFixtures = serde_json::from_str(json).map_err(|e| {
                DomainError::configuration(format!("Invalid restaurant fixtures: {}", e))
            })?;
            Ok(Self::new().with_fixtures(fixtures))
        }

        pub fn len(&self) -> usize {
            self.restaurants.len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        // Replaces in place so the original position is kept
        fn upsert(&mut self, restaurant: Restaurant) {
            match self.restaurants.iter().position(|r| r.id() == restaurant.id()) {
                Some(index) => self.restaurants[index] = restaurant,
                None => self.restaurants.push(restaurant),
            }
        }

        fn filter<F>(&self, predicate: F) -> Vec<Restaurant>
        where
            F: Fn(&Restaurant) -> bool,
        {
            self.restaurants
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect()
        }

        fn filter_by_menu<F>(&self, predicate: F) -> Vec<Restaurant>
        where
            F: Fn(&MenuItem) -> bool,
        {
            self.filter(|restaurant| {
                self.menus
                    .get(restaurant.id())
                    .is_some_and(|items| items.iter().any(&predicate))
            })
        }
    }

    #[async_trait]
    impl RestaurantRepository for InMemoryRestaurantRepository {
        async fn find_all(&self) -> Result<Vec<Restaurant>, DomainError> {
            Ok(self.restaurants.clone())
        }

        async fn find_by_name_exact(
            &self,
            name: &str,
        ) -> Result<Option<Vec<Restaurant>>, DomainError> {
            let matches = self.filter(|r| r.matches_name_exactly(name));
            Ok(if matches.is_empty() { None } else { Some(matches) })
        }

        async fn find_by_name_partial(&self, name: &str) -> Result<Vec<Restaurant>, DomainError> {
            Ok(self.filter(|r| r.name_contains(name)))
        }

        async fn find_by_attributes(
            &self,
            attribute: &str,
        ) -> Result<Vec<Restaurant>, DomainError> {
            Ok(self.filter(|r| r.has_attribute(attribute)))
        }

        async fn find_by_item_name(
            &self,
            item_name: &str,
        ) -> Result<Vec<Restaurant>, DomainError> {
            Ok(self.filter_by_menu(|item| item.name_contains(item_name)))
        }

        async fn find_by_item_attributes(
            &self,
            attribute: &str,
        ) -> Result<Vec<Restaurant>, DomainError> {
            Ok(self.filter_by_menu(|item| item.has_attribute(attribute)))
        }
    }
}

#[cfg(test)]
pub mod mock {
    use super::in_memory::InMemoryRestaurantRepository;
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::domain::restaurant::Menu;

    /// Which repository query a mock setting applies to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Query {
        All,
        NameExact,
        NamePartial,
        Attributes,
        ItemName,
        ItemAttributes,
    }

    /// Mock implementation of RestaurantRepository for testing
    #[derive(Debug, Default)]
    pub struct MockRestaurantRepository {
        inner: InMemoryRestaurantRepository,
        failing: Mutex<Vec<Query>>,
        delays: Mutex<Vec<(Query, Duration)>>,
        calls: AtomicUsize,
        answered: Mutex<Vec<Query>>,
    }

    impl MockRestaurantRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_restaurants(mut self, restaurants: Vec<Restaurant>) -> Self {
            self.inner = self.inner.with_restaurants(restaurants);
            self
        }

        pub fn with_menu(mut self, menu: Menu) -> Self {
            self.inner = self.inner.with_menu(menu);
            self
        }

        /// Makes the given query fail with a storage error
        pub fn failing_on(self, query: Query) -> Self {
            self.failing.lock().unwrap().push(query);
            self
        }

        /// Makes the given query sleep before answering
        pub fn with_delay(self, query: Query, delay: Duration) -> Self {
            self.delays.lock().unwrap().push((query, delay));
            self
        }

        /// Total number of queries served (including failed ones)
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Whether the given query ever got past its delay
        pub fn answered(&self, query: Query) -> bool {
            self.answered.lock().unwrap().contains(&query)
        }

        async fn enter(&self, query: Query) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let delay = self
                .delays
                .lock()
                .unwrap()
                .iter()
                .find(|(q, _)| *q == query)
                .map(|(_, d)| *d);

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.answered.lock().unwrap().push(query);

            if self.failing.lock().unwrap().contains(&query) {
                return Err(DomainError::storage(format!("{:?} query failed", query)));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RestaurantRepository for MockRestaurantRepository {
        async fn find_all(&self) -> Result<Vec<Restaurant>, DomainError> {
            self.enter(Query::All).await?;
            self.inner.find_all().await
        }

        async fn find_by_name_exact(
            &self,
            name: &str,
        ) -> Result<Option<Vec<Restaurant>>, DomainError> {
            self.enter(Query::NameExact).await?;
            self.inner.find_by_name_exact(name).await
        }

        async fn find_by_name_partial(&self, name: &str) -> Result<Vec<Restaurant>, DomainError> {
            self.enter(Query::NamePartial).await?;
            self.inner.find_by_name_partial(name).await
        }

        async fn find_by_attributes(
            &self,
            attribute: &str,
        ) -> Result<Vec<Restaurant>, DomainError> {
            self.enter(Query::Attributes).await?;
            self.inner.find_by_attributes(attribute).await
        }

        async fn find_by_item_name(
            &self,
            item_name: &str,
        ) -> Result<Vec<Restaurant>, DomainError> {
            self.enter(Query::ItemName).await?;
            self.inner.find_by_item_name(item_name).await
        }

        async fn find_by_item_attributes(
            &self,
            attribute: &str,
        ) -> Result<Vec<Restaurant>, DomainError> {
            self.enter(Query::ItemAttributes).await?;
            self.inner.find_by_item_attributes(attribute).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::in_memory::InMemoryRestaurantRepository;
    use super::*;
    use crate::domain::restaurant::{time_of_day, Menu, MenuItem, RestaurantId};

    fn restaurant(id: &str, name: &str, attributes: &[&str]) -> Restaurant {
        Restaurant::new(
            RestaurantId::new(id).unwrap(),
            name,
            12.97,
            77.59,
            time_of_day::parse("08:00").unwrap(),
            time_of_day::parse("22:00").unwrap(),
        )
        .with_attributes(attributes.iter().copied())
    }

    fn repository() -> InMemoryRestaurantRepository {
        InMemoryRestaurantRepository::new()
            .with_restaurants(vec![
                restaurant("1", "Udupi Grand", &["South Indian"]),
                restaurant("2", "Udupi", &["South Indian", "Vegetarian"]),
                restaurant("3", "Punjabi Dhaba", &["North Indian"]),
            ])
            .with_menu(Menu::new(
                RestaurantId::new("3").unwrap(),
                vec![MenuItem::new("i1", "Paneer Tikka", 220.0).with_attributes(["Spicy"])],
            ))
    }

    fn ids(restaurants: &[Restaurant]) -> Vec<&str> {
        restaurants.iter().map(|r| r.id().as_str()).collect()
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let all = repository().find_all().await.unwrap();
        assert_eq!(ids(&all), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_upsert_keeps_position() {
        let repo = repository().with_restaurant(restaurant("1", "Udupi Grand Cafe", &[]));
        let all = repo.find_all().await.unwrap();

        assert_eq!(ids(&all), vec!["1", "2", "3"]);
        assert_eq!(all[0].name(), "Udupi Grand Cafe");
    }

    #[tokio::test]
    async fn test_find_by_name_exact() {
        let repo = repository();

        let found = repo.find_by_name_exact("udupi").await.unwrap().unwrap();
        assert_eq!(ids(&found), vec!["2"]);
        assert!(repo.find_by_name_exact("Udup").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_name_partial() {
        let found = repository().find_by_name_partial("udupi").await.unwrap();
        assert_eq!(ids(&found), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_find_by_attributes() {
        let found = repository().find_by_attributes("vegetarian").await.unwrap();
        assert_eq!(ids(&found), vec!["2"]);
    }

    #[tokio::test]
    async fn test_find_by_items() {
        let repo = repository();

        assert_eq!(ids(&repo.find_by_item_name("paneer").await.unwrap()), vec!["3"]);
        assert_eq!(ids(&repo.find_by_item_attributes("SPICY").await.unwrap()), vec!["3"]);
        assert!(repo.find_by_item_name("dosa").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_json() {
        let json = r#"{
            "restaurants": [{
                "restaurantId": "11",
                "name": "Biryani Blues",
                "latitude": 28.49,
                "longitude": 77.53,
                "opensAt": "11:00",
                "closesAt": "23:00:00",
                "attributes": ["Hyderabadi"]
            }],
            "menus": [{"restaurantId": "11", "items": [{"itemId": "b1", "name": "Biryani"}]}]
        }"#;

        let repo = InMemoryRestaurantRepository::from_json(json).unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(ids(&repo.find_by_item_name("biryani").await.unwrap()), vec!["11"]);
    }

    #[test]
    fn test_from_json_invalid() {
        let result = InMemoryRestaurantRepository::from_json("{\"restaurants\": 3}");
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
