//! Macro-generated contract suite for `ListingRepository` implementations
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use selj::storage::InMemoryRepository;
//!
//! repository_tests!(async { (InMemoryRepository::new(), ()) });
//! ```
//!
//! The factory is an async block returning `(repository, guard)`. The guard
//! is kept alive for the duration of the test (e.g. a temporary directory).
//! The repository must start empty.
//!
//! # Generated Tests
//!
//! - listings: create/list, newest first, duplicate id replaces, status
//!   update, unknown id, attribute round trip, concurrent creates
//! - categories: create, upsert by value, update, update unknown, legacy
//!   slot normalization, delete with children, delete unknown

/// Generate the `ListingRepository` conformance suite
#[macro_export]
macro_rules! repository_tests {
    ($factory:expr) => {
        mod repository_contract {
            use super::*;
            use selj::core::category::{Category, FilterOption};
            use selj::core::listing::ListingStatus;
            use selj::core::service::ListingRepository;
            use std::sync::Arc;

            fn sorted_values(categories: &[Category]) -> Vec<String> {
                let mut values: Vec<String> = categories.iter().map(|c| c.value.clone()).collect();
                values.sort();
                values
            }

            #[tokio::test]
            async fn test_starts_empty() {
                let (repo, _guard) = $factory.await;
                assert!(repo.get_listings().await.unwrap().is_empty());
                assert!(repo.get_categories().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_create_and_list_newest_first() {
                let (repo, _guard) = $factory.await;
                repo.create_listing(storage_harness::listing("old", "Äldre", 1)).await.unwrap();
                repo.create_listing(storage_harness::listing("new", "Nyare", 2)).await.unwrap();

                let ids: Vec<String> = repo
                    .get_listings()
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|l| l.id)
                    .collect();
                assert_eq!(ids, vec!["new".to_string(), "old".to_string()]);
            }

            #[tokio::test]
            async fn test_duplicate_id_replaces() {
                let (repo, _guard) = $factory.await;
                repo.create_listing(storage_harness::listing("a", "Första", 1)).await.unwrap();
                repo.create_listing(storage_harness::listing("a", "Andra", 2)).await.unwrap();

                let listings = repo.get_listings().await.unwrap();
                assert_eq!(listings.len(), 1);
                assert_eq!(listings[0].title, "Andra");
            }

            #[tokio::test]
            async fn test_attributes_round_trip() {
                let (repo, _guard) = $factory.await;
                let created = storage_harness::listing("bil", "Bil", 1)
                    .with_category("fordon")
                    .with_county("Stockholm")
                    .with_attribute("Drivmedel", "El")
                    .with_attribute("Miltal-min", "100");
                repo.create_listing(created.clone()).await.unwrap();

                let stored = repo.get_listings().await.unwrap().remove(0);
                assert_eq!(stored.category.as_deref(), Some("fordon"));
                assert_eq!(stored.county.as_deref(), Some("Stockholm"));
                assert_eq!(stored.attributes, created.attributes);
                assert_eq!(stored.status, ListingStatus::Active);
            }

            #[tokio::test]
            async fn test_update_status() {
                let (repo, _guard) = $factory.await;
                repo.create_listing(storage_harness::listing("a", "A", 1)).await.unwrap();
                repo.update_listing_status("a", ListingStatus::Rejected).await.unwrap();

                let listings = repo.get_listings().await.unwrap();
                assert_eq!(listings[0].status, ListingStatus::Rejected);
            }

            #[tokio::test]
            async fn test_update_status_unknown_id_is_ok() {
                let (repo, _guard) = $factory.await;
                repo.update_listing_status("saknas", ListingStatus::Expired).await.unwrap();
                assert!(repo.get_listings().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_concurrent_creates() {
                let (repo, _guard) = $factory.await;
                let repo = Arc::new(repo);
                let mut handles = Vec::new();
                for i in 0..8 {
                    let repo = repo.clone();
                    handles.push(tokio::spawn(async move {
                        repo.create_listing(storage_harness::listing(&format!("l{}", i), "L", i))
                            .await
                            .unwrap();
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }
                assert_eq!(repo.get_listings().await.unwrap().len(), 8);
            }

            #[tokio::test]
            async fn test_create_and_upsert_category() {
                let (repo, _guard) = $factory.await;
                repo.create_category(Category::new("fordon", "Fordon")).await.unwrap();
                repo.create_category(Category::new("hem", "Hem")).await.unwrap();
                repo.create_category(Category::new("fordon", "Fordon & båtar")).await.unwrap();

                let categories = repo.get_categories().await.unwrap();
                assert_eq!(sorted_values(&categories), vec!["fordon", "hem"]);
                let fordon = categories.iter().find(|c| c.value == "fordon").unwrap();
                assert_eq!(fordon.label, "Fordon & båtar");
            }

            #[tokio::test]
            async fn test_legacy_filters_fill_both_slots() {
                let (repo, _guard) = $factory.await;
                let legacy = vec![FilterOption::chip("Skick", &["Ny", "Begagnad"])];
                repo.create_category(Category::new("hem", "Hem").with_legacy_filters(legacy.clone()))
                    .await
                    .unwrap();

                let stored = repo.get_categories().await.unwrap().remove(0);
                assert_eq!(stored.create_fields, Some(legacy.clone()));
                assert_eq!(stored.search_filters, Some(legacy));
            }

            #[tokio::test]
            async fn test_update_category() {
                let (repo, _guard) = $factory.await;
                repo.create_category(Category::new("fordon", "Fordon")).await.unwrap();

                let updated = repo
                    .update_category(
                        "fordon",
                        Category::new("fordon", "Motorfordon").with_search_filters(vec![
                            FilterOption::range("Miltal", "0", "30000"),
                        ]),
                    )
                    .await
                    .unwrap()
                    .expect("category exists");
                assert_eq!(updated.label, "Motorfordon");

                let stored = repo.get_categories().await.unwrap().remove(0);
                assert_eq!(stored.label, "Motorfordon");
                assert_eq!(stored.search_filters.map(|f| f.len()), Some(1));
            }

            #[tokio::test]
            async fn test_update_unknown_category() {
                let (repo, _guard) = $factory.await;
                let outcome = repo
                    .update_category("saknas", Category::new("saknas", "Saknas"))
                    .await
                    .unwrap();
                assert!(outcome.is_none());
                assert!(repo.get_categories().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_delete_category_removes_children() {
                let (repo, _guard) = $factory.await;
                repo.create_category(Category::new("fordon", "Fordon")).await.unwrap();
                repo.create_category(Category::new("bilar", "Bilar").with_parent("fordon"))
                    .await
                    .unwrap();
                repo.create_category(Category::new("hem", "Hem")).await.unwrap();

                assert!(repo.delete_category("fordon").await.unwrap());
                let categories = repo.get_categories().await.unwrap();
                assert_eq!(sorted_values(&categories), vec!["hem"]);
            }

            #[tokio::test]
            async fn test_delete_unknown_category() {
                let (repo, _guard) = $factory.await;
                repo.create_category(Category::new("hem", "Hem")).await.unwrap();
                assert!(!repo.delete_category("fordon").await.unwrap());
                assert_eq!(repo.get_categories().await.unwrap().len(), 1);
            }
        }
    };
}
