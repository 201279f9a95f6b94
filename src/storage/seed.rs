//! Demo catalogue used to populate a fresh store

use crate::core::category::{Category, FilterOption};
use crate::core::listing::{Listing, SellerKind};
use crate::storage::data::MarketData;

pub fn demo_categories() -> Vec<Category> {
    vec![
        Category::new("fordon", "Fordon")
            .with_create_fields(vec![
                FilterOption::select("Drivmedel", &["Bensin", "Diesel", "El", "Hybrid"]).required(),
                FilterOption::range("Miltal", "0", "30000").required(),
                FilterOption::chip("Växellåda", &["Manuell", "Automat"]),
            ])
            .with_search_filters(vec![
                FilterOption::select("Drivmedel", &["Bensin", "Diesel", "El", "Hybrid"]),
                FilterOption::range("Miltal", "0", "30000"),
                FilterOption::chip("Växellåda", &["Manuell", "Automat"]),
            ]),
        Category::new("cyklar", "Cyklar")
            .with_parent("fordon")
            .with_legacy_filters(vec![FilterOption::chip("Typ", &["Elcykel", "Racer", "MTB"])]),
        Category::new("hem", "Hem & inredning")
            .with_legacy_filters(vec![FilterOption::select("Skick", &["Ny", "Som ny", "Begagnad"])]),
    ]
}

pub fn demo_listings() -> Vec<Listing> {
    let mut xc60 = Listing::new("volvo-xc60-t8", "Volvo XC60 T8 R-Design")
        .with_category("fordon")
        .with_county("Stockholm")
        .with_attribute("Drivmedel", "Hybrid")
        .with_attribute("Miltal", "8200")
        .with_attribute("Växellåda", "Automat");
    xc60.price = "429 000 kr".to_string();
    xc60.price_value = Some(429_000.0);
    xc60.meta = Some("2021 · 8 200 mil · Automat".to_string());
    xc60.seller = SellerKind::Foretag;
    xc60.seller_name = Some("Bilhallen Solna".to_string());

    let mut elcykel = Listing::new("elcykel-pendling-2023", "Elcykel pendling 2023")
        .with_category("cyklar")
        .with_county("Skåne")
        .with_attribute("Typ", "Elcykel");
    elcykel.price = "12 500 kr".to_string();
    elcykel.price_value = Some(12_500.0);
    elcykel.meta = Some("Malmö · Nyservad".to_string());

    let mut soffa = Listing::new("soffa-sammet", "Soffa i grön sammet")
        .with_category("hem")
        .with_county("Västra Götaland")
        .with_attribute("Skick", "Som ny");
    soffa.price = "3 200 kr".to_string();
    soffa.price_value = Some(3_200.0);
    soffa.description = Some("Tresits, rökfritt hem.".to_string());

    vec![xc60, elcykel, soffa]
}

pub fn demo_data() -> MarketData {
    MarketData::new(demo_listings(), demo_categories())
}
