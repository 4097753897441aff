//! Handwritten Diesel schema declaration for the listings store.
//!
//! The migration defines the actual table and indexes. This module only
//! provides the `diesel::table!` declaration so model structs can derive
//! Insertable/Queryable in a type-safe way without running
//! `diesel print-schema`.

diesel::table! {
    properties (property_id) {
        property_id -> BigInt,
        address -> Text,
        city -> Text,
        state -> Text,
        zip_code -> Text,
        price -> BigInt,
        bedrooms -> Integer,
        bathrooms -> Double,
        square_feet -> BigInt,
        property_type -> Text,
        estimated_rental_income -> BigInt,
        property_taxes -> BigInt,
        listing_date -> Date,
        days_on_market -> BigInt,
        price_per_sqft -> Double,
    }
}
