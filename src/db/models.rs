//! Diesel model structs for the generated listings table.
//!
//! The table is rewritten wholesale on every run: the generator assigns
//! `property_id` itself, so a single struct serves both Queryable and
//! Insertable roles (no database-assigned columns exist).

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema;

// Canonical `properties.property_type` values.
pub mod property_types {
    pub const SINGLE_FAMILY: &str = "Single Family";
    pub const TOWNHOUSE: &str = "Townhouse";
    pub const CONDO: &str = "Condo";
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::properties)]
#[diesel(primary_key(property_id))]
pub struct Property {
    pub property_id: i64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: i64,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_feet: i64,
    pub property_type: String,
    pub estimated_rental_income: i64,
    pub property_taxes: i64,
    pub listing_date: NaiveDate,
    pub days_on_market: i64,
    pub price_per_sqft: f64,
}
