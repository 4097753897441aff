use crate::config::Config;
use crate::db::models::Property;
use crate::services::ingest::load_properties;
use crate::services::metrics::{
    self, AnalyzedProperty, CityAggregate, MetricsError, PropertyTypeAggregate, SizeBucketAggregate,
    StateAggregate, TierCount, TopProperty,
};
use diesel::SqliteConnection;
use log::info;
use serde::Serialize;
use std::fs;

/// Headline numbers for the executive summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketKpis {
    pub total_properties: usize,
    pub mean_price: f64,
    pub mean_cap_rate: f64,
    pub positive_cash_flow_properties: usize,
    pub positive_cash_flow_share_pct: f64,
    pub top_state: String,
    pub top_state_score: f64,
    pub fastest_city: String,
    pub fastest_city_days_on_market: f64,
    pub best_monthly_cash_flow: i64,
}

/// Everything the external dashboard renderer consumes: the analyzed table
/// plus every group aggregate, as one serializable structure.
#[derive(Debug, Clone, Serialize)]
pub struct MarketReport {
    pub kpis: MarketKpis,
    pub properties: Vec<AnalyzedProperty>,
    pub states: Vec<StateAggregate>,
    pub cities: Vec<CityAggregate>,
    pub size_buckets: Vec<SizeBucketAggregate>,
    pub property_types: Vec<PropertyTypeAggregate>,
    pub cash_flow_tiers: Vec<TierCount>,
    pub top_properties: Vec<TopProperty>,
}

pub fn run(conn: &mut SqliteConnection, cfg: &Config) -> Result<(), String> {
    let properties = load_properties(conn)?;
    let report = build(&properties, cfg.top_properties.get())
        .map_err(|e| format!("market report failed: {}", e))?;

    info!(
        "Report: {} properties analyzed (mean price ${:.0}, mean cap rate {:.1}%)",
        report.kpis.total_properties, report.kpis.mean_price, report.kpis.mean_cap_rate
    );
    info!(
        "Report: {} of {} properties cash-flow positive ({:.1}%), best ${}/month",
        report.kpis.positive_cash_flow_properties,
        report.kpis.total_properties,
        report.kpis.positive_cash_flow_share_pct,
        report.kpis.best_monthly_cash_flow
    );
    info!(
        "Report: top state {} (score {:.1}), fastest market {} ({:.0} day(s) on market)",
        report.kpis.top_state,
        report.kpis.top_state_score,
        report.kpis.fastest_city,
        report.kpis.fastest_city_days_on_market
    );

    if let Some(path) = &cfg.report_path {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("serialize market report failed: {}", e))?;
        fs::write(path, json)
            .map_err(|e| format!("write market report to {} failed: {}", path.display(), e))?;
        info!("Report: written to {}", path.display());
    }

    Ok(())
}

/// Assemble the full market report from the stored listing table.
pub fn build(properties: &[Property], top_limit: usize) -> Result<MarketReport, MetricsError> {
    let analyzed = metrics::analyze(properties)?;
    let states = metrics::state_aggregates(&analyzed)?;
    let cities = metrics::city_aggregates(&analyzed)?;
    let size_buckets = metrics::size_bucket_aggregates(&analyzed)?;
    let property_types = metrics::property_type_aggregates(&analyzed)?;
    let cash_flow_tiers = metrics::cash_flow_tier_counts(&analyzed)?;
    let top_properties = metrics::top_properties(&analyzed, top_limit)?;

    let total = analyzed.len();
    let positive = analyzed.iter().filter(|a| a.monthly_cash_flow > 0).count();
    let top_state = states
        .iter()
        .max_by(|a, b| a.investment_score.total_cmp(&b.investment_score))
        .ok_or(MetricsError::EmptyTable)?;
    let fastest_city = cities
        .iter()
        .min_by(|a, b| a.mean_days_on_market.total_cmp(&b.mean_days_on_market))
        .ok_or(MetricsError::EmptyTable)?;
    let best_monthly_cash_flow = analyzed
        .iter()
        .map(|a| a.monthly_cash_flow)
        .max()
        .ok_or(MetricsError::EmptyTable)?;

    let kpis = MarketKpis {
        total_properties: total,
        mean_price: analyzed.iter().map(|a| a.record.price as f64).sum::<f64>() / total as f64,
        mean_cap_rate: analyzed.iter().map(|a| a.cap_rate).sum::<f64>() / total as f64,
        positive_cash_flow_properties: positive,
        positive_cash_flow_share_pct: positive as f64 / total as f64 * 100.0,
        top_state: top_state.state.clone(),
        top_state_score: top_state.investment_score,
        fastest_city: fastest_city.city.clone(),
        fastest_city_days_on_market: fastest_city.mean_days_on_market,
        best_monthly_cash_flow,
    };

    Ok(MarketReport {
        kpis,
        properties: analyzed,
        states,
        cities,
        size_buckets,
        property_types,
        cash_flow_tiers,
        top_properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generate::{CITIES, generate_listings};
    use chrono::{TimeZone, Utc};

    #[test]
    fn report_is_consistent_with_generated_table() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let listings = generate_listings(42, now, &CITIES).unwrap();
        let report = build(&listings, 5).unwrap();

        assert_eq!(report.kpis.total_properties, listings.len());
        assert_eq!(report.properties.len(), listings.len());
        assert_eq!(report.top_properties.len(), 5);
        // Two cities share FL, so states collapse to 11 groups.
        assert_eq!(report.states.len(), 11);
        assert_eq!(report.cities.len(), CITIES.len());
        assert!(report.states.iter().any(|s| s.state == report.kpis.top_state));
        assert!(report.cities.iter().any(|c| c.city == report.kpis.fastest_city));

        let tier_total: usize = report.cash_flow_tiers.iter().map(|t| t.properties).sum();
        assert_eq!(tier_total, listings.len());
        let bucket_total: usize = report.size_buckets.iter().map(|b| b.properties).sum();
        assert_eq!(bucket_total, listings.len());

        assert!(report.kpis.positive_cash_flow_share_pct >= 0.0);
        assert!(report.kpis.positive_cash_flow_share_pct <= 100.0);
    }

    #[test]
    fn empty_table_fails_the_report() {
        assert!(build(&[], 5).is_err());
    }
}
