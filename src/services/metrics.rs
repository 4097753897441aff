use crate::db::models::Property;
use crate::utils::round_to;
use core::fmt;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

// Cash-flow model assumptions: 20% down at 4.5% interest, one tenth of the
// rent held back for maintenance.
const MORTGAGE_LTV: f64 = 0.80;
const MORTGAGE_ANNUAL_RATE: f64 = 0.045;
const MAINTENANCE_RESERVE_RATE: f64 = 0.10;

// Investment score blend: yield 50%, cash flow 30%, affordability 20%.
const SCORE_CAP_RATE_WEIGHT: f64 = 50.0;
const SCORE_CASH_FLOW_WEIGHT: f64 = 30.0;
const SCORE_AFFORDABILITY_WEIGHT: f64 = 20.0;

/// Errors from metric computation over degenerate inputs.
#[derive(Debug)]
pub enum MetricsError {
    /// The listing table is empty; every aggregate is undefined.
    EmptyTable,
    /// A listing carries a non-positive price, so yield ratios are undefined.
    NonPositivePrice(i64),
    /// A normalization denominator came out zero.
    DegenerateNormalization(&'static str),
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::EmptyTable => write!(f, "no properties to analyze"),
            MetricsError::NonPositivePrice(id) => {
                write!(f, "property {} has a non-positive price", id)
            }
            MetricsError::DegenerateNormalization(what) => {
                write!(f, "cannot normalize {}: denominator is zero", what)
            }
        }
    }
}

impl Error for MetricsError {}

/// A listing plus its derived per-property investment columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedProperty {
    #[serde(flatten)]
    pub record: Property,
    pub annual_rental: i64,
    pub cap_rate: f64,
    pub monthly_cash_flow: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateAggregate {
    pub state: String,
    pub mean_cap_rate: f64,
    pub mean_cash_flow: f64,
    pub mean_price: f64,
    pub investment_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAggregate {
    pub city: String,
    pub mean_price_per_sqft: f64,
    pub mean_days_on_market: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeBucketAggregate {
    pub bucket: &'static str,
    pub properties: usize,
    pub mean_cap_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyTypeAggregate {
    pub property_type: String,
    pub mean_cap_rate: f64,
    pub mean_cash_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCount {
    pub tier: &'static str,
    pub properties: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProperty {
    pub property_id: i64,
    pub city: String,
    pub state: String,
    pub price: i64,
    pub cap_rate: f64,
    pub monthly_cash_flow: i64,
    pub simple_score: f64,
}

/// Square-footage buckets, lower bound inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBucket {
    Under1000,
    From1000To1500,
    From1500To2000,
    Over2000,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 4] = [
        SizeBucket::Under1000,
        SizeBucket::From1000To1500,
        SizeBucket::From1500To2000,
        SizeBucket::Over2000,
    ];

    pub fn for_square_feet(square_feet: i64) -> Self {
        if square_feet < 1_000 {
            SizeBucket::Under1000
        } else if square_feet < 1_500 {
            SizeBucket::From1000To1500
        } else if square_feet < 2_000 {
            SizeBucket::From1500To2000
        } else {
            SizeBucket::Over2000
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SizeBucket::Under1000 => "<1000",
            SizeBucket::From1000To1500 => "1000-1500",
            SizeBucket::From1500To2000 => "1500-2000",
            SizeBucket::Over2000 => ">2000",
        }
    }
}

/// Monthly cash-flow quality tiers, upper bound inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashFlowTier {
    Negative,
    Low,
    Medium,
    High,
}

impl CashFlowTier {
    pub const ALL: [CashFlowTier; 4] = [
        CashFlowTier::Negative,
        CashFlowTier::Low,
        CashFlowTier::Medium,
        CashFlowTier::High,
    ];

    pub fn for_cash_flow(monthly_cash_flow: i64) -> Self {
        if monthly_cash_flow <= 0 {
            CashFlowTier::Negative
        } else if monthly_cash_flow <= 200 {
            CashFlowTier::Low
        } else if monthly_cash_flow <= 500 {
            CashFlowTier::Medium
        } else {
            CashFlowTier::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CashFlowTier::Negative => "Negative",
            CashFlowTier::Low => "Low (0-$200)",
            CashFlowTier::Medium => "Medium ($200-$500)",
            CashFlowTier::High => "High ($500+)",
        }
    }
}

/// Derive the per-property investment columns for the whole table.
pub fn analyze(properties: &[Property]) -> Result<Vec<AnalyzedProperty>, MetricsError> {
    if properties.is_empty() {
        return Err(MetricsError::EmptyTable);
    }
    properties.iter().map(analyze_one).collect()
}

fn analyze_one(property: &Property) -> Result<AnalyzedProperty, MetricsError> {
    if property.price <= 0 {
        return Err(MetricsError::NonPositivePrice(property.property_id));
    }

    let annual_rental = property.estimated_rental_income * 12;
    let cap_rate = round_to(annual_rental as f64 / property.price as f64 * 100.0, 2);

    let mortgage_payment = property.price as f64 * MORTGAGE_LTV * MORTGAGE_ANNUAL_RATE / 12.0;
    let monthly_taxes = property.property_taxes as f64 / 12.0;
    let maintenance_reserve = property.estimated_rental_income as f64 * MAINTENANCE_RESERVE_RATE;
    let monthly_cash_flow = (property.estimated_rental_income as f64
        - mortgage_payment
        - monthly_taxes
        - maintenance_reserve)
        .round() as i64;

    Ok(AnalyzedProperty {
        record: property.clone(),
        annual_rental,
        cap_rate,
        monthly_cash_flow,
    })
}

/// Per-state means plus the normalized investment score.
///
/// Scores normalize each state's mean cap rate and cash flow by the maximum
/// across states and its mean price by the minimum (inverted), blended
/// 50/30/20. Means carry one decimal, scores one decimal.
pub fn state_aggregates(analyzed: &[AnalyzedProperty]) -> Result<Vec<StateAggregate>, MetricsError> {
    let groups = group_by(analyzed, |a| a.record.state.as_str())?;

    let mut rows: Vec<StateAggregate> = groups
        .into_iter()
        .map(|(state, members)| StateAggregate {
            state: state.to_string(),
            mean_cap_rate: round_to(mean(members.iter().map(|a| a.cap_rate)), 1),
            mean_cash_flow: round_to(mean(members.iter().map(|a| a.monthly_cash_flow as f64)), 1),
            mean_price: round_to(mean(members.iter().map(|a| a.record.price as f64)), 1),
            investment_score: 0.0,
        })
        .collect();

    let max_cap_rate = fold_max(rows.iter().map(|r| r.mean_cap_rate));
    let max_cash_flow = fold_max(rows.iter().map(|r| r.mean_cash_flow));
    let min_price = fold_min(rows.iter().map(|r| r.mean_price));
    if max_cap_rate == 0.0 {
        return Err(MetricsError::DegenerateNormalization("cap rate"));
    }
    if max_cash_flow == 0.0 {
        return Err(MetricsError::DegenerateNormalization("cash flow"));
    }
    if min_price <= 0.0 {
        return Err(MetricsError::DegenerateNormalization("price"));
    }

    for row in &mut rows {
        let score = row.mean_cap_rate / max_cap_rate * SCORE_CAP_RATE_WEIGHT
            + row.mean_cash_flow / max_cash_flow * SCORE_CASH_FLOW_WEIGHT
            + min_price / row.mean_price * SCORE_AFFORDABILITY_WEIGHT;
        row.investment_score = round_to(score, 1);
    }

    Ok(rows)
}

/// Per-city mean price-per-sqft and market velocity.
pub fn city_aggregates(analyzed: &[AnalyzedProperty]) -> Result<Vec<CityAggregate>, MetricsError> {
    let groups = group_by(analyzed, |a| a.record.city.as_str())?;

    Ok(groups
        .into_iter()
        .map(|(city, members)| CityAggregate {
            city: city.to_string(),
            mean_price_per_sqft: mean(members.iter().map(|a| a.record.price_per_sqft)),
            mean_days_on_market: mean(members.iter().map(|a| a.record.days_on_market as f64)),
        })
        .collect())
}

/// Mean cap rate per square-footage bucket, in bucket order.
/// Buckets with no members are omitted (their mean is undefined).
pub fn size_bucket_aggregates(
    analyzed: &[AnalyzedProperty],
) -> Result<Vec<SizeBucketAggregate>, MetricsError> {
    if analyzed.is_empty() {
        return Err(MetricsError::EmptyTable);
    }

    Ok(SizeBucket::ALL
        .iter()
        .filter_map(|bucket| {
            let members: Vec<&AnalyzedProperty> = analyzed
                .iter()
                .filter(|a| SizeBucket::for_square_feet(a.record.square_feet) == *bucket)
                .collect();
            if members.is_empty() {
                return None;
            }
            Some(SizeBucketAggregate {
                bucket: bucket.label(),
                properties: members.len(),
                mean_cap_rate: mean(members.iter().map(|a| a.cap_rate)),
            })
        })
        .collect())
}

/// Mean cap rate and cash flow per property type.
pub fn property_type_aggregates(
    analyzed: &[AnalyzedProperty],
) -> Result<Vec<PropertyTypeAggregate>, MetricsError> {
    let groups = group_by(analyzed, |a| a.record.property_type.as_str())?;

    Ok(groups
        .into_iter()
        .map(|(property_type, members)| PropertyTypeAggregate {
            property_type: property_type.to_string(),
            mean_cap_rate: mean(members.iter().map(|a| a.cap_rate)),
            mean_cash_flow: mean(members.iter().map(|a| a.monthly_cash_flow as f64)),
        })
        .collect())
}

/// Portfolio-allocation view: listing count per cash-flow tier, in tier order.
pub fn cash_flow_tier_counts(analyzed: &[AnalyzedProperty]) -> Result<Vec<TierCount>, MetricsError> {
    if analyzed.is_empty() {
        return Err(MetricsError::EmptyTable);
    }

    Ok(CashFlowTier::ALL
        .iter()
        .map(|tier| TierCount {
            tier: tier.label(),
            properties: analyzed
                .iter()
                .filter(|a| CashFlowTier::for_cash_flow(a.monthly_cash_flow) == *tier)
                .count(),
        })
        .collect())
}

/// The `limit` best listings by simple score, descending.
///
/// Simple score blends cap rate (40%) with cash flow normalized to a 0-10
/// band (60%). The sort is stable: exact ties keep original row order.
pub fn top_properties(
    analyzed: &[AnalyzedProperty],
    limit: usize,
) -> Result<Vec<TopProperty>, MetricsError> {
    if analyzed.is_empty() {
        return Err(MetricsError::EmptyTable);
    }

    let max_cash_flow = analyzed
        .iter()
        .map(|a| a.monthly_cash_flow)
        .max()
        .unwrap_or_default() as f64;
    if max_cash_flow == 0.0 {
        return Err(MetricsError::DegenerateNormalization("cash flow"));
    }

    let mut scored: Vec<(f64, &AnalyzedProperty)> = analyzed
        .iter()
        .map(|a| {
            let score = a.cap_rate * 0.4 + (a.monthly_cash_flow as f64 / max_cash_flow * 10.0) * 0.6;
            (score, a)
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    Ok(scored
        .into_iter()
        .take(limit)
        .map(|(score, a)| TopProperty {
            property_id: a.record.property_id,
            city: a.record.city.clone(),
            state: a.record.state.clone(),
            price: a.record.price,
            cap_rate: a.cap_rate,
            monthly_cash_flow: a.monthly_cash_flow,
            simple_score: score,
        })
        .collect())
}

fn group_by<'a, K: Ord>(
    analyzed: &'a [AnalyzedProperty],
    key: impl Fn(&'a AnalyzedProperty) -> K,
) -> Result<BTreeMap<K, Vec<&'a AnalyzedProperty>>, MetricsError> {
    if analyzed.is_empty() {
        return Err(MetricsError::EmptyTable);
    }
    let mut groups: BTreeMap<K, Vec<&AnalyzedProperty>> = BTreeMap::new();
    for a in analyzed {
        groups.entry(key(a)).or_default().push(a);
    }
    Ok(groups)
}

// Callers guarantee non-empty input via group_by / the EmptyTable guard.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    sum / count as f64
}

fn fold_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

fn fold_min(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::INFINITY, f64::min)
}
