use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query describing which market catalogues to fetch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_type_codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_start_time: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_play_only: Option<bool>,
}

/// Inclusive start-time window. Both bounds serialize as ISO-8601 instants.
#[derive(Debug, Clone, Serialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Response from the identity login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub open_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Competition {
    pub id: String,
    pub name: String,
}

/// The "what exists" half of a market: names, runners, start time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCatalogue {
    pub market_id: String,
    pub market_name: String,
    #[serde(default)]
    pub market_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_matched: Option<f64>,
    #[serde(default)]
    pub runners: Vec<RunnerCatalogue>,
    pub event: Event,
    #[serde(default)]
    pub competition: Option<Competition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerCatalogue {
    pub selection_id: u64,
    pub runner_name: String,
    #[serde(default)]
    pub handicap: Option<f64>,
    #[serde(default)]
    pub sort_priority: Option<u32>,
}

/// One price level on a ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSize {
    pub price: f64,
    pub size: f64,
}

/// Back/lay ladders for a runner, best price first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangePrices {
    #[serde(default)]
    pub available_to_back: Vec<PriceSize>,
    #[serde(default)]
    pub available_to_lay: Vec<PriceSize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerBook {
    pub selection_id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ex: Option<ExchangePrices>,
    #[serde(default)]
    pub last_price_traded: Option<f64>,
}

/// The "current state" half of a market: live prices, joined to the
/// catalogue by market id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketBook {
    pub market_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_matched: Option<f64>,
    #[serde(default)]
    pub runners: Vec<RunnerBook>,
}
