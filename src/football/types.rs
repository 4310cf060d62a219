use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::exchange::types::PriceSize;

/// One sporting event with all of its joined markets.
///
/// Markets only appear here once their order book was found; prices always
/// come from the book side of the join.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FootballMatch {
    pub event_id: String,
    pub event_name: String,
    pub competition: String,
    pub country: String,
    pub start_time: Option<DateTime<Utc>>,
    pub markets: Vec<FootballMarket>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FootballMarket {
    pub market_id: String,
    pub market_name: String,
    pub total_matched: Option<f64>,
    pub runners: Vec<FootballRunner>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FootballRunner {
    pub selection_id: u64,
    pub runner_name: String,
    pub back_prices: Vec<PriceSize>,
    pub lay_prices: Vec<PriceSize>,
    pub last_price_traded: Option<f64>,
    pub status: String,
}

/// Truncated back/lay ladders for one outcome, best price first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerPrices {
    pub back: Vec<PriceSize>,
    pub lay: Vec<PriceSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_price_traded: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOddsPrices {
    pub home: RunnerPrices,
    pub draw: RunnerPrices,
    pub away: RunnerPrices,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverUnderPrices {
    pub over: RunnerPrices,
    pub under: RunnerPrices,
}

/// Flattened odds view of one match: one optional slot per recognized
/// market type. A slot is present only when every required runner was
/// resolved; there are no partially-filled slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplifiedOdds {
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(rename = "eventName")]
    pub event_name: String,
    pub competition: String,
    pub country: String,
    #[serde(rename = "startTime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_odds: Option<MatchOddsPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_under_05: Option<OverUnderPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_under_15: Option<OverUnderPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_under_25: Option<OverUnderPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_under_35: Option<OverUnderPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_under_45: Option<OverUnderPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_under_55: Option<OverUnderPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_under_65: Option<OverUnderPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_under_75: Option<OverUnderPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_under_85: Option<OverUnderPrices>,
}

impl SimplifiedOdds {
    pub fn from_match_header(m: &FootballMatch) -> Self {
        Self {
            event_id: m.event_id.clone(),
            event_name: m.event_name.clone(),
            competition: m.competition.clone(),
            country: m.country.clone(),
            start_time: m.start_time,
            match_odds: None,
            over_under_05: None,
            over_under_15: None,
            over_under_25: None,
            over_under_35: None,
            over_under_45: None,
            over_under_55: None,
            over_under_65: None,
            over_under_75: None,
            over_under_85: None,
        }
    }

    /// Mutable slot for an over/under goals line ("05" through "85"),
    /// or `None` for an unrecognized line.
    pub fn over_under_slot(&mut self, line: &str) -> Option<&mut Option<OverUnderPrices>> {
        match line {
            "05" => Some(&mut self.over_under_05),
            "15" => Some(&mut self.over_under_15),
            "25" => Some(&mut self.over_under_25),
            "35" => Some(&mut self.over_under_35),
            "45" => Some(&mut self.over_under_45),
            "55" => Some(&mut self.over_under_55),
            "65" => Some(&mut self.over_under_65),
            "75" => Some(&mut self.over_under_75),
            "85" => Some(&mut self.over_under_85),
            _ => None,
        }
    }
}
