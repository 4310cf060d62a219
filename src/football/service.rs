use std::collections::HashMap;

use chrono::{Duration, Utc};
use tracing::info;

use crate::config::BetfairConfig;
use crate::error::Result;
use crate::exchange::client::{BetfairApi, BetfairClient};
use crate::exchange::types::{MarketBook, MarketCatalogue, MarketFilter, TimeRange};
use crate::football::leagues::{restrict_to_leagues, TOP_FIVE_LEAGUES};
use crate::football::simplify::simplify_match;
use crate::football::types::{FootballMarket, FootballMatch, FootballRunner, SimplifiedOdds};

/// Betfair event type id for Association Football.
const FOOTBALL_EVENT_TYPE_ID: &str = "1";

const CATALOGUE_PROJECTION: [&str; 4] = [
    "COMPETITION",
    "EVENT",
    "RUNNER_DESCRIPTION",
    "MARKET_START_TIME",
];

/// Match odds plus every over/under goals line the exchange quotes.
const ALL_MARKET_TYPES: [&str; 10] = [
    "MATCH_ODDS",
    "OVER_UNDER_05",
    "OVER_UNDER_15",
    "OVER_UNDER_25",
    "OVER_UNDER_35",
    "OVER_UNDER_45",
    "OVER_UNDER_55",
    "OVER_UNDER_65",
    "OVER_UNDER_75",
    "OVER_UNDER_85",
];

const BEST_PRICES_DEPTH: u32 = 3;

/// Joins market catalogues and order books into event-centric matches.
///
/// Request-scoped, like the client it wraps: build one per inbound request.
pub struct FootballService<C> {
    client: C,
}

impl FootballService<BetfairClient> {
    pub fn new(config: BetfairConfig) -> Result<Self> {
        Ok(Self {
            client: BetfairClient::new(config)?,
        })
    }
}

impl<C: BetfairApi> FootballService<C> {
    pub fn with_client(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch football matches starting within the next `hours`, or currently
    /// in play. The catalogue and book fetches are sequential; the pair is a
    /// best-effort snapshot, not an atomic read.
    pub async fn get_football_matches(
        &self,
        hours: i64,
        market_types: &[&str],
        in_play_only: bool,
    ) -> Result<Vec<FootballMatch>> {
        let now = Utc::now();

        // The start-time window is meaningless for in-play state, so in-play
        // fetches leave it unbounded.
        let market_start_time = if in_play_only {
            None
        } else {
            Some(TimeRange {
                from: now,
                to: now + Duration::hours(hours),
            })
        };

        let filter = MarketFilter {
            event_type_ids: Some(vec![FOOTBALL_EVENT_TYPE_ID.to_string()]),
            market_type_codes: Some(market_types.iter().map(|s| s.to_string()).collect()),
            market_start_time,
            in_play_only: Some(in_play_only),
            ..Default::default()
        };

        self.fetch_and_join(&filter, 200).await
    }

    /// All markets for a single event, or `None` when the event is unknown.
    pub async fn get_match_details(&self, event_id: &str) -> Result<Option<FootballMatch>> {
        let filter = MarketFilter {
            event_ids: Some(vec![event_id.to_string()]),
            ..Default::default()
        };

        let matches = self.fetch_and_join(&filter, 50).await?;
        Ok(matches.into_iter().next())
    }

    /// One event restricted to match odds plus every over/under goals line.
    pub async fn get_match_with_all_markets(
        &self,
        event_id: &str,
    ) -> Result<Option<FootballMatch>> {
        let filter = MarketFilter {
            event_ids: Some(vec![event_id.to_string()]),
            market_type_codes: Some(ALL_MARKET_TYPES.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        };

        let matches = self.fetch_and_join(&filter, 100).await?;
        Ok(matches.into_iter().next())
    }

    /// Upcoming matches in the top-5 leagues, match odds only.
    pub async fn get_upcoming_matches(&self, hours: i64) -> Result<Vec<FootballMatch>> {
        let matches = self
            .get_football_matches(hours, &["MATCH_ODDS"], false)
            .await?;
        Ok(restrict_to_leagues(matches, &TOP_FIVE_LEAGUES))
    }

    /// Live matches in the top-5 leagues, match odds only.
    pub async fn get_in_play_matches(&self) -> Result<Vec<FootballMatch>> {
        let matches = self.get_football_matches(0, &["MATCH_ODDS"], true).await?;
        Ok(restrict_to_leagues(matches, &TOP_FIVE_LEAGUES))
    }

    /// Flattened odds for one event: match odds plus over/under lines,
    /// ladders truncated to the top levels.
    pub async fn get_match_odds_simplified(
        &self,
        event_id: &str,
    ) -> Result<Option<SimplifiedOdds>> {
        let m = self.get_match_with_all_markets(event_id).await?;
        Ok(m.map(|m| simplify_match(&m)))
    }

    /// The match-odds market of one event, if it exists.
    pub async fn get_match_odds(&self, event_id: &str) -> Result<Option<FootballMarket>> {
        let m = self.get_match_details(event_id).await?;
        Ok(m.and_then(|m| {
            m.markets
                .into_iter()
                .find(|market| market.market_name.contains("Match Odds"))
        }))
    }

    async fn fetch_and_join(
        &self,
        filter: &MarketFilter,
        max_results: u32,
    ) -> Result<Vec<FootballMatch>> {
        let catalogues = self
            .client
            .list_market_catalogue(filter, max_results, &CATALOGUE_PROJECTION)
            .await?;

        // Nothing matched the filter; skip the book call entirely.
        if catalogues.is_empty() {
            return Ok(Vec::new());
        }

        let market_ids: Vec<String> = catalogues.iter().map(|c| c.market_id.clone()).collect();
        let books = self
            .client
            .list_market_book(&market_ids, BEST_PRICES_DEPTH)
            .await?;

        let matches = group_by_event(catalogues, books);
        info!("Aggregated {} football matches", matches.len());
        Ok(matches)
    }
}

/// Join catalogues and books by market id and group the result by event.
///
/// Events keep the order in which they first appear in the catalogue list,
/// and the first catalogue seen for an event supplies the match metadata.
/// A catalogue whose market id has no book entry is dropped whole rather
/// than emitted half-populated.
fn group_by_event(catalogues: Vec<MarketCatalogue>, books: Vec<MarketBook>) -> Vec<FootballMatch> {
    let mut book_index: HashMap<&str, &MarketBook> = HashMap::new();
    for book in &books {
        // First entry wins on (unexpected) duplicate market ids.
        book_index.entry(book.market_id.as_str()).or_insert(book);
    }

    let mut matches: Vec<FootballMatch> = Vec::new();
    let mut event_index: HashMap<String, usize> = HashMap::new();

    for catalogue in &catalogues {
        let book = match book_index.get(catalogue.market_id.as_str()) {
            Some(book) => *book,
            None => continue,
        };

        let index = *event_index
            .entry(catalogue.event.id.clone())
            .or_insert_with(|| {
                matches.push(FootballMatch {
                    event_id: catalogue.event.id.clone(),
                    event_name: catalogue.event.name.clone(),
                    competition: catalogue
                        .competition
                        .as_ref()
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    country: catalogue
                        .event
                        .country_code
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    start_time: catalogue.market_start_time,
                    markets: Vec::new(),
                });
                matches.len() - 1
            });

        let runners: Vec<FootballRunner> = catalogue
            .runners
            .iter()
            .map(|runner| {
                let runner_book = book
                    .runners
                    .iter()
                    .find(|r| r.selection_id == runner.selection_id);

                let (back_prices, lay_prices) = runner_book
                    .and_then(|r| r.ex.as_ref())
                    .map(|ex| (ex.available_to_back.clone(), ex.available_to_lay.clone()))
                    .unwrap_or_default();

                FootballRunner {
                    selection_id: runner.selection_id,
                    runner_name: runner.runner_name.clone(),
                    back_prices,
                    lay_prices,
                    last_price_traded: runner_book.and_then(|r| r.last_price_traded),
                    status: runner_book
                        .and_then(|r| r.status.clone())
                        .unwrap_or_else(|| "UNKNOWN".to_string()),
                }
            })
            .collect();

        matches[index].markets.push(FootballMarket {
            market_id: catalogue.market_id.clone(),
            market_name: catalogue.market_name.clone(),
            total_matched: book.total_matched,
            runners,
        });
    }

    matches
}
