use std::sync::OnceLock;

use regex::Regex;

use crate::football::types::{
    FootballMarket, FootballMatch, FootballRunner, MatchOddsPrices, OverUnderPrices, RunnerPrices,
    SimplifiedOdds,
};

/// Price-ladder depth kept in the simplified view.
const SIMPLIFIED_DEPTH: usize = 3;

// Tied to Betfair's market naming; not under our control, so matched
// literally rather than generalized.
fn over_under_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"over/under (\d+\.5) goals?").unwrap())
}

/// Project a full match into the flattened, depth-limited odds view.
///
/// Pure function: scans the markets once, classifies each by name and fills
/// the matching slot, or skips the market when its runners cannot all be
/// resolved. Unrecognized market names are ignored.
pub fn simplify_match(m: &FootballMatch) -> SimplifiedOdds {
    let mut simplified = SimplifiedOdds::from_match_header(m);

    for market in &m.markets {
        let market_name = market.market_name.to_lowercase();

        if market_name.contains("match odds") {
            // Assign only on success so an unresolvable duplicate market
            // cannot clear a slot an earlier market already filled.
            if let Some(odds) = resolve_match_odds(market) {
                simplified.match_odds = Some(odds);
            }
            continue;
        }

        if let Some(captures) = over_under_regex().captures(&market_name) {
            let line = captures[1].replace('.', "");
            if let Some(slot) = simplified.over_under_slot(&line) {
                if let Some(prices) = resolve_over_under(market) {
                    *slot = Some(prices);
                }
            }
        }
    }

    simplified
}

/// Resolve home/draw/away for a match-odds market, or `None` when any role
/// is missing. Home is the first non-draw runner in catalogue order; the
/// assignment is a naming heuristic inherited from upstream.
fn resolve_match_odds(market: &FootballMarket) -> Option<MatchOddsPrices> {
    let draw = market
        .runners
        .iter()
        .find(|r| r.runner_name.to_lowercase().contains("draw"))?;
    let home = market
        .runners
        .iter()
        .find(|r| !r.runner_name.to_lowercase().contains("draw"))?;
    let away = market.runners.iter().find(|r| {
        !r.runner_name.to_lowercase().contains("draw") && r.selection_id != home.selection_id
    })?;

    Some(MatchOddsPrices {
        home: runner_prices(home),
        draw: runner_prices(draw),
        away: runner_prices(away),
    })
}

fn resolve_over_under(market: &FootballMarket) -> Option<OverUnderPrices> {
    let over = market
        .runners
        .iter()
        .find(|r| r.runner_name.to_lowercase().contains("over"))?;
    let under = market
        .runners
        .iter()
        .find(|r| r.runner_name.to_lowercase().contains("under"))?;

    Some(OverUnderPrices {
        over: runner_prices(over),
        under: runner_prices(under),
    })
}

fn runner_prices(runner: &FootballRunner) -> RunnerPrices {
    RunnerPrices {
        back: runner.back_prices.iter().take(SIMPLIFIED_DEPTH).cloned().collect(),
        lay: runner.lay_prices.iter().take(SIMPLIFIED_DEPTH).cloned().collect(),
        last_price_traded: runner.last_price_traded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::types::PriceSize;

    fn runner(selection_id: u64, name: &str, back: f64, lay: f64) -> FootballRunner {
        FootballRunner {
            selection_id,
            runner_name: name.to_string(),
            back_prices: vec![PriceSize {
                price: back,
                size: 100.0,
            }],
            lay_prices: vec![PriceSize {
                price: lay,
                size: 100.0,
            }],
            last_price_traded: Some(back),
            status: "ACTIVE".to_string(),
        }
    }

    fn market(name: &str, runners: Vec<FootballRunner>) -> FootballMarket {
        FootballMarket {
            market_id: "1.234".to_string(),
            market_name: name.to_string(),
            total_matched: Some(5000.0),
            runners,
        }
    }

    fn football_match(markets: Vec<FootballMarket>) -> FootballMatch {
        FootballMatch {
            event_id: "e1".to_string(),
            event_name: "Team A v Team B".to_string(),
            competition: "English Premier League".to_string(),
            country: "GB".to_string(),
            start_time: None,
            markets,
        }
    }

    #[test]
    fn test_match_odds_roles_assigned_in_catalogue_order() {
        let m = football_match(vec![market(
            "Match Odds",
            vec![
                runner(1, "Team A", 2.0, 2.02),
                runner(2, "The Draw", 3.4, 3.45),
                runner(3, "Team B", 4.0, 4.1),
            ],
        )]);

        let odds = simplify_match(&m).match_odds.unwrap();
        assert_eq!(odds.home.back[0].price, 2.0);
        assert_eq!(odds.draw.back[0].price, 3.4);
        assert_eq!(odds.away.back[0].price, 4.0);
        assert_eq!(odds.away.lay[0].price, 4.1);
    }

    #[test]
    fn test_match_odds_absent_without_draw_runner() {
        let m = football_match(vec![market(
            "Match Odds",
            vec![runner(1, "Team A", 2.0, 2.02), runner(3, "Team B", 4.0, 4.1)],
        )]);

        assert!(simplify_match(&m).match_odds.is_none());
    }

    #[test]
    fn test_match_odds_absent_with_fewer_than_three_runners() {
        let m = football_match(vec![market(
            "Match Odds",
            vec![runner(1, "Team A", 2.0, 2.02), runner(2, "The Draw", 3.4, 3.45)],
        )]);

        assert!(simplify_match(&m).match_odds.is_none());
    }

    #[test]
    fn test_over_under_slot_keyed_regardless_of_runner_order() {
        let m = football_match(vec![market(
            "Over/Under 2.5 Goals",
            vec![
                runner(11, "Under 2.5 Goals", 2.1, 2.14),
                runner(10, "Over 2.5 Goals", 1.8, 1.82),
            ],
        )]);

        let simplified = simplify_match(&m);
        let slot = simplified.over_under_25.unwrap();
        assert_eq!(slot.over.back[0].price, 1.8);
        assert_eq!(slot.under.back[0].price, 2.1);
        assert!(simplified.over_under_05.is_none());
    }

    #[test]
    fn test_all_goal_lines_recognized() {
        let markets = ["0.5", "1.5", "2.5", "3.5", "4.5", "5.5", "6.5", "7.5", "8.5"]
            .iter()
            .map(|line| {
                market(
                    &format!("Over/Under {} Goals", line),
                    vec![
                        runner(10, &format!("Over {} Goals", line), 1.8, 1.82),
                        runner(11, &format!("Under {} Goals", line), 2.1, 2.14),
                    ],
                )
            })
            .collect();

        let simplified = simplify_match(&football_match(markets));
        assert!(simplified.over_under_05.is_some());
        assert!(simplified.over_under_15.is_some());
        assert!(simplified.over_under_25.is_some());
        assert!(simplified.over_under_35.is_some());
        assert!(simplified.over_under_45.is_some());
        assert!(simplified.over_under_55.is_some());
        assert!(simplified.over_under_65.is_some());
        assert!(simplified.over_under_75.is_some());
        assert!(simplified.over_under_85.is_some());
    }

    #[test]
    fn test_over_under_absent_when_runner_missing() {
        let m = football_match(vec![market(
            "Over/Under 2.5 Goals",
            vec![runner(10, "Over 2.5 Goals", 1.8, 1.82)],
        )]);

        assert!(simplify_match(&m).over_under_25.is_none());
    }

    #[test]
    fn test_unresolvable_duplicate_keeps_resolved_match_odds() {
        let m = football_match(vec![
            market(
                "Match Odds",
                vec![
                    runner(1, "Team A", 2.0, 2.02),
                    runner(2, "The Draw", 3.4, 3.45),
                    runner(3, "Team B", 4.0, 4.1),
                ],
            ),
            market("Match Odds", vec![runner(4, "Team C", 1.5, 1.52)]),
        ]);

        let odds = simplify_match(&m).match_odds.unwrap();
        assert_eq!(odds.home.back[0].price, 2.0);
        assert_eq!(odds.away.back[0].price, 4.0);
    }

    #[test]
    fn test_unresolvable_duplicate_keeps_resolved_over_under() {
        let m = football_match(vec![
            market(
                "Over/Under 2.5 Goals",
                vec![
                    runner(10, "Over 2.5 Goals", 1.8, 1.82),
                    runner(11, "Under 2.5 Goals", 2.1, 2.14),
                ],
            ),
            market(
                "Over/Under 2.5 Goals",
                vec![runner(12, "Over 2.5 Goals", 1.9, 1.95)],
            ),
        ]);

        let slot = simplify_match(&m).over_under_25.unwrap();
        assert_eq!(slot.over.back[0].price, 1.8);
        assert_eq!(slot.under.back[0].price, 2.1);
    }

    #[test]
    fn test_unrelated_markets_ignored() {
        let m = football_match(vec![market(
            "Correct Score",
            vec![runner(20, "1 - 0", 7.0, 7.4)],
        )]);

        let simplified = simplify_match(&m);
        assert!(simplified.match_odds.is_none());
        assert!(simplified.over_under_25.is_none());
    }

    #[test]
    fn test_ladders_truncated_to_three_levels() {
        let mut r = runner(1, "Team A", 2.0, 2.02);
        r.back_prices = (0..5)
            .map(|i| PriceSize {
                price: 2.0 + i as f64 * 0.02,
                size: 50.0,
            })
            .collect();

        let m = football_match(vec![market(
            "Match Odds",
            vec![r, runner(2, "The Draw", 3.4, 3.45), runner(3, "Team B", 4.0, 4.1)],
        )]);

        let odds = simplify_match(&m).match_odds.unwrap();
        assert_eq!(odds.home.back.len(), 3);
        assert_eq!(odds.home.back[0].price, 2.0);
    }

    #[test]
    fn test_simplify_is_pure() {
        let m = football_match(vec![market(
            "Match Odds",
            vec![
                runner(1, "Team A", 2.0, 2.02),
                runner(2, "The Draw", 3.4, 3.45),
                runner(3, "Team B", 4.0, 4.1),
            ],
        )]);

        assert_eq!(simplify_match(&m), simplify_match(&m));
    }
}
