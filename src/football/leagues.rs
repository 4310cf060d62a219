use crate::football::types::FootballMatch;

/// The five big European leagues surfaced by the upcoming/in-play views.
pub const TOP_FIVE_LEAGUES: [&str; 5] = [
    "Spanish La Liga",
    "English Premier League",
    "Italian Serie A",
    "German Bundesliga",
    "French Ligue 1",
];

/// Keep matches whose competition name contains any of the allowed names
/// (case-insensitive). Stable, order-preserving filter.
pub fn restrict_to_leagues(matches: Vec<FootballMatch>, allowed: &[&str]) -> Vec<FootballMatch> {
    matches
        .into_iter()
        .filter(|m| {
            let competition = m.competition.to_lowercase();
            allowed
                .iter()
                .any(|league| competition.contains(&league.to_lowercase()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_in(competition: &str) -> FootballMatch {
        FootballMatch {
            event_id: competition.to_string(),
            event_name: "A v B".to_string(),
            competition: competition.to_string(),
            country: "GB".to_string(),
            start_time: None,
            markets: Vec::new(),
        }
    }

    #[test]
    fn test_keeps_only_allowed_leagues() {
        let matches = vec![
            match_in("English Premier League"),
            match_in("English League Two"),
            match_in("Spanish La Liga"),
        ];

        let filtered = restrict_to_leagues(matches, &TOP_FIVE_LEAGUES);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].competition, "English Premier League");
        assert_eq!(filtered[1].competition, "Spanish La Liga");
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let matches = vec![match_in("SPANISH LA LIGA 2026/27")];
        let filtered = restrict_to_leagues(matches, &TOP_FIVE_LEAGUES);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_idempotent_and_order_preserving() {
        let matches = vec![
            match_in("Italian Serie A"),
            match_in("German Bundesliga"),
            match_in("French Ligue 1"),
        ];

        let once = restrict_to_leagues(matches, &TOP_FIVE_LEAGUES);
        let order: Vec<_> = once.iter().map(|m| m.competition.clone()).collect();
        let twice = restrict_to_leagues(once, &TOP_FIVE_LEAGUES);

        assert_eq!(
            twice.iter().map(|m| m.competition.clone()).collect::<Vec<_>>(),
            order
        );
    }
}
