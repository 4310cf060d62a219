use anyhow::Result;
use betfair_odds::{BetfairConfig, FootballService};

/// Connection diagnostic: authenticate, probe the session, pull the next
/// 24 hours of top-5-league matches and print a summary.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Betfair odds diagnostic starting...");

    let config = BetfairConfig::from_env()?;
    let service = FootballService::new(config)?;

    if let Err(err) = service.client().session().keep_alive().await {
        tracing::warn!("Keep-alive failed (continuing): {}", err);
    }

    let matches = service.get_upcoming_matches(24).await?;
    tracing::info!("Upcoming top-5-league matches in 24h: {}", matches.len());

    for m in &matches {
        tracing::info!(
            "{} | {} | {} markets",
            m.competition,
            m.event_name,
            m.markets.len()
        );
    }

    if let Some(first) = matches.first() {
        match service.get_match_odds_simplified(&first.event_id).await? {
            Some(odds) => {
                tracing::info!("Simplified odds for {}:", odds.event_name);
                println!("{}", serde_json::to_string_pretty(&odds)?);
            }
            None => tracing::info!("No simplified odds for {}", first.event_name),
        }
    }

    service.client().session().logout().await;
    tracing::info!("Done");

    Ok(())
}
