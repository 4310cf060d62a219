pub mod config;
pub mod error;
pub mod exchange;
pub mod football;

pub use config::BetfairConfig;
pub use error::BetfairError;
pub use exchange::client::{BetfairApi, BetfairClient};
pub use football::service::FootballService;
pub use football::types::{FootballMatch, SimplifiedOdds};
