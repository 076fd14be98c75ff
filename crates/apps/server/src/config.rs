use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use trivia::{GameConfig, DEFAULT_QUIZ_ROUNDS};

/// Space-separated; attribute URLs carry commas in their `fields=` filter.
pub const DEFAULT_BOUNDARY_URLS: &str = concat!(
    "https://raw.githubusercontent.com/holtzy/D3-graph-gallery/master/DATA/world.geojson ",
    "https://unpkg.com/world-atlas@2/countries-110m.json",
);

/// REST Countries answers HTTP 400 past this many `fields=` entries, and
/// `/all` without a filter.
pub const MAX_FIELDS_PER_REQUEST: usize = 10;

/// The full record needs two requests, joined on `cca3` (`|` separates
/// them); the fallbacks trade fields for a single request.
pub const DEFAULT_ATTRIBUTES_URLS: &str = concat!(
    "https://restcountries.com/v3.1/all?fields=",
    "name,cca2,cca3,capital,population,area,region,subregion,languages,currencies",
    "|https://restcountries.com/v3.1/all?fields=cca3,timezones,flags,latlng ",
    "https://restcountries.com/v3.1/all?fields=",
    "name,cca2,cca3,capital,region,subregion,flags,population,latlng,languages ",
    "https://restcountries.com/v3.1/all?fields=",
    "name,population,languages,capital,region,currencies,timezones,area",
);
pub const DEFAULT_COUNTRY_API: &str = "https://restcountries.com/v3.1";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Globe explorer and trivia API")]
pub struct Config {
    /// Listen address
    #[arg(long, env = "GLOBE_ADDR", default_value = "127.0.0.1:9200")]
    pub addr: SocketAddr,

    /// Boundary dataset URLs (GeoJSON or TopoJSON), tried in order
    #[arg(
        long,
        env = "GLOBE_BOUNDARY_URLS",
        value_delimiter = ' ',
        default_value = DEFAULT_BOUNDARY_URLS
    )]
    pub boundary_urls: Vec<String>,

    /// Attributes endpoints, tried in order before the built-in list; an
    /// entry of `|`-joined URLs is fetched whole and joined on `cca3`
    #[arg(
        long,
        env = "GLOBE_ATTRIBUTES_URLS",
        value_delimiter = ' ',
        default_value = DEFAULT_ATTRIBUTES_URLS
    )]
    pub attributes_urls: Vec<String>,

    /// Base URL for per-country lookups
    #[arg(long, env = "GLOBE_COUNTRY_API", default_value = DEFAULT_COUNTRY_API)]
    pub country_api: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "GLOBE_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    pub fetch_timeout_secs: u64,

    #[arg(long, env = "GLOBE_ROUNDS", default_value_t = trivia::DEFAULT_ROUNDS)]
    pub rounds: u32,

    #[arg(long, env = "GLOBE_MAX_ATTEMPTS", default_value_t = trivia::DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// How long a correct answer stays on screen
    #[arg(long, env = "GLOBE_CORRECT_DELAY_MS", default_value_t = 2000)]
    pub correct_delay_ms: u64,

    #[arg(long, env = "GLOBE_QUIZ_ROUNDS", default_value_t = DEFAULT_QUIZ_ROUNDS)]
    pub quiz_rounds: u32,

    /// Views, games and quizzes idle this long are dropped
    #[arg(long, env = "GLOBE_SESSION_TTL_SECS", default_value_t = 1800)]
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs.max(1))
    }

    pub fn game(&self) -> GameConfig {
        GameConfig {
            rounds: self.rounds,
            max_attempts: self.max_attempts,
            correct_delay: Duration::from_millis(self.correct_delay_ms),
        }
    }
}
