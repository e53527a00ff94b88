use std::str::FromStr;

use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_LAPS_API_URL: &str = "https://api.jolpi.ca/ergast/f1";
/// One year; longer cache lifetimes are cut down to this.
pub const MAX_RESPONSE_CACHE_TTL: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub laps_api_url: String,
    pub response_cache_ttl: i64,
    pub provider_max_concurrent: usize,
    pub provider_min_delay_ms: u64,
}

impl Config {
    pub fn init() -> Self {
        Config {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            laps_api_url: std::env::var("LAPS_API_URL")
                .unwrap_or_else(|_| DEFAULT_LAPS_API_URL.to_string()),
            response_cache_ttl: clamp_ttl(parse_var("RESPONSE_CACHE_TTL", 30)),
            provider_max_concurrent: parse_var("PROVIDER_MAX_CONCURRENT", 1),
            provider_min_delay_ms: parse_var("PROVIDER_MIN_DELAY_MS", 250),
        }
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    parse_or(name, std::env::var(name).ok().as_deref(), default)
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(name: &str, raw: Option<&str>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value {raw:?} for {name}, using {default}");
            default
        }),
    }
}

fn clamp_ttl(ttl: i64) -> i64 {
    if ttl > MAX_RESPONSE_CACHE_TTL {
        warn!("RESPONSE_CACHE_TTL of {ttl}s is too large, using {MAX_RESPONSE_CACHE_TTL}s");
        return MAX_RESPONSE_CACHE_TTL;
    }
    ttl
}
