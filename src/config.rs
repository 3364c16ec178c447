use std::collections::HashMap;
use std::env;

/// Market data provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the Yahoo Finance chart API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Request symbol -> provider ticker (e.g. ES -> ES=F).
    pub symbol_aliases: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            symbol_aliases: default_symbol_aliases(),
        }
    }
}

/// Continuous front-month futures tickers.
fn default_symbol_aliases() -> HashMap<String, String> {
    HashMap::from([
        ("ES".to_string(), "ES=F".to_string()),
        ("NQ".to_string(), "NQ=F".to_string()),
    ])
}

/// Parse `SYMBOL|TICKER` pairs separated by commas, e.g. `ES|ES=F,NQ|NQ=F`.
///
/// Malformed entries are skipped.
pub fn parse_symbol_aliases(s: &str) -> HashMap<String, String> {
    s.split(',')
        .filter_map(|entry| {
            let (symbol, ticker) = entry.split_once('|')?;
            let (symbol, ticker) = (symbol.trim(), ticker.trim());
            if symbol.is_empty() || ticker.is_empty() {
                return None;
            }
            Some((symbol.to_uppercase(), ticker.to_string()))
        })
        .collect()
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Market data provider settings.
    pub provider: ProviderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            provider: ProviderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let provider_defaults = defaults.provider;

        // Aliases from the environment extend the built-in ones
        let mut symbol_aliases = provider_defaults.symbol_aliases;
        if let Ok(s) = env::var("SYMBOL_ALIASES") {
            symbol_aliases.extend(parse_symbol_aliases(&s));
        }

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            provider: ProviderConfig {
                base_url: env::var("YAHOO_BASE_URL").unwrap_or(provider_defaults.base_url),
                timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(provider_defaults.timeout_secs),
                user_agent: env::var("PROVIDER_USER_AGENT").unwrap_or(provider_defaults.user_agent),
                symbol_aliases,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.provider.symbol_aliases.get("ES").map(String::as_str), Some("ES=F"));
        assert_eq!(config.provider.symbol_aliases.get("NQ").map(String::as_str), Some("NQ=F"));
    }

    #[test]
    fn test_parse_symbol_aliases() {
        let aliases = parse_symbol_aliases("ym|YM=F, cl | CL=F");
        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases["YM"], "YM=F");
        assert_eq!(aliases["CL"], "CL=F");
    }

    #[test]
    fn test_parse_symbol_aliases_skips_malformed() {
        let aliases = parse_symbol_aliases("GC,|X,SI|,HG|HG=F,");
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases["HG"], "HG=F");
    }
}
