// ============================================================================
// Module : config
// ============================================================================
// Configuration de l'application : valeurs par défaut, surchargées par
// un fichier .env puis par les variables d'environnement LAZYCRYPTO_*
//
// CONCEPTS RUST :
// 1. Default : une configuration complète sans aucune variable
// 2. FromStr générique : parse_var::<u64>, parse_var::<usize>
// 3. Dégradation : une valeur invalide est ignorée avec un warning
// ============================================================================

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::models::DEFAULT_SERIES_CAP;

/// URL de base de l'API CoinGecko v3
pub const DEFAULT_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Endpoint userinfo du fournisseur d'identité
pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Configuration de l'application
#[derive(Debug, Clone)]
pub struct Config {
    /// URL de base de l'API de marché
    pub api_base_url: String,

    /// Devise de référence (ex: "usd")
    pub vs_currency: String,

    /// Nombre de coins par page du listing
    pub per_page: u32,

    /// Intervalle entre deux polls
    pub poll_interval: Duration,

    /// Taille maximale de la série du graphique
    pub chart_cap: usize,

    /// Répertoire du fichier de stockage local
    pub data_dir: PathBuf,

    /// Endpoint userinfo (profil de l'utilisateur)
    pub userinfo_url: String,

    /// Token d'accès déjà émis par le fournisseur d'identité
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            vs_currency: "usd".to_string(),
            per_page: 100,
            poll_interval: Duration::from_secs(10),
            chart_cap: DEFAULT_SERIES_CAP,
            data_dir: default_data_dir(),
            userinfo_url: DEFAULT_USERINFO_URL.to_string(),
            access_token: None,
        }
    }
}

/// Répertoire de données par défaut
///
/// - Linux : ~/.local/share/lazycrypto
/// - macOS : ~/Library/Application Support/lazycrypto
/// - Windows : C:\Users\<user>\AppData\Roaming\lazycrypto
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lazycrypto")
}

impl Config {
    /// Charge la configuration depuis .env et l'environnement
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(_) => debug!("No .env file found"),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration depuis une fonction de lecture des variables
    ///
    /// Séparé de from_env() pour tester sans toucher à l'environnement du process.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let poll_secs = parse_var(&lookup, "LAZYCRYPTO_POLL_SECS", defaults.poll_interval.as_secs())
            .max(1);

        Self {
            api_base_url: text("LAZYCRYPTO_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            vs_currency: text("LAZYCRYPTO_VS_CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or(defaults.vs_currency),
            per_page: parse_var(&lookup, "LAZYCRYPTO_PER_PAGE", defaults.per_page).clamp(1, 250),
            poll_interval: Duration::from_secs(poll_secs),
            chart_cap: parse_var(&lookup, "LAZYCRYPTO_CHART_CAP", defaults.chart_cap).max(1),
            data_dir: text("LAZYCRYPTO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            userinfo_url: text("LAZYCRYPTO_USERINFO_URL").unwrap_or(defaults.userinfo_url),
            access_token: text("LAZYCRYPTO_GOOGLE_ACCESS_TOKEN"),
        }
    }
}

/// Lit une variable numérique, ou la valeur par défaut si absente ou invalide
fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.vs_currency, "usd");
        assert_eq!(config.per_page, 100);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.chart_cap, 1000);
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("LAZYCRYPTO_API_BASE_URL", "http://localhost:8080/api/"),
            ("LAZYCRYPTO_VS_CURRENCY", "EUR"),
            ("LAZYCRYPTO_POLL_SECS", "30"),
            ("LAZYCRYPTO_CHART_CAP", "200"),
            ("LAZYCRYPTO_DATA_DIR", "/tmp/lazycrypto"),
            ("LAZYCRYPTO_GOOGLE_ACCESS_TOKEN", "ya29.token"),
        ]);

        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.vs_currency, "eur");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.chart_cap, 200);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/lazycrypto"));
        assert_eq!(config.access_token.as_deref(), Some("ya29.token"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("LAZYCRYPTO_POLL_SECS", "fast"),
            ("LAZYCRYPTO_PER_PAGE", "-3"),
            ("LAZYCRYPTO_CHART_CAP", "0"),
            ("LAZYCRYPTO_GOOGLE_ACCESS_TOKEN", "   "),
        ]);

        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.per_page, 100);
        assert_eq!(config.chart_cap, 1);
        assert!(config.access_token.is_none());
    }
}
