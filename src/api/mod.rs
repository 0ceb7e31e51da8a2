// ============================================================================
// Module : api
// ============================================================================
// Clients HTTP : données de marché (CoinGecko) et erreurs typées
// ============================================================================

pub mod coingecko; // Client API CoinGecko
pub mod error;     // Erreurs que l'UI doit distinguer

// Re-export des éléments principaux
pub use coingecko::{parse_market_chart, CoinGeckoClient};
pub use error::{is_not_found, ApiError};
