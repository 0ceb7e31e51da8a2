// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : snapshot de marché,
// recommandations, série du graphique, watchlist et thème
// ============================================================================

pub mod chart_series;   // Série de prix bornée (historique + live)
pub mod coin;           // Coin (snapshot) et CoinDetails (fiche)
pub mod recommendation; // Heuristique Buy / Hold / Take Profit
pub mod theme;          // Préférence clair / sombre
pub mod watchlist;      // Ensemble ordonné d'ids suivis

// Re-export des structures principales
// Au lieu de : use lazycrypto::models::coin::Coin;
// On peut faire : use lazycrypto::models::Coin;
pub use chart_series::{ChartRange, ChartSeries, PricePoint, DEFAULT_SERIES_CAP};
pub use coin::{filter_coins, Coin, CoinDetails};
pub use recommendation::{compute_recommendations, Action, Recommendation};
pub use theme::{Palette, Theme};
pub use watchlist::Watchlist;
