// ============================================================================
// LazyCrypto - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;      // Client CoinGecko
pub mod app;      // État de l'application
pub mod auth;     // Session et profil utilisateur
pub mod config;   // Configuration par variables d'environnement
pub mod models;   // Structures de données
pub mod provider; // Polling du marché
pub mod storage;  // Persistance locale (watchlist, thème)
pub mod ui;       // Interface utilisateur
pub mod worker;   // Requêtes ponctuelles en arrière-plan
