// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod format;    // Formatage des prix et montants
pub mod layout;    // Header, footer, blocs communs
pub mod home;      // Recommandations + marché
pub mod detail;    // Fiche + graphique
pub mod watchlist; // Coins suivis

use ratatui::Frame;

use crate::app::{App, Screen};

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};

/// Dessine l'écran courant
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit l'exhaustivité (tous les écrans gérés)
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Home | Screen::Search => home::render(frame, app),
        Screen::CoinDetail => detail::render(frame, app),
        Screen::Watchlist => watchlist::render(frame, app),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::auth::UserProfile;
    use crate::models::{Coin, CoinDetails, PricePoint};
    use crate::provider::PollResult;
    use crate::storage::MemoryStore;
    use crate::worker::{AppResult, DetailsOutcome};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn app_with_market() -> App {
        let mut app = App::new(Box::new(MemoryStore::new()), 100);
        app.apply_poll(PollResult::Snapshot {
            coins: vec![
                Coin::new("bitcoin", "btc", "Bitcoin", 64000.0, Some(-6.0), 1.2e12),
                Coin::new("ethereum", "eth", "Ethereum", 3100.0, Some(9.0), 3.7e11),
            ],
            fetched_at: Utc::now(),
        });
        app
    }

    #[test]
    fn test_home_shows_market_and_recommendations() {
        let app = app_with_market();
        let screen = draw(&app);

        assert!(screen.contains("BTC"));
        assert!(screen.contains("Ethereum"));
        assert!(screen.contains("Buy"));
    }

    #[test]
    fn test_home_loading_state() {
        let app = App::new(Box::new(MemoryStore::new()), 100);
        assert!(draw(&app).contains("Chargement des cours"));
    }

    #[test]
    fn test_detail_screen_with_chart() {
        let mut app = app_with_market();
        app.open_detail("bitcoin".to_string());
        assert!(draw(&app).contains("Chargement de bitcoin"));

        let range = app.detail.as_ref().unwrap().range();
        app.handle_result(AppResult::HistoryLoaded {
            id: "bitcoin".to_string(),
            range,
            points: Ok(vec![
                PricePoint::historical(Utc::now(), 63000.0),
                PricePoint::historical(Utc::now(), 64000.0),
            ]),
        });
        app.handle_result(AppResult::DetailsLoaded {
            id: "bitcoin".to_string(),
            outcome: DetailsOutcome::Loaded(CoinDetails {
                id: "bitcoin".to_string(),
                name: "Bitcoin".to_string(),
                symbol: "btc".to_string(),
                image: String::new(),
                market_cap_rank: Some(1),
                current_price: 64000.0,
                price_change_percentage_24h: Some(-6.0),
                market_cap: 1.2e12,
                total_volume: 3.0e10,
                high_24h: 65000.0,
                low_24h: 62000.0,
                description: "Peer-to-peer cash".to_string(),
            }),
        });

        let screen = draw(&app);
        assert!(screen.contains("#1 Bitcoin (BTC)"));
        assert!(screen.contains("Peer-to-peer cash"));
        assert!(screen.contains("30d"));
    }

    #[test]
    fn test_detail_not_found_state() {
        let mut app = app_with_market();
        app.open_detail("nope".to_string());
        app.handle_result(AppResult::DetailsLoaded {
            id: "nope".to_string(),
            outcome: DetailsOutcome::NotFound,
        });

        assert!(draw(&app).contains("Coin introuvable"));
    }

    #[test]
    fn test_watchlist_screen_empty_state() {
        let mut app = app_with_market();
        app.session.login(UserProfile {
            sub: "1".to_string(),
            name: "Ada".to_string(),
            email: String::new(),
            picture: None,
        });
        app.open_watchlist();

        assert!(draw(&app).contains("Watchlist vide"));
    }

    /// Marché de 100 coins ; la market cap croît avec l'index pour que les
    /// recommandations ne montrent que la fin de la liste
    fn app_with_large_market() -> App {
        let mut app = App::new(Box::new(MemoryStore::new()), 100);
        let coins = (0..100)
            .map(|i| {
                Coin::new(
                    format!("coin{:03}", i),
                    format!("c{:03}", i),
                    format!("Zname{:03}", i),
                    100.0,
                    Some(0.0),
                    1e9 * (i + 1) as f64,
                )
            })
            .collect();
        app.apply_poll(PollResult::Snapshot {
            coins,
            fetched_at: Utc::now(),
        });
        app
    }

    #[test]
    fn test_market_table_scrolls_to_selection() {
        let mut app = app_with_large_market();
        for _ in 0..60 {
            app.navigate_down();
        }
        assert_eq!(app.selected_coin_id().as_deref(), Some("coin060"));

        let screen = draw(&app);
        assert!(screen.contains("Zname060"));
        // Le haut du tableau a défilé hors de la zone visible
        assert!(!screen.contains("Zname000"));
    }

    #[test]
    fn test_watchlist_scrolls_to_selection() {
        let mut app = app_with_large_market();
        for i in 0..60 {
            app.toggle_watch(&format!("coin{:03}", i));
        }
        app.session.login(UserProfile {
            sub: "1".to_string(),
            name: "Ada".to_string(),
            email: String::new(),
            picture: None,
        });
        app.open_watchlist();
        for _ in 0..55 {
            app.navigate_down();
        }
        app.clear_status();

        let screen = draw(&app);
        assert!(screen.contains("Zname055"));
        assert!(!screen.contains("Zname000"));
    }
}
