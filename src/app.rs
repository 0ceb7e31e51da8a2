// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// PATTERN : "Application State"
// - Tous les écrans lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Seul le thread UI possède App : les workers communiquent par messages
//
// Les méthodes qui nécessitent un appel réseau retournent les AppCommand
// à envoyer au worker au lieu de les envoyer elles-mêmes : App reste
// testable sans thread ni réseau.
// ============================================================================

use std::sync::mpsc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::auth::Session;
use crate::models::{ChartRange, ChartSeries, Coin, CoinDetails, Recommendation, Theme, Watchlist};
use crate::provider::{MarketState, PollResult};
use crate::storage::{self, KeyValueStore};
use crate::worker::{AppCommand, AppResult, DetailsOutcome};

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Liste du marché + recommandations
    Home,

    /// Fiche d'un coin + graphique
    CoinDetail,

    /// Coins suivis (nécessite une session)
    Watchlist,

    /// Saisie de la recherche (affichée par-dessus Home)
    Search,
}

/// Panneau actif sur l'écran Home
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeFocus {
    Market,
    Recommendations,
}

/// Fiche d'un coin en cours de chargement ou chargée
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(CoinDetails),
    NotFound,
}

/// État de l'écran détail
#[derive(Debug, Clone)]
pub struct DetailView {
    /// Identifiant du coin affiché
    pub coin_id: String,

    pub details: DetailState,

    pub chart: ChartSeries,

    /// true pendant le chargement de l'historique
    pub chart_loading: bool,

    /// Erreur du dernier chargement d'historique
    pub chart_error: Option<String>,

    /// Écran d'où l'on vient (pour le retour)
    pub back_to: Screen,
}

impl DetailView {
    /// Période actuellement sélectionnée
    pub fn range(&self) -> ChartRange {
        self.chart.range
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Snapshot de marché, erreur de poll, recommandations
    pub market: MarketState,

    /// Ids suivis, persistés après chaque modification
    pub watchlist: Watchlist,

    pub theme: Theme,

    pub session: Session,

    /// true pendant une tentative de connexion
    pub login_pending: bool,

    pub home_focus: HomeFocus,

    /// Index dans la liste filtrée du marché
    pub selected_index: usize,

    /// Index dans les recommandations
    pub recommendation_index: usize,

    /// Index dans l'écran watchlist
    pub watchlist_index: usize,

    /// Recherche active (filtre du tableau de marché)
    pub search_query: String,

    pub detail: Option<DetailView>,

    /// Message d'information affiché dans le footer
    pub status_message: Option<String>,

    /// Two-step quit : première pression de 'q' → true
    pub confirm_quit: bool,

    /// Devise d'affichage des prix (celle demandée à l'API)
    pub vs_currency: String,

    /// Taille maximale des séries du graphique
    chart_cap: usize,

    store: Box<dyn KeyValueStore>,
}

impl App {
    /// Crée l'application en lisant la watchlist et le thème dans le stockage
    pub fn new(store: Box<dyn KeyValueStore>, chart_cap: usize) -> Self {
        let watchlist = storage::load_watchlist(&*store);
        let theme = storage::load_theme(&*store);
        info!(watched = watchlist.len(), theme = %theme, "Local preferences loaded");

        Self {
            running: true,
            current_screen: Screen::Home,
            market: MarketState::new(),
            watchlist,
            theme,
            session: Session::default(),
            login_pending: false,
            home_focus: HomeFocus::Market,
            selected_index: 0,
            recommendation_index: 0,
            watchlist_index: 0,
            search_query: String::new(),
            detail: None,
            status_message: None,
            confirm_quit: false,
            vs_currency: "usd".to_string(),
            chart_cap,
            store,
        }
    }

    /// Devise des prix affichés
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.vs_currency = currency.into();
        self
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Données dérivées
    // ========================================================================

    /// Coins du marché après application de la recherche
    pub fn visible_coins(&self) -> Vec<&Coin> {
        crate::models::filter_coins(&self.market.coins, &self.search_query)
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.market.recommendations
    }

    /// Lignes de l'écran watchlist : (id, coin du snapshot s'il y est)
    pub fn watchlist_rows(&self) -> Vec<(&str, Option<&Coin>)> {
        self.watchlist
            .ids()
            .iter()
            .map(|id| (id.as_str(), self.market.find(id)))
            .collect()
    }

    /// Id du coin sous le curseur sur l'écran courant
    pub fn selected_coin_id(&self) -> Option<String> {
        match self.current_screen {
            Screen::Home | Screen::Search => match self.home_focus {
                HomeFocus::Market => self.visible_coins().get(self.selected_index).map(|c| c.id.clone()),
                HomeFocus::Recommendations => self
                    .market
                    .recommendations
                    .get(self.recommendation_index)
                    .map(|r| r.id.clone()),
            },
            Screen::Watchlist => self.watchlist.ids().get(self.watchlist_index).cloned(),
            Screen::CoinDetail => self.detail.as_ref().map(|d| d.coin_id.clone()),
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Nombre de lignes de la liste active
    fn active_len(&self) -> usize {
        match (self.current_screen, self.home_focus) {
            (Screen::Watchlist, _) => self.watchlist.len(),
            (_, HomeFocus::Recommendations) => self.market.recommendations.len(),
            (_, HomeFocus::Market) => self.visible_coins().len(),
        }
    }

    fn active_index_mut(&mut self) -> &mut usize {
        match (self.current_screen, self.home_focus) {
            (Screen::Watchlist, _) => &mut self.watchlist_index,
            (_, HomeFocus::Recommendations) => &mut self.recommendation_index,
            (_, HomeFocus::Market) => &mut self.selected_index,
        }
    }

    /// Navigue vers le haut dans la liste active
    pub fn navigate_up(&mut self) {
        let index = self.active_index_mut();
        *index = index.saturating_sub(1);
    }

    /// Navigue vers le bas dans la liste active
    pub fn navigate_down(&mut self) {
        let max_index = self.active_len().saturating_sub(1);
        let index = self.active_index_mut();
        *index = (*index + 1).min(max_index);
    }

    /// Ramène les curseurs dans les bornes après un changement de données
    fn clamp_selection(&mut self) {
        let visible = self.visible_coins().len();
        self.selected_index = self.selected_index.min(visible.saturating_sub(1));
        self.recommendation_index = self
            .recommendation_index
            .min(self.market.recommendations.len().saturating_sub(1));
        self.watchlist_index = self.watchlist_index.min(self.watchlist.len().saturating_sub(1));
    }

    /// Bascule le focus marché ↔ recommandations
    pub fn toggle_focus(&mut self) {
        self.home_focus = match self.home_focus {
            HomeFocus::Market => HomeFocus::Recommendations,
            HomeFocus::Recommendations => HomeFocus::Market,
        };
    }

    pub fn is_on_home(&self) -> bool {
        self.current_screen == Screen::Home
    }

    pub fn is_on_detail(&self) -> bool {
        self.current_screen == Screen::CoinDetail
    }

    pub fn is_on_watchlist(&self) -> bool {
        self.current_screen == Screen::Watchlist
    }

    pub fn is_in_search(&self) -> bool {
        self.current_screen == Screen::Search
    }

    /// Ouvre la fiche du coin sélectionné
    ///
    /// Retourne les commandes à envoyer au worker (fiche + historique).
    pub fn open_selected(&mut self) -> Vec<AppCommand> {
        match self.selected_coin_id() {
            Some(id) => self.open_detail(id),
            None => Vec::new(),
        }
    }

    /// Ouvre la fiche d'un coin
    pub fn open_detail(&mut self, id: String) -> Vec<AppCommand> {
        let range = ChartRange::default();
        info!(coin = %id, "Opening coin detail");

        let back_to = match self.current_screen {
            Screen::Watchlist => Screen::Watchlist,
            _ => Screen::Home,
        };

        self.detail = Some(DetailView {
            coin_id: id.clone(),
            details: DetailState::Loading,
            chart: ChartSeries::new(id.clone(), range, self.chart_cap),
            chart_loading: true,
            chart_error: None,
            back_to,
        });
        self.current_screen = Screen::CoinDetail;

        vec![
            AppCommand::LoadDetails { id: id.clone() },
            AppCommand::LoadHistory { id, range },
        ]
    }

    /// Quitte la fiche et retourne à l'écran précédent
    pub fn close_detail(&mut self) {
        let back_to = self.detail.take().map(|d| d.back_to).unwrap_or(Screen::Home);
        self.current_screen = back_to;
    }

    /// Retour à l'écran Home
    pub fn show_home(&mut self) {
        self.current_screen = Screen::Home;
    }

    /// Ouvre l'écran watchlist (session requise)
    pub fn open_watchlist(&mut self) {
        if !self.session.is_authenticated() {
            info!("Watchlist requested while anonymous, staying on home");
            self.status_message = Some("Connectez-vous ([L]) pour voir votre watchlist".to_string());
            self.current_screen = Screen::Home;
            return;
        }

        self.watchlist_index = self.watchlist_index.min(self.watchlist.len().saturating_sub(1));
        self.current_screen = Screen::Watchlist;
    }

    /// Change la période du graphique ; l'historique est rechargé entièrement
    fn change_range(&mut self, next: bool) -> Option<AppCommand> {
        let detail = self.detail.as_mut()?;
        let range = if next { detail.range().next() } else { detail.range().previous() };

        detail.chart = ChartSeries::new(detail.coin_id.clone(), range, self.chart_cap);
        detail.chart_loading = true;
        detail.chart_error = None;

        info!(coin = %detail.coin_id, range = range.label(), "Chart range changed");
        Some(AppCommand::LoadHistory {
            id: detail.coin_id.clone(),
            range,
        })
    }

    pub fn next_range(&mut self) -> Option<AppCommand> {
        self.change_range(true)
    }

    pub fn previous_range(&mut self) -> Option<AppCommand> {
        self.change_range(false)
    }

    // ========================================================================
    // Watchlist
    // ========================================================================

    /// Ajoute / retire le coin sélectionné de la watchlist
    ///
    /// Depuis la fiche, une session est requise.
    pub fn toggle_watch_selected(&mut self) {
        if self.is_on_detail() && !self.session.is_authenticated() {
            self.status_message = Some("Connectez-vous pour ajouter à la watchlist".to_string());
            return;
        }

        if let Some(id) = self.selected_coin_id() {
            self.toggle_watch(&id);
        }
    }

    /// Ajoute / retire un id et persiste la watchlist
    pub fn toggle_watch(&mut self, id: &str) {
        let watched = self.watchlist.toggle(id);
        info!(coin = %id, watched, "Watchlist toggled");

        self.status_message = Some(if watched {
            format!("{} ajouté à la watchlist", id)
        } else {
            format!("{} retiré de la watchlist", id)
        });

        self.persist_watchlist();
        self.clamp_selection();
    }

    fn persist_watchlist(&mut self) {
        if let Err(e) = storage::save_watchlist(&mut *self.store, &self.watchlist) {
            warn!(error = ?e, "Failed to persist watchlist");
        }
    }

    pub fn is_watched(&self, id: &str) -> bool {
        self.watchlist.contains(id)
    }

    // ========================================================================
    // Thème et session
    // ========================================================================

    /// Bascule le thème et le persiste
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        info!(theme = %self.theme, "Theme toggled");

        if let Err(e) = storage::save_theme(&mut *self.store, self.theme) {
            warn!(error = ?e, "Failed to persist theme");
        }
    }

    /// Connexion si anonyme, déconnexion sinon
    ///
    /// Retourne la commande de connexion à envoyer au worker.
    pub fn toggle_login(&mut self) -> Option<AppCommand> {
        if self.session.is_authenticated() {
            info!("User logged out");
            self.session.logout();
            if self.is_on_watchlist() {
                self.current_screen = Screen::Home;
            }
            self.status_message = Some("Déconnecté".to_string());
            return None;
        }

        if self.login_pending {
            return None;
        }

        self.login_pending = true;
        self.status_message = Some("Connexion en cours...".to_string());
        Some(AppCommand::Login)
    }

    // ========================================================================
    // Recherche
    // ========================================================================

    /// Entre en mode recherche (le filtre s'applique pendant la saisie)
    pub fn start_search(&mut self) {
        self.current_screen = Screen::Search;
        self.home_focus = HomeFocus::Market;
    }

    pub fn append_char(&mut self, c: char) {
        self.search_query.push(c);
        self.selected_index = 0;
    }

    pub fn backspace(&mut self) {
        self.search_query.pop();
        self.selected_index = 0;
    }

    /// Valide la recherche : le filtre reste actif
    pub fn submit_search(&mut self) {
        self.current_screen = Screen::Home;
        self.clamp_selection();
    }

    /// Annule la recherche : le filtre est vidé
    pub fn cancel_search(&mut self) {
        self.search_query.clear();
        self.current_screen = Screen::Home;
        self.clamp_selection();
    }

    // ========================================================================
    // Two-step quit
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    // ========================================================================
    // Résultats des threads
    // ========================================================================

    /// Applique un résultat de poll
    ///
    /// Si une fiche est ouverte, le dernier prix du coin est ajouté au
    /// graphique quand il a changé.
    pub fn apply_poll(&mut self, result: PollResult) {
        let replaced = self.market.apply(result);
        if !replaced {
            return;
        }

        if let Some(detail) = self.detail.as_mut() {
            // Pas d'ajout live pendant le chargement : l'historique va tout remplacer
            if !detail.chart_loading {
                if let Some(coin) = self.market.coins.iter().find(|c| c.id == detail.coin_id) {
                    let timestamp = self.market.last_updated.unwrap_or_else(Utc::now);
                    if detail.chart.append_live(timestamp, coin.current_price) {
                        debug!(coin = %coin.id, price = coin.current_price, "Live price appended to chart");
                    }
                }
            }
        }

        self.clamp_selection();
    }

    /// Applique un résultat du worker
    ///
    /// Les réponses pour un coin ou une période qui ne sont plus affichés
    /// sont ignorées.
    pub fn handle_result(&mut self, result: AppResult) {
        match result {
            AppResult::DetailsLoaded { id, outcome } => match self.detail.as_mut() {
                Some(detail) if detail.coin_id == id => {
                    detail.details = match outcome {
                        DetailsOutcome::Loaded(details) => DetailState::Loaded(details),
                        DetailsOutcome::NotFound => DetailState::NotFound,
                    };
                }
                _ => debug!(coin = %id, "Discarding stale coin details"),
            },

            AppResult::HistoryLoaded { id, range, points } => match self.detail.as_mut() {
                Some(detail) if detail.coin_id == id && detail.range() == range => {
                    detail.chart_loading = false;
                    match points {
                        Ok(points) => {
                            detail.chart.replace_history(range, points);
                            detail.chart_error = None;
                        }
                        Err(error) => detail.chart_error = Some(error),
                    }
                }
                _ => debug!(coin = %id, days = range.days(), "Discarding stale price history"),
            },

            AppResult::LoginFinished(result) => {
                self.login_pending = false;
                match result {
                    Ok(profile) => {
                        self.status_message = Some(format!("Connecté : {}", profile.display_name()));
                        self.session.login(profile);
                    }
                    Err(error) => {
                        self.status_message = Some(format!("Échec de la connexion : {}", error));
                    }
                }
            }
        }
    }
}

// ============================================================================
// Inbox : réception des messages des threads
// ============================================================================

/// Receivers du poller et du worker, vidés à chaque tour de l'event loop
///
/// Un channel déconnecté n'est plus interrogé : la déconnexion est
/// loggée une seule fois.
pub struct Inbox {
    poll_rx: mpsc::Receiver<PollResult>,
    result_rx: mpsc::Receiver<AppResult>,
    poller_alive: bool,
    worker_alive: bool,
}

impl Inbox {
    pub fn new(poll_rx: mpsc::Receiver<PollResult>, result_rx: mpsc::Receiver<AppResult>) -> Self {
        Self {
            poll_rx,
            result_rx,
            poller_alive: true,
            worker_alive: true,
        }
    }

    pub fn poller_alive(&self) -> bool {
        self.poller_alive
    }

    pub fn worker_alive(&self) -> bool {
        self.worker_alive
    }

    /// Applique tous les messages en attente sans bloquer
    ///
    /// Retourne le nombre de messages appliqués.
    pub fn drain(&mut self, app: &mut App) -> usize {
        let mut applied = 0;

        while self.poller_alive {
            match self.poll_rx.try_recv() {
                Ok(result) => {
                    app.apply_poll(result);
                    applied += 1;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Market poller disconnected!");
                    self.poller_alive = false;
                }
            }
        }

        while self.worker_alive {
            match self.result_rx.try_recv() {
                Ok(result) => {
                    app.handle_result(result);
                    applied += 1;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    self.worker_alive = false;
                }
            }
        }

        applied
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserProfile;
    use crate::models::PricePoint;
    use crate::storage::MemoryStore;

    fn coin(id: &str, price: f64, change: f64) -> Coin {
        Coin::new(id, &id[..3.min(id.len())], id, price, Some(change), 1e10)
    }

    fn app_with_coins() -> App {
        let mut app = App::new(Box::new(MemoryStore::new()), 100);
        app.apply_poll(PollResult::Snapshot {
            coins: vec![
                coin("bitcoin", 60000.0, -6.0),
                coin("ethereum", 3000.0, 1.0),
                coin("solana", 150.0, 9.0),
            ],
            fetched_at: Utc::now(),
        });
        app
    }

    fn profile() -> UserProfile {
        UserProfile {
            sub: "1".to_string(),
            name: "Ada".to_string(),
            email: String::new(),
            picture: None,
        }
    }

    #[test]
    fn test_app_creation() {
        let app = App::new(Box::new(MemoryStore::new()), 100);
        assert!(app.is_running());
        assert!(app.market.loading);
        assert!(app.watchlist.is_empty());
        assert_eq!(app.theme, Theme::Dark);
        assert_eq!(app.current_screen, Screen::Home);
    }

    #[test]
    fn test_preferences_loaded_from_store() {
        let mut store = MemoryStore::new();
        storage::save_watchlist(&mut store, &Watchlist::from_ids(["bitcoin"])).unwrap();
        storage::save_theme(&mut store, Theme::Light).unwrap();

        let app = App::new(Box::new(store), 100);
        assert!(app.is_watched("bitcoin"));
        assert_eq!(app.theme, Theme::Light);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut app = app_with_coins();
        assert_eq!(app.selected_index, 0);

        app.navigate_down();
        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_index, 2);

        app.navigate_up();
        assert_eq!(app.selected_coin_id().as_deref(), Some("ethereum"));

        app.navigate_up();
        app.navigate_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_focus_recommendations() {
        let mut app = app_with_coins();
        app.toggle_focus();
        assert_eq!(app.home_focus, HomeFocus::Recommendations);

        // Bitcoin a chuté de 6% : meilleur score
        assert_eq!(app.selected_coin_id().as_deref(), Some("bitcoin"));
    }

    #[test]
    fn test_search_filters_market() {
        let mut app = app_with_coins();
        app.start_search();
        for c in "ETH".chars() {
            app.append_char(c);
        }
        assert_eq!(app.visible_coins().len(), 1);
        app.submit_search();
        assert_eq!(app.selected_coin_id().as_deref(), Some("ethereum"));

        app.start_search();
        app.cancel_search();
        assert_eq!(app.visible_coins().len(), 3);
    }

    #[test]
    fn test_toggle_watch_from_home_persists() {
        let mut app = app_with_coins();
        app.toggle_watch_selected();
        assert!(app.is_watched("bitcoin"));

        let stored = storage::load_watchlist(&*app.store);
        assert!(stored.contains("bitcoin"));

        app.toggle_watch_selected();
        assert!(!app.is_watched("bitcoin"));
        assert!(storage::load_watchlist(&*app.store).is_empty());
    }

    #[test]
    fn test_watchlist_screen_requires_login() {
        let mut app = app_with_coins();
        app.open_watchlist();
        assert_eq!(app.current_screen, Screen::Home);
        assert!(app.status_message.is_some());

        app.session.login(profile());
        app.open_watchlist();
        assert_eq!(app.current_screen, Screen::Watchlist);

        // Déconnexion depuis la watchlist : retour à Home
        assert_eq!(app.toggle_login(), None);
        assert_eq!(app.current_screen, Screen::Home);
    }

    #[test]
    fn test_watchlist_rows_join_snapshot() {
        let mut app = app_with_coins();
        app.toggle_watch("ethereum");
        app.toggle_watch("delisted");

        let rows = app.watchlist_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1.map(|c| c.current_price), Some(3000.0));
        assert!(rows[1].1.is_none());
    }

    #[test]
    fn test_detail_toggle_requires_login() {
        let mut app = app_with_coins();
        app.open_selected();
        app.toggle_watch_selected();
        assert!(!app.is_watched("bitcoin"));

        app.session.login(profile());
        app.toggle_watch_selected();
        assert!(app.is_watched("bitcoin"));
    }

    #[test]
    fn test_open_detail_requests_details_and_history() {
        let mut app = app_with_coins();
        let commands = app.open_selected();

        assert_eq!(
            commands,
            vec![
                AppCommand::LoadDetails { id: "bitcoin".to_string() },
                AppCommand::LoadHistory {
                    id: "bitcoin".to_string(),
                    range: ChartRange::OneMonth
                },
            ]
        );
        assert!(app.is_on_detail());

        app.close_detail();
        assert!(app.is_on_home());
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_stale_history_is_discarded() {
        let mut app = app_with_coins();
        app.open_selected();
        let command = app.next_range();
        assert_eq!(
            command,
            Some(AppCommand::LoadHistory {
                id: "bitcoin".to_string(),
                range: ChartRange::ThreeMonths
            })
        );

        // Réponse pour l'ancienne période : ignorée
        app.handle_result(AppResult::HistoryLoaded {
            id: "bitcoin".to_string(),
            range: ChartRange::OneMonth,
            points: Ok(vec![PricePoint::historical(Utc::now(), 1.0)]),
        });
        let detail = app.detail.as_ref().unwrap();
        assert!(detail.chart_loading);
        assert!(detail.chart.is_empty());

        app.handle_result(AppResult::HistoryLoaded {
            id: "bitcoin".to_string(),
            range: ChartRange::ThreeMonths,
            points: Ok(vec![PricePoint::historical(Utc::now(), 59000.0)]),
        });
        let detail = app.detail.as_ref().unwrap();
        assert!(!detail.chart_loading);
        assert_eq!(detail.chart.len(), 1);
    }

    #[test]
    fn test_live_prices_appended_to_open_chart() {
        let mut app = app_with_coins();
        app.open_selected();
        app.handle_result(AppResult::HistoryLoaded {
            id: "bitcoin".to_string(),
            range: ChartRange::OneMonth,
            points: Ok(vec![PricePoint::historical(Utc::now(), 60000.0)]),
        });

        let poll = |price: f64| PollResult::Snapshot {
            coins: vec![coin("bitcoin", price, -1.0)],
            fetched_at: Utc::now(),
        };

        // Prix identique au dernier point : rien n'est ajouté
        app.apply_poll(poll(60000.0));
        assert_eq!(app.detail.as_ref().unwrap().chart.len(), 1);

        app.apply_poll(poll(60100.0));
        app.apply_poll(poll(60200.0));
        assert_eq!(app.detail.as_ref().unwrap().chart.len(), 3);

        // Un poll en échec n'ajoute rien
        app.apply_poll(PollResult::Failed { error: "boom".to_string() });
        assert_eq!(app.detail.as_ref().unwrap().chart.len(), 3);
    }

    #[test]
    fn test_details_not_found() {
        let mut app = app_with_coins();
        app.open_detail("nope".to_string());
        app.handle_result(AppResult::DetailsLoaded {
            id: "nope".to_string(),
            outcome: DetailsOutcome::NotFound,
        });
        assert_eq!(app.detail.as_ref().unwrap().details, DetailState::NotFound);
    }

    #[test]
    fn test_login_flow() {
        let mut app = app_with_coins();
        assert_eq!(app.toggle_login(), Some(AppCommand::Login));
        // Pas de deuxième tentative tant que la première n'est pas terminée
        assert_eq!(app.toggle_login(), None);

        app.handle_result(AppResult::LoginFinished(Err("HTTP 401".to_string())));
        assert!(!app.session.is_authenticated());
        assert!(!app.login_pending);

        assert_eq!(app.toggle_login(), Some(AppCommand::Login));
        app.handle_result(AppResult::LoginFinished(Ok(profile())));
        assert!(app.session.is_authenticated());
    }

    #[test]
    fn test_toggle_theme_persists() {
        let mut app = app_with_coins();
        app.toggle_theme();
        assert_eq!(app.theme, Theme::Light);
        assert_eq!(storage::load_theme(&*app.store), Theme::Light);
    }

    #[test]
    fn test_inbox_stops_polling_disconnected_channels() {
        let mut app = App::new(Box::new(MemoryStore::new()), 100);
        let (poll_tx, poll_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel::<AppResult>();
        let mut inbox = Inbox::new(poll_rx, result_rx);

        poll_tx
            .send(PollResult::Snapshot {
                coins: vec![coin("bitcoin", 60000.0, -6.0)],
                fetched_at: Utc::now(),
            })
            .unwrap();
        assert_eq!(inbox.drain(&mut app), 1);
        assert!(inbox.poller_alive());
        assert_eq!(app.market.coins.len(), 1);

        // Les messages déjà envoyés sont appliqués avant la déconnexion
        poll_tx
            .send(PollResult::Failed {
                error: "HTTP 429".to_string(),
            })
            .unwrap();
        drop(poll_tx);
        drop(result_tx);

        assert_eq!(inbox.drain(&mut app), 1);
        assert!(!inbox.poller_alive());
        assert!(!inbox.worker_alive());
        assert_eq!(app.market.error.as_deref(), Some("HTTP 429"));

        // Tours suivants : plus rien à lire, plus rien à logger
        assert_eq!(inbox.drain(&mut app), 0);
        assert!(!inbox.poller_alive());
    }
}
