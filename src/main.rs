// ============================================================================
// LazyCrypto - Point d'entrée
// ============================================================================
// Tableau de bord crypto dans le terminal : marché rafraîchi en continu,
// recommandations, fiche détaillée avec graphique live, watchlist.
//
// ARCHITECTURE :
// - Thread UI : possède App, dessine, lit le clavier
// - Thread poller : interroge le marché toutes les N secondes (provider.rs)
// - Thread worker : requêtes ponctuelles (fiche, historique, login)
// - Communication uniquement par channels mpsc : pas de Mutex sur App
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazycrypto::api::CoinGeckoClient;
use lazycrypto::app::{App, Inbox, Screen};
use lazycrypto::config::Config;
use lazycrypto::provider::{spawn_poller, PollResult};
use lazycrypto::storage::{FileStore, KeyValueStore, MemoryStore};
use lazycrypto::ui::{events::EventHandler, render, Event};
use lazycrypto::worker::{spawn_worker, AppCommand, AppResult, LoginSettings};

// ============================================================================
// Logging
// ============================================================================

/// Initialise le logging vers fichier
///
/// Les logs vont dans ./logs/lazycrypto.log (rotation quotidienne) :
/// stdout appartient au TUI.
///
/// ```bash
/// tail -f logs/lazycrypto.log
/// RUST_LOG=lazycrypto=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazycrypto.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour lazycrypto, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazycrypto=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée
// ============================================================================

fn main() -> Result<()> {
    // Logging avant tout le reste ; un échec n'empêche pas de démarrer
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyCrypto starting up");

    let config = Config::from_env();
    info!(
        api = %config.api_base_url,
        currency = %config.vs_currency,
        poll_secs = config.poll_interval.as_secs(),
        "Configuration loaded"
    );

    // Stockage local ; sans disque utilisable, les préférences restent en mémoire
    let store: Box<dyn KeyValueStore> = match FileStore::open(&config.data_dir) {
        Ok(store) => {
            info!(path = ?store.path(), "Using file storage");
            Box::new(store)
        }
        Err(e) => {
            warn!(error = ?e, "File storage unavailable, preferences will not persist");
            Box::new(MemoryStore::new())
        }
    };

    let client = CoinGeckoClient::new(&config)?;
    let mut app = App::new(store, config.chart_cap).with_currency(config.vs_currency.clone());

    // Channels : poller → UI, UI → worker, worker → UI
    let (poll_tx, poll_rx) = mpsc::channel::<PollResult>();
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning market poller and background worker");
    spawn_poller(client.clone(), config.poll_interval, poll_tx);
    spawn_worker(
        client,
        LoginSettings {
            userinfo_url: config.userinfo_url.clone(),
            access_token: config.access_token.clone(),
        },
        command_rx,
        result_tx,
    );

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, poll_rx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    // Les Receiver/Sender sont drop au retour de main : les threads s'arrêtent
    result
}

// ============================================================================
// Event loop
// ============================================================================

/// Boucle principale : résultats → rendu → entrée clavier
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    poll_rx: mpsc::Receiver<PollResult>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    let mut inbox = Inbox::new(poll_rx, result_rx);

    while app.is_running() {
        // 0. RÉSULTATS : vide les channels sans bloquer
        inbox.drain(app);

        // 1. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 2. INPUT
        match events.next() {
            Ok(event) => handle_event(app, event, command_tx),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Envoie une commande au worker
fn send_command(command_tx: &mpsc::Sender<AppCommand>, command: AppCommand) {
    if let Err(e) = command_tx.send(command) {
        error!(error = ?e, "Failed to send command to worker");
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement clavier selon l'écran courant
fn handle_event(app: &mut App, event: Event, command_tx: &mpsc::Sender<AppCommand>) {
    use lazycrypto::ui::events::{
        get_char_from_event, is_backspace_event, is_down_event, is_enter_event, is_escape_event,
        is_force_quit_event, is_login_event, is_next_range_event, is_previous_range_event,
        is_quit_event, is_search_event, is_space_event, is_tab_event, is_theme_event, is_up_event,
        is_watch_event, is_watchlist_event,
    };

    if matches!(event, Event::Tick) {
        return;
    }

    if is_force_quit_event(&event) {
        info!("Force quit requested");
        app.quit();
        return;
    }

    // Saisie de recherche : toutes les touches vont dans la requête
    if app.is_in_search() {
        if is_escape_event(&event) {
            app.cancel_search();
        } else if is_enter_event(&event) {
            debug!(query = %app.search_query, "Search submitted");
            app.submit_search();
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if let Some(c) = get_char_from_event(&event) {
            app.append_char(c);
        }
        return;
    }

    // Two-step quit
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            app.request_quit();
        }
        return;
    }
    if app.is_awaiting_quit_confirmation() {
        app.cancel_quit();
        return;
    }

    app.clear_status();

    // Touches globales
    if is_theme_event(&event) {
        app.toggle_theme();
        return;
    }
    if is_login_event(&event) {
        if let Some(command) = app.toggle_login() {
            send_command(command_tx, command);
        }
        return;
    }
    if is_watch_event(&event) {
        app.toggle_watch_selected();
        return;
    }

    match app.current_screen {
        Screen::Home => {
            if is_up_event(&event) {
                app.navigate_up();
            } else if is_down_event(&event) {
                app.navigate_down();
            } else if is_tab_event(&event) {
                app.toggle_focus();
            } else if is_enter_event(&event) {
                for command in app.open_selected() {
                    send_command(command_tx, command);
                }
            } else if is_search_event(&event) {
                app.start_search();
            } else if is_watchlist_event(&event) {
                app.open_watchlist();
            } else if is_escape_event(&event) && !app.search_query.is_empty() {
                app.cancel_search();
            }
        }

        Screen::CoinDetail => {
            if is_escape_event(&event) || is_space_event(&event) {
                app.close_detail();
            } else if is_next_range_event(&event) {
                if let Some(command) = app.next_range() {
                    send_command(command_tx, command);
                }
            } else if is_previous_range_event(&event) {
                if let Some(command) = app.previous_range() {
                    send_command(command_tx, command);
                }
            }
        }

        Screen::Watchlist => {
            if is_escape_event(&event) || is_space_event(&event) {
                app.show_home();
            } else if is_up_event(&event) {
                app.navigate_up();
            } else if is_down_event(&event) {
                app.navigate_down();
            } else if is_enter_event(&event) {
                for command in app.open_selected() {
                    send_command(command_tx, command);
                }
            }
        }

        // Traité plus haut
        Screen::Search => {}
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
