// ============================================================================
// Module : worker
// ============================================================================
// Worker thread pour les requêtes ponctuelles déclenchées par l'utilisateur
// (fiche d'un coin, historique du graphique, connexion)
//
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des AppCommand au worker
// - Le worker exécute les tâches async et renvoie des AppResult
// - Le polling du marché a son propre thread (voir provider.rs)
// ============================================================================

use std::sync::mpsc;
use std::thread::JoinHandle;

use tracing::{error, info};

use crate::api::{is_not_found, CoinGeckoClient};
use crate::auth::{fetch_profile, UserProfile};
use crate::models::{ChartRange, CoinDetails, PricePoint};

/// Commandes envoyées au worker thread
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Charger la fiche d'un coin
    LoadDetails { id: String },

    /// Charger l'historique des prix d'un coin pour une période
    LoadHistory { id: String, range: ChartRange },

    /// Échanger le token configuré contre un profil utilisateur
    Login,
}

/// Issue du chargement d'une fiche
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsOutcome {
    Loaded(CoinDetails),
    NotFound,
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
pub enum AppResult {
    DetailsLoaded {
        id: String,
        outcome: DetailsOutcome,
    },

    HistoryLoaded {
        id: String,
        range: ChartRange,
        points: Result<Vec<PricePoint>, String>,
    },

    LoginFinished(Result<UserProfile, String>),
}

/// Paramètres de connexion passés au worker
#[derive(Debug, Clone)]
pub struct LoginSettings {
    pub userinfo_url: String,
    pub access_token: Option<String>,
}

/// Lance le worker thread
///
/// Le thread s'arrête quand le Sender des commandes est drop.
pub fn spawn_worker(
    client: CoinGeckoClient,
    login: LoginSettings,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create worker runtime");
                return;
            }
        };

        // Boucle de traitement des commandes
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");
            let result = runtime.block_on(execute(&client, &login, command));

            if result_tx.send(result).is_err() {
                break;
            }
        }

        info!("Worker thread exiting (channel closed)");
    })
}

/// Exécute une commande et construit le résultat
async fn execute(client: &CoinGeckoClient, login: &LoginSettings, command: AppCommand) -> AppResult {
    match command {
        AppCommand::LoadDetails { id } => {
            let outcome = match client.fetch_coin_details(&id).await {
                Ok(details) => DetailsOutcome::Loaded(details),
                Err(e) => {
                    // Toute erreur finit en "not found" ; on distingue seulement dans les logs
                    if is_not_found(&e) {
                        info!(coin = %id, "Coin details not found");
                    } else {
                        error!(coin = %id, error = ?e, "Failed to load coin details");
                    }
                    DetailsOutcome::NotFound
                }
            };
            AppResult::DetailsLoaded { id, outcome }
        }

        AppCommand::LoadHistory { id, range } => {
            let points = client.fetch_market_chart(&id, range).await.map_err(|e| {
                error!(coin = %id, days = range.days(), error = ?e, "Failed to load price history");
                format!("{:#}", e)
            });
            AppResult::HistoryLoaded { id, range, points }
        }

        AppCommand::Login => {
            let result = match &login.access_token {
                Some(token) => fetch_profile(&login.userinfo_url, token)
                    .await
                    .map_err(|e| {
                        error!(error = ?e, "Login failed");
                        format!("{:#}", e)
                    }),
                None => {
                    error!("Login failed: no access token configured");
                    Err("LAZYCRYPTO_GOOGLE_ACCESS_TOKEN non configuré".to_string())
                }
            };
            AppResult::LoginFinished(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let client = CoinGeckoClient::new(&Config::default()).unwrap();
        let login = LoginSettings {
            userinfo_url: "http://127.0.0.1:9/userinfo".to_string(),
            access_token: None,
        };

        match execute(&client, &login, AppCommand::Login).await {
            AppResult::LoginFinished(Err(msg)) => assert!(msg.contains("LAZYCRYPTO_GOOGLE_ACCESS_TOKEN")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_details_end_as_not_found() {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let client = CoinGeckoClient::new(&config).unwrap();
        let login = LoginSettings {
            userinfo_url: String::new(),
            access_token: None,
        };

        let result = execute(&client, &login, AppCommand::LoadDetails { id: "bitcoin".to_string() }).await;
        match result {
            AppResult::DetailsLoaded { id, outcome } => {
                assert_eq!(id, "bitcoin");
                assert_eq!(outcome, DetailsOutcome::NotFound);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
