// ============================================================================
// Module : provider
// ============================================================================
// Fournisseur de données de marché
//
// 1. Un thread de polling interroge /coins/markets toutes les 10 secondes
// 2. Chaque résultat est envoyé au thread UI via un channel mpsc
// 3. Le thread UI applique le résultat à MarketState
//
// CONCEPTS RUST :
// 1. Thread + runtime tokio : le timer tourne hors du thread UI
// 2. mpsc : le thread UI reste seul propriétaire de l'état (pas de Mutex)
// 3. Annulation : quand le Receiver est drop, send() échoue et le poller s'arrête
// ============================================================================

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::api::CoinGeckoClient;
use crate::models::{compute_recommendations, Coin, Recommendation};

/// Résultat d'un poll envoyé au thread UI
#[derive(Debug)]
pub enum PollResult {
    /// Snapshot complet
    Snapshot {
        coins: Vec<Coin>,
        fetched_at: DateTime<Utc>,
    },

    /// Échec du poll (message affichable)
    Failed { error: String },
}

/// État du marché tel que vu par les écrans
#[derive(Debug, Clone)]
pub struct MarketState {
    /// Dernier snapshot réussi
    pub coins: Vec<Coin>,

    /// true jusqu'au premier poll terminé (succès ou échec)
    pub loading: bool,

    /// Erreur du dernier poll, None si le dernier poll a réussi
    pub error: Option<String>,

    /// Recommandations calculées depuis le dernier snapshot réussi
    pub recommendations: Vec<Recommendation>,

    /// Heure du dernier snapshot réussi
    pub last_updated: Option<DateTime<Utc>>,
}

impl MarketState {
    pub fn new() -> Self {
        Self {
            coins: Vec::new(),
            loading: true,
            error: None,
            recommendations: Vec::new(),
            last_updated: None,
        }
    }

    /// Applique un résultat de poll
    ///
    /// - Succès : remplace le snapshot, recalcule les recommandations
    /// - Échec : positionne l'erreur, garde le dernier snapshot valide
    ///
    /// Retourne true si le snapshot a été remplacé.
    pub fn apply(&mut self, result: PollResult) -> bool {
        self.loading = false;

        match result {
            PollResult::Snapshot { coins, fetched_at } => {
                self.recommendations = compute_recommendations(&coins);
                self.coins = coins;
                self.error = None;
                self.last_updated = Some(fetched_at);
                true
            }
            PollResult::Failed { error } => {
                self.error = Some(error);
                false
            }
        }
    }

    /// Cherche un coin du snapshot par id
    pub fn find(&self, id: &str) -> Option<&Coin> {
        self.coins.iter().find(|c| c.id == id)
    }
}

impl Default for MarketState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lance le thread de polling
///
/// Premier poll immédiat, puis un poll par `interval`. Les polls sont
/// séquentiels : un résultat ne peut pas en dépasser un autre.
/// Le thread s'arrête dès que le Receiver est drop.
pub fn spawn_poller(
    client: CoinGeckoClient,
    interval: Duration,
    result_tx: mpsc::Sender<PollResult>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        // Runtime dédié à ce thread
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create poller runtime");
                let _ = result_tx.send(PollResult::Failed {
                    error: format!("Runtime indisponible : {}", e),
                });
                return;
            }
        };

        runtime.block_on(async move {
            let mut ticker = tokio::time::interval(interval);
            // Si un poll dure plus que l'intervalle, on ne rattrape pas les ticks manqués
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            info!(interval_secs = interval.as_secs(), "Market poller started");

            loop {
                ticker.tick().await;
                debug!("Polling market snapshot");

                let result = match client.fetch_markets().await {
                    Ok(coins) => PollResult::Snapshot {
                        coins,
                        fetched_at: Utc::now(),
                    },
                    Err(e) => {
                        warn!(error = ?e, "Market poll failed, keeping previous snapshot");
                        PollResult::Failed {
                            error: format!("{:#}", e),
                        }
                    }
                };

                // Équivalent du flag "mounted" : plus personne n'écoute, on s'arrête
                if result_tx.send(result).is_err() {
                    info!("Market poller exiting (channel closed)");
                    break;
                }
            }
        });
    })
}

// ============================================================================
// Tests
// ============================================================================
