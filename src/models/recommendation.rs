// ============================================================================
// Recommandations : heuristique Buy / Hold / Take Profit
// ============================================================================
// Fonction pure : snapshot → liste classée des 6 meilleurs scores
//
// Le score favorise les grosses capitalisations et les fortes baisses
// récentes (stratégie "buy the dip") :
//
//   score = 0.7 * max(0, -Δ24h) + 0.3 * (log10(market_cap) - 5)
//
// CONCEPTS RUST :
// 1. Enum avec Display : l'action affichée telle quelle dans l'UI
// 2. Iterators : map + sort_by + truncate
// 3. sort_by est stable : à score égal, l'ordre du snapshot est conservé
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

use crate::models::Coin;

/// Nombre de recommandations affichées
pub const TOP_RECOMMENDATIONS: usize = 6;

/// Baisse sur 24h (en %) à partir de laquelle on recommande d'acheter
pub const BUY_THRESHOLD: f64 = -5.0;

/// Hausse sur 24h (en %) à partir de laquelle on recommande de prendre ses gains
pub const TAKE_PROFIT_THRESHOLD: f64 = 8.0;

const DROP_WEIGHT: f64 = 0.7;
const CAP_WEIGHT: f64 = 0.3;
const CAP_OFFSET: f64 = 5.0;

/// Action recommandée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Hold,
    TakeProfit,
}

impl Action {
    /// Détermine l'action depuis la variation 24h
    ///
    /// Buy si Δ ≤ -5%, Take Profit si Δ ≥ +8%, Hold sinon
    pub fn from_change(change_24h: f64) -> Self {
        if change_24h <= BUY_THRESHOLD {
            Action::Buy
        } else if change_24h >= TAKE_PROFIT_THRESHOLD {
            Action::TakeProfit
        } else {
            Action::Hold
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Buy => "Buy",
            Action::Hold => "Hold",
            Action::TakeProfit => "Take Profit",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Une recommandation dérivée du snapshot (jamais persistée)
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub score: f64,
    pub action: Action,
    pub reason: String,
}

/// Calcule le score heuristique d'un coin
///
/// - max(0, -Δ) : positif seulement en cas de baisse. Une variation ne peut
///   pas descendre sous -100%, le terme est donc borné à 100.
/// - log10(max(cap, 1)) : évite log10(0) pour les coins sans market cap
pub fn score(change_24h: f64, market_cap: f64) -> f64 {
    let drop_factor = (-change_24h).max(0.0);
    let cap_factor = market_cap.max(1.0).log10();
    DROP_WEIGHT * drop_factor + CAP_WEIGHT * (cap_factor - CAP_OFFSET)
}

/// Texte explicatif affiché sous la recommandation
fn reason(action: Action, change_24h: f64) -> String {
    match action {
        Action::Buy => format!("Dropped {:.2}% in 24h, possible dip", change_24h),
        Action::TakeProfit => format!("Up {:.2}% in 24h, strong rally", change_24h),
        Action::Hold => format!("24h change {:.2}%", change_24h),
    }
}

/// Construit la recommandation d'un coin
pub fn recommend(coin: &Coin) -> Recommendation {
    let change = coin.change_24h();
    let action = Action::from_change(change);

    Recommendation {
        id: coin.id.clone(),
        symbol: coin.symbol.clone(),
        name: coin.name.clone(),
        current_price: coin.current_price,
        score: score(change, coin.market_cap),
        action,
        reason: reason(action, change),
    }
}

/// Calcule les recommandations pour tout le snapshot
///
/// CONCEPT RUST : sort_by stable
/// - Vec::sort_by garde l'ordre relatif des éléments égaux
/// - partial_cmp car f64 n'est pas Ord (NaN) ; un NaN est traité comme égal
pub fn compute_recommendations(coins: &[Coin]) -> Vec<Recommendation> {
    let mut scored: Vec<Recommendation> = coins.iter().map(recommend).collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(TOP_RECOMMENDATIONS);
    scored
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, change: f64, market_cap: f64) -> Coin {
        Coin::new(id, id, id.to_uppercase(), 100.0, Some(change), market_cap)
    }

    #[test]
    fn test_action_thresholds() {
        assert_eq!(Action::from_change(-5.0), Action::Buy);
        assert_eq!(Action::from_change(-12.3), Action::Buy);
        assert_eq!(Action::from_change(-4.99), Action::Hold);
        assert_eq!(Action::from_change(0.0), Action::Hold);
        assert_eq!(Action::from_change(7.99), Action::Hold);
        assert_eq!(Action::from_change(8.0), Action::TakeProfit);
        assert_eq!(Action::from_change(25.0), Action::TakeProfit);
    }

    #[test]
    fn test_recommend_assigns_action_and_reason() {
        let buy = recommend(&coin("dip", -6.5, 1e9));
        assert_eq!(buy.action, Action::Buy);
        assert_eq!(buy.reason, "Dropped -6.50% in 24h, possible dip");

        let tp = recommend(&coin("moon", 9.0, 1e9));
        assert_eq!(tp.action, Action::TakeProfit);
        assert_eq!(tp.reason, "Up 9.00% in 24h, strong rally");

        let hold = recommend(&coin("flat", 1.234, 1e9));
        assert_eq!(hold.action, Action::Hold);
        assert_eq!(hold.reason, "24h change 1.23%");
    }

    #[test]
    fn test_score_formula() {
        // Baisse de 10% avec cap 1e9 : 0.7 * 10 + 0.3 * (9 - 5) = 8.2
        assert!((score(-10.0, 1e9) - 8.2).abs() < 1e-9);

        // Hausse : le terme de baisse vaut 0
        assert!((score(10.0, 1e9) - 1.2).abs() < 1e-9);

        // Market cap nulle : log10(1) = 0
        assert!((score(0.0, 0.0) - (-1.5)).abs() < 1e-9);
    }

    #[test]
    fn test_missing_change_counts_as_zero() {
        let c = Coin::new("x", "x", "X", 1.0, None, 1e5);
        let rec = recommend(&c);
        assert_eq!(rec.action, Action::Hold);
        assert!((rec.score - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_six_sorted_descending() {
        let coins: Vec<Coin> = (0..10)
            .map(|i| coin(&format!("c{}", i), -(i as f64), 1e9))
            .collect();

        let recs = compute_recommendations(&coins);
        assert_eq!(recs.len(), TOP_RECOMMENDATIONS);

        let ids: Vec<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c9", "c8", "c7", "c6", "c5", "c4"]);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_equal_scores_keep_snapshot_order() {
        let coins = vec![
            coin("first", 1.0, 1e9),
            coin("second", 2.0, 1e9),
            coin("third", 3.0, 1e9),
        ];

        // Hausses : même score pour les trois (drop = 0, même cap)
        let recs = compute_recommendations(&coins);
        let ids: Vec<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(compute_recommendations(&[]).is_empty());
    }
}
