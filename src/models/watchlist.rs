// ============================================================================
// Structure : Watchlist
// ============================================================================
// Ensemble ordonné d'identifiants de coins choisis par l'utilisateur
//
// Invariants :
// - Pas de doublon (vérifié à l'insertion)
// - L'ordre d'insertion est conservé (affichage dans l'ordre d'ajout)
//
// CONCEPTS RUST :
// 1. #[serde(transparent)] : sérialisé comme une simple liste JSON ["a", "b"]
// 2. Vec plutôt que HashSet : quelques dizaines d'ids, l'ordre compte
// ============================================================================

use serde::{Deserialize, Serialize};

/// Watchlist de l'utilisateur (ids CoinGecko)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watchlist {
    ids: Vec<String>,
}

impl Watchlist {
    /// Crée une watchlist vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Crée une watchlist depuis une liste d'ids (les doublons sont ignorés)
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut watchlist = Self::new();
        for id in ids {
            watchlist.add(id);
        }
        watchlist
    }

    /// Ajoute un id s'il n'est pas déjà présent
    ///
    /// Retourne true si la watchlist a changé.
    pub fn add(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Retire un id
    ///
    /// Retourne true si la watchlist a changé.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|x| x != id);
        self.ids.len() != before
    }

    /// Ajoute l'id s'il est absent, le retire sinon
    ///
    /// Retourne true si l'id est présent après l'opération.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|x| x == id)
    }

    /// Ids dans l'ordre d'ajout
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_duplicates() {
        let mut watchlist = Watchlist::new();
        assert!(watchlist.add("bitcoin"));
        assert!(!watchlist.add("bitcoin"));
        assert!(watchlist.add("ethereum"));

        assert_eq!(watchlist.ids(), &["bitcoin".to_string(), "ethereum".to_string()]);
    }

    #[test]
    fn test_remove() {
        let mut watchlist = Watchlist::from_ids(["bitcoin", "ethereum"]);
        assert!(watchlist.remove("bitcoin"));
        assert!(!watchlist.remove("bitcoin"));
        assert_eq!(watchlist.len(), 1);
        assert!(!watchlist.contains("bitcoin"));
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let original = Watchlist::from_ids(["bitcoin", "solana"]);

        for id in ["bitcoin", "ethereum"] {
            let mut watchlist = original.clone();
            let was_member = watchlist.contains(id);

            assert_eq!(watchlist.toggle(id), !was_member);
            assert_eq!(watchlist.toggle(id), was_member);
            assert_eq!(watchlist.contains(id), was_member);
        }
    }

    #[test]
    fn test_from_ids_deduplicates() {
        let watchlist = Watchlist::from_ids(["a", "b", "a", "c", "b"]);
        assert_eq!(watchlist.len(), 3);
    }

    #[test]
    fn test_serialized_as_plain_list() {
        let watchlist = Watchlist::from_ids(["bitcoin", "ethereum"]);
        let json = serde_json::to_string(&watchlist).unwrap();
        assert_eq!(json, r#"["bitcoin","ethereum"]"#);

        let back: Watchlist = serde_json::from_str(&json).unwrap();
        assert_eq!(back, watchlist);
    }
}
