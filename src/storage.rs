// ============================================================================
// Module : storage
// ============================================================================
// Stockage clé/valeur local (équivalent du localStorage d'un navigateur)
//
// Deux clés seulement :
// - "watchlist"        : liste JSON des ids suivis
// - "theme-preference" : "light" ou "dark"
//
// CONCEPTS RUST :
// 1. Trait : FileStore en production, MemoryStore dans les tests
// 2. Dégradation : une lecture illisible donne la valeur par défaut
// 3. Écriture temp + rename : le fichier n'est jamais à moitié écrit
// ============================================================================

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::{Theme, Watchlist};

/// Clé de la watchlist
pub const WATCHLIST_KEY: &str = "watchlist";

/// Clé du thème
pub const THEME_KEY: &str = "theme-preference";

/// Nom du fichier de stockage dans le répertoire de données
pub const STORAGE_FILE: &str = "storage.json";

/// Stockage de chaînes par clé
pub trait KeyValueStore {
    /// Lit une valeur (None si la clé est absente)
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Écrit une valeur
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

// ============================================================================
// FileStore
// ============================================================================

/// Stockage dans un fichier JSON { "clé": "valeur", ... }
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Stockage dans `dir/storage.json`
    ///
    /// Le répertoire est créé s'il n'existe pas.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Échec de la création du répertoire {}", dir.display()))?;

        Ok(Self {
            path: dir.join(STORAGE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lit tout le fichier (map vide si le fichier n'existe pas encore)
    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Échec de la lecture de {}", self.path.display()))?;

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw)
            .with_context(|| format!("Fichier de stockage corrompu : {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // Un fichier corrompu est remplacé plutôt que de bloquer toute écriture
        let mut all = self.read_all().unwrap_or_else(|e| {
            warn!(error = ?e, "Storage file unreadable, starting fresh");
            BTreeMap::new()
        });
        all.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&all).context("Échec de la sérialisation du stockage")?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Échec de l'écriture de {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Échec du remplacement de {}", self.path.display()))?;

        debug!(key, path = %self.path.display(), "Storage value written");
        Ok(())
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// Stockage en mémoire (tests, ou repli si le répertoire de données est inaccessible)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// Helpers : watchlist et thème
// ============================================================================

/// Charge la watchlist (vide si absente ou illisible)
pub fn load_watchlist(store: &dyn KeyValueStore) -> Watchlist {
    let raw = match store.get(WATCHLIST_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Watchlist::new(),
        Err(e) => {
            warn!(error = ?e, "Failed to read watchlist, using empty one");
            return Watchlist::new();
        }
    };

    // On relit une simple liste pour dédoublonner un fichier modifié à la main
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => Watchlist::from_ids(ids),
        Err(e) => {
            warn!(error = %e, "Stored watchlist is not a JSON list, using empty one");
            Watchlist::new()
        }
    }
}

/// Sauvegarde la watchlist
pub fn save_watchlist(store: &mut dyn KeyValueStore, watchlist: &Watchlist) -> Result<()> {
    let json = serde_json::to_string(watchlist).context("Échec de la sérialisation de la watchlist")?;
    store.set(WATCHLIST_KEY, &json)
}

/// Charge le thème (défaut si absent, illisible ou inconnu)
pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Unknown stored theme, using default");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            warn!(error = ?e, "Failed to read theme, using default");
            Theme::default()
        }
    }
}

/// Sauvegarde le thème
pub fn save_theme(store: &mut dyn KeyValueStore, theme: Theme) -> Result<()> {
    store.set(THEME_KEY, theme.as_str())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Répertoire temporaire propre à chaque test
    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lazycrypto-test-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_memory_store_watchlist_round_trip() {
        let mut store = MemoryStore::new();
        assert!(load_watchlist(&store).is_empty());

        let mut watchlist = Watchlist::new();
        watchlist.add("bitcoin");
        watchlist.add("ethereum");
        save_watchlist(&mut store, &watchlist).unwrap();

        assert_eq!(load_watchlist(&store), watchlist);
    }

    #[test]
    fn test_watchlist_survives_reload() {
        let dir = temp_dir("reload");

        let mut watchlist = Watchlist::new();
        {
            let mut store = FileStore::open(&dir).unwrap();
            watchlist.add("bitcoin");
            save_watchlist(&mut store, &watchlist).unwrap();
            watchlist.toggle("solana");
            save_watchlist(&mut store, &watchlist).unwrap();
            save_theme(&mut store, Theme::Light).unwrap();
        }

        // Nouvelle instance : simule un redémarrage de l'application
        let store = FileStore::open(&dir).unwrap();
        assert_eq!(load_watchlist(&store), watchlist);
        assert_eq!(load_theme(&store), Theme::Light);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_values_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(WATCHLIST_KEY, "{not json").unwrap();
        store.set(THEME_KEY, "purple").unwrap();

        assert!(load_watchlist(&store).is_empty());
        assert_eq!(load_theme(&store), Theme::default());
    }

    #[test]
    fn test_duplicate_ids_in_storage_are_dropped() {
        let mut store = MemoryStore::new();
        store.set(WATCHLIST_KEY, r#"["btc","eth","btc"]"#).unwrap();

        let watchlist = load_watchlist(&store);
        assert_eq!(watchlist.ids(), &["btc".to_string(), "eth".to_string()]);
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_write() {
        let dir = temp_dir("corrupt");
        let mut store = FileStore::open(&dir).unwrap();
        fs::write(store.path(), "garbage").unwrap();

        assert!(store.get(THEME_KEY).is_err());
        assert_eq!(load_theme(&store), Theme::default());

        save_theme(&mut store, Theme::Light).unwrap();
        assert_eq!(load_theme(&store), Theme::Light);

        let _ = fs::remove_dir_all(&dir);
    }
}
