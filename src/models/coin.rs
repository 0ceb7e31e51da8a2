// ============================================================================
// Structures : Coin et CoinDetails
// ============================================================================
// Coin        : une ligne du snapshot de marché (endpoint /coins/markets)
// CoinDetails : la fiche détaillée d'un coin (endpoint /coins/{id})
//
// CONCEPTS RUST :
// 1. #[serde(deserialize_with)] : tolérer les `null` renvoyés par l'API
// 2. Option<T> : champs qui peuvent réellement manquer
// 3. Conversion "raw → modèle" : l'API est imbriquée, nos modèles sont plats
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Désérialise un nombre qui peut être `null` en 0.0
///
/// CoinGecko renvoie `null` pour les coins sans market cap ou sans prix.
/// Un seul `null` ne doit pas faire échouer tout le snapshot.
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Un coin dans le snapshot de marché
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    /// Identifiant CoinGecko (ex: "bitcoin")
    pub id: String,

    /// Symbole en minuscules (ex: "btc")
    pub symbol: String,

    /// Nom affiché (ex: "Bitcoin")
    pub name: String,

    /// URL de l'image
    #[serde(default)]
    pub image: String,

    /// Prix actuel dans la devise de référence
    #[serde(default, deserialize_with = "null_as_zero")]
    pub current_price: f64,

    /// Variation sur 24h en pourcentage (None si l'API ne la fournit pas)
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,

    /// Capitalisation de marché
    #[serde(default, deserialize_with = "null_as_zero")]
    pub market_cap: f64,
}

impl Coin {
    /// Crée un coin sans image
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        current_price: f64,
        change_24h: Option<f64>,
        market_cap: f64,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            image: String::new(),
            current_price,
            price_change_percentage_24h: change_24h,
            market_cap,
        }
    }

    /// Variation 24h, 0 si absente
    pub fn change_24h(&self) -> f64 {
        self.price_change_percentage_24h.unwrap_or(0.0)
    }

    /// Retourne true si le coin est en hausse sur 24h
    pub fn is_positive(&self) -> bool {
        self.change_24h() > 0.0
    }

    /// Symbole en majuscules pour l'affichage
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// Vérifie si le coin correspond à une recherche
    ///
    /// Recherche insensible à la casse sur le nom ou le symbole.
    /// Une recherche vide correspond à tout.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.symbol.to_lowercase().contains(&query)
    }
}

/// Filtre un snapshot avec une recherche
pub fn filter_coins<'a>(coins: &'a [Coin], query: &str) -> Vec<&'a Coin> {
    coins.iter().filter(|coin| coin.matches(query)).collect()
}

// ============================================================================
// CoinDetails
// ============================================================================

/// Fiche détaillée d'un coin
#[derive(Debug, Clone, PartialEq)]
pub struct CoinDetails {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub market_cap_rank: Option<u32>,
    pub current_price: f64,
    pub price_change_percentage_24h: Option<f64>,
    pub market_cap: f64,
    pub total_volume: f64,
    pub high_24h: f64,
    pub low_24h: f64,

    /// Description en anglais, balises HTML retirées
    pub description: String,
}

impl CoinDetails {
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    pub fn change_24h(&self) -> f64 {
        self.price_change_percentage_24h.unwrap_or(0.0)
    }
}

/// Réponse brute de /coins/{id}
///
/// Les prix sont des maps devise → valeur : { "usd": 64000.0, "eur": ... }
#[derive(Debug, Deserialize)]
pub(crate) struct RawCoinDetails {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    image: RawImage,
    #[serde(default)]
    market_cap_rank: Option<u32>,
    market_data: RawMarketData,
    #[serde(default)]
    description: HashMap<String, Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawImage {
    #[serde(default)]
    large: String,
}

#[derive(Debug, Deserialize)]
struct RawMarketData {
    #[serde(default)]
    current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    market_cap: HashMap<String, Option<f64>>,
    #[serde(default)]
    total_volume: HashMap<String, Option<f64>>,
    #[serde(default)]
    high_24h: HashMap<String, Option<f64>>,
    #[serde(default)]
    low_24h: HashMap<String, Option<f64>>,
}

/// Lit la valeur d'une devise dans une map, 0 si absente ou null
fn in_currency(values: &HashMap<String, Option<f64>>, currency: &str) -> f64 {
    values.get(currency).copied().flatten().unwrap_or_default()
}

impl RawCoinDetails {
    /// Aplatit la réponse pour une devise donnée
    pub(crate) fn into_details(self, currency: &str) -> CoinDetails {
        let md = &self.market_data;
        let description = self
            .description
            .get("en")
            .cloned()
            .flatten()
            .map(|html| strip_html(&html))
            .unwrap_or_default();

        CoinDetails {
            current_price: in_currency(&md.current_price, currency),
            price_change_percentage_24h: md.price_change_percentage_24h,
            market_cap: in_currency(&md.market_cap, currency),
            total_volume: in_currency(&md.total_volume, currency),
            high_24h: in_currency(&md.high_24h, currency),
            low_24h: in_currency(&md.low_24h, currency),
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            image: self.image.large,
            market_cap_rank: self.market_cap_rank,
            description,
        }
    }
}

/// Retire les balises HTML d'une description pour l'affichage terminal
///
/// Les descriptions CoinGecko contiennent des liens `<a href=...>`.
/// On garde le texte, on retire les balises et on décode les entités courantes.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
