// ============================================================================
// Structure : ChartSeries
// ============================================================================
// Série de prix affichée sur l'écran détail d'un coin
//
// Cycle de vie :
// 1. replace_history() : chargement historique (/market_chart) pour une période
// 2. append_live()     : ajout du dernier prix du snapshot s'il a changé
// 3. Taille bornée : au-delà du cap, les points les plus anciens sont évincés
//
// CONCEPTS RUST :
// 1. VecDeque : file à double entrée, pop_front en O(1)
// 2. Copy enums : ChartRange se copie comme un entier
// 3. Option<f64> : "aucune valeur enregistrée" ≠ "valeur 0"
// ============================================================================

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Taille maximale par défaut d'une série
pub const DEFAULT_SERIES_CAP: usize = 1000;

/// Période d'historique affichée (sélecteur 1j / 7j / 30j / 90j)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRange {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl ChartRange {
    /// Nombre de jours envoyé à l'API (paramètre `days`)
    pub fn days(&self) -> u32 {
        match self {
            ChartRange::OneDay => 1,
            ChartRange::OneWeek => 7,
            ChartRange::OneMonth => 30,
            ChartRange::ThreeMonths => 90,
        }
    }

    /// Label court pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1d",
            ChartRange::OneWeek => "7d",
            ChartRange::OneMonth => "30d",
            ChartRange::ThreeMonths => "90d",
        }
    }

    /// Toutes les périodes, dans l'ordre du sélecteur
    pub fn all() -> [ChartRange; 4] {
        [
            ChartRange::OneDay,
            ChartRange::OneWeek,
            ChartRange::OneMonth,
            ChartRange::ThreeMonths,
        ]
    }

    /// Période suivante (cycle)
    pub fn next(&self) -> ChartRange {
        match self {
            ChartRange::OneDay => ChartRange::OneWeek,
            ChartRange::OneWeek => ChartRange::OneMonth,
            ChartRange::OneMonth => ChartRange::ThreeMonths,
            ChartRange::ThreeMonths => ChartRange::OneDay, // Boucle
        }
    }

    /// Période précédente (cycle)
    pub fn previous(&self) -> ChartRange {
        match self {
            ChartRange::OneDay => ChartRange::ThreeMonths, // Boucle
            ChartRange::OneWeek => ChartRange::OneDay,
            ChartRange::OneMonth => ChartRange::OneWeek,
            ChartRange::ThreeMonths => ChartRange::OneMonth,
        }
    }
}

impl Default for ChartRange {
    /// 30 jours par défaut
    fn default() -> Self {
        ChartRange::OneMonth
    }
}

/// Un point de la série
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,

    /// Label de l'axe X (date complète pour l'historique, heure pour le live)
    pub label: String,

    pub price: f64,
}

impl PricePoint {
    /// Point issu de l'historique
    pub fn historical(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            label: timestamp.format("%Y-%m-%d %H:%M").to_string(),
            timestamp,
            price,
        }
    }

    /// Point ajouté depuis le snapshot live
    pub fn live(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            label: timestamp.format("%H:%M:%S").to_string(),
            timestamp,
            price,
        }
    }
}

/// Série de prix bornée pour un coin
#[derive(Debug, Clone)]
pub struct ChartSeries {
    /// Identifiant du coin affiché
    pub coin_id: String,

    /// Période de l'historique chargé
    pub range: ChartRange,

    points: VecDeque<PricePoint>,

    /// Dernière valeur enregistrée (historique ou live)
    last_recorded: Option<f64>,

    cap: usize,
}

impl ChartSeries {
    /// Crée une série vide
    ///
    /// Un cap de 0 est ramené à 1 : la série garde toujours le dernier point.
    pub fn new(coin_id: impl Into<String>, range: ChartRange, cap: usize) -> Self {
        Self {
            coin_id: coin_id.into(),
            range,
            points: VecDeque::new(),
            last_recorded: None,
            cap: cap.max(1),
        }
    }

    /// Remplace toute la série par un chargement historique
    ///
    /// Appelé à l'ouverture de l'écran et à chaque changement de période.
    /// La dernière valeur enregistrée devient le dernier prix historique.
    pub fn replace_history(&mut self, range: ChartRange, points: Vec<PricePoint>) {
        self.range = range;
        self.last_recorded = points.last().map(|p| p.price);
        self.points = points.into();
        self.evict();
    }

    /// Ajoute le dernier prix live s'il diffère de la dernière valeur enregistrée
    ///
    /// Retourne true si un point a été ajouté.
    pub fn append_live(&mut self, timestamp: DateTime<Utc>, price: f64) -> bool {
        if self.last_recorded == Some(price) {
            return false;
        }

        self.points.push_back(PricePoint::live(timestamp, price));
        self.last_recorded = Some(price);
        self.evict();
        true
    }

    /// Éviction des plus anciens points au-delà du cap
    fn evict(&mut self) {
        while self.points.len() > self.cap {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn last_recorded(&self) -> Option<f64> {
        self.last_recorded
    }

    /// Itère sur les points du plus ancien au plus récent
    pub fn points(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.front()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    /// Points (x, y) pour le widget Chart de ratatui
    pub fn to_xy(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.price))
            .collect()
    }

    /// Prix minimum et maximum de la série
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }

        Some(self.points.iter().fold((f64::MAX, f64::MIN), |(min, max), p| {
            (min.min(p.price), max.max(p.price))
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
