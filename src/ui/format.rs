// ============================================================================
// Formatage des nombres pour l'affichage
// ============================================================================
// Les montants suivent la devise configurée (LAZYCRYPTO_VS_CURRENCY) :
// symbole en préfixe quand il est connu, code ISO en suffixe sinon.
// ============================================================================

use ratatui::style::Color;

use crate::models::Palette;

/// Symbole des devises courantes
fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_lowercase().as_str() {
        "usd" => Some("$"),
        "eur" => Some("€"),
        "gbp" => Some("£"),
        "jpy" => Some("¥"),
        _ => None,
    }
}

/// Ajoute la devise à un nombre déjà formaté
fn with_currency(number: String, currency: &str) -> String {
    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}", symbol, number),
        None => format!("{} {}", number, currency.to_uppercase()),
    }
}

/// Insère des séparateurs de milliers dans la partie entière
fn group_thousands(integer: &str) -> String {
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}{}", sign, grouped)
}

/// Formate un prix : "$64,123.50", "$0.000123", "1,250.00 CHF"
///
/// Les prix sous 1 gardent plus de décimales (petites altcoins).
pub fn format_price(price: f64, currency: &str) -> String {
    let decimals = if price.abs() >= 1.0 {
        2
    } else if price.abs() >= 0.01 {
        4
    } else {
        6
    };

    let raw = format!("{:.*}", decimals, price);
    let (integer, fraction) = raw.split_once('.').unwrap_or((raw.as_str(), ""));

    let number = if fraction.is_empty() {
        group_thousands(integer)
    } else {
        format!("{}.{}", group_thousands(integer), fraction)
    };

    with_currency(number, currency)
}

/// Formate un montant entier : "$1,262,000,000,000"
pub fn format_amount(value: f64, currency: &str) -> String {
    with_currency(group_thousands(&format!("{:.0}", value)), currency)
}

/// Formate une variation : "▲ 2.31%" / "▼ 4.10%" / "0.00%"
pub fn format_change(change: f64) -> String {
    if change > 0.0 {
        format!("▲ {:.2}%", change)
    } else if change < 0.0 {
        format!("▼ {:.2}%", change.abs())
    } else {
        format!("{:.2}%", 0.0)
    }
}

/// Couleur d'une variation : même convention que les flèches de format_change
pub fn change_color(palette: &Palette, change: f64) -> Color {
    if change > 0.0 {
        palette.positive
    } else if change < 0.0 {
        palette.negative
    } else {
        palette.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::Theme;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(64123.5, "usd"), "$64,123.50");
        assert_eq!(format_price(1.0, "usd"), "$1.00");
        assert_eq!(format_price(0.5, "usd"), "$0.5000");
        assert_eq!(format_price(0.000123, "usd"), "$0.000123");
        assert_eq!(format_price(999.999, "usd"), "$1,000.00");
    }

    #[test]
    fn test_format_price_follows_currency() {
        assert_eq!(format_price(58000.0, "eur"), "€58,000.00");
        assert_eq!(format_price(1250.0, "chf"), "1,250.00 CHF");
        assert_eq!(format_amount(1_000_000.0, "GBP"), "£1,000,000");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_262_000_000_000.0, "usd"), "$1,262,000,000,000");
        assert_eq!(format_amount(999.0, "usd"), "$999");
        assert_eq!(format_amount(0.0, "usd"), "$0");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(2.314), "▲ 2.31%");
        assert_eq!(format_change(-4.1), "▼ 4.10%");
        assert_eq!(format_change(0.0), "0.00%");
    }

    #[test]
    fn test_flat_change_is_neutral() {
        let palette = Theme::Dark.palette();
        assert_eq!(change_color(&palette, 0.0), palette.muted);
        assert_eq!(change_color(&palette, 0.1), palette.positive);
        assert_eq!(change_color(&palette, -0.1), palette.negative);
    }
}
