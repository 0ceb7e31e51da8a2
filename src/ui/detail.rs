// ============================================================================
// Écran détail : fiche d'un coin + graphique des prix
// ============================================================================
// Le graphique affiche l'historique de la période choisie, prolongé par
// les prix live reçus à chaque poll tant que l'écran reste ouvert.
//
// CONCEPTS RATATUI :
// 1. Chart widget : Dataset + Axis
// 2. Tabs simplifiés : la période active est mise en évidence
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Axis, Chart, Dataset, GraphType, Paragraph, Wrap,
    },
    Frame,
};

use crate::app::{App, DetailState, DetailView};
use crate::models::{ChartRange, CoinDetails, Palette};
use crate::ui::format::{change_color, format_amount, format_change, format_price};
use crate::ui::layout::{self, themed_block};

const SHORTCUTS: &[(&str, &str)] = &[
    ("ESC", "Retour"),
    ("h l", "Période"),
    ("w", "Watch"),
    ("t", "Thème"),
    ("L", "Login"),
    ("q", "Quit"),
];

/// Dessine l'écran détail
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = layout::create_layout(frame.size());
    let palette = app.theme.palette();

    layout::render_header(frame, app, chunks[0]);

    match &app.detail {
        Some(detail) => render_detail(frame, app, &palette, detail, chunks[1]),
        None => layout::render_message(frame, &palette, chunks[1], " Détail ", Vec::new()),
    }

    layout::render_footer(frame, app, chunks[2], SHORTCUTS);
}

fn render_detail(frame: &mut Frame, app: &App, palette: &Palette, detail: &DetailView, area: Rect) {
    let details = match &detail.details {
        DetailState::Loading => {
            layout::render_message(
                frame,
                palette,
                area,
                " Détail ",
                vec![Line::from(Span::styled(
                    format!("Chargement de {}...", detail.coin_id),
                    Style::default().fg(palette.muted),
                ))],
            );
            return;
        }
        DetailState::NotFound => {
            layout::render_message(
                frame,
                palette,
                area,
                " ⚠ Introuvable ",
                vec![
                    Line::from(Span::styled(
                        format!("Coin introuvable : {}", detail.coin_id),
                        Style::default().fg(palette.negative),
                    )),
                    Line::from(""),
                    Line::from(Span::styled("[ESC] Retour", Style::default().fg(palette.muted))),
                ],
            );
            return;
        }
        DetailState::Loaded(details) => details,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Prix et stats
            Constraint::Min(10),   // Graphique
            Constraint::Length(6), // Description
        ])
        .split(area);

    render_stats(frame, app, palette, details, chunks[0]);
    let line_color = change_color(palette, details.change_24h());
    render_chart(frame, palette, detail, line_color, &app.vs_currency, chunks[1]);
    render_description(frame, palette, details, chunks[2]);
}

fn render_stats(frame: &mut Frame, app: &App, palette: &Palette, details: &CoinDetails, area: Rect) {
    let watched = if app.is_watched(&details.id) { " ★" } else { "" };
    let rank = details
        .market_cap_rank
        .map(|r| format!("#{} ", r))
        .unwrap_or_default();
    let title = format!(" {}{} ({}){} ", rank, details.name, details.display_symbol(), watched);

    let currency = app.vs_currency.as_str();
    let change = details.change_24h();

    let text = vec![
        Line::from(vec![
            Span::styled(
                format_price(details.current_price, currency),
                Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format_change(change), Style::default().fg(change_color(palette, change))),
        ]),
        Line::from(vec![
            Span::styled("Market cap : ", Style::default().fg(palette.muted)),
            Span::raw(format_amount(details.market_cap, currency)),
            Span::styled("   Volume 24h : ", Style::default().fg(palette.muted)),
            Span::raw(format_amount(details.total_volume, currency)),
        ]),
        Line::from(vec![
            Span::styled("Haut 24h : ", Style::default().fg(palette.muted)),
            Span::raw(format_price(details.high_24h, currency)),
            Span::styled("   Bas 24h : ", Style::default().fg(palette.muted)),
            Span::raw(format_price(details.low_24h, currency)),
        ]),
        Line::from(Span::styled(details.image.as_str(), Style::default().fg(palette.muted))),
    ];

    frame.render_widget(Paragraph::new(text).block(themed_block(palette, title)), area);
}

/// Sélecteur de période : la période active est inversée
fn range_selector(palette: &Palette, active: ChartRange) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for range in ChartRange::all() {
        let style = if range == active {
            Style::default().fg(palette.accent).add_modifier(Modifier::REVERSED | Modifier::BOLD)
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(format!(" {} ", range.label()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_chart(
    frame: &mut Frame,
    palette: &Palette,
    detail: &DetailView,
    color: Color,
    currency: &str,
    area: Rect,
) {
    let block = themed_block(palette, range_selector(palette, detail.range()))
        .title(
            Title::from(Line::from(Span::styled(
                " ● live : le dernier prix s'ajoute à chaque rafraîchissement ",
                Style::default().fg(palette.muted),
            )))
            .position(Position::Bottom),
        );

    if detail.chart_loading {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Chargement de l'historique...",
            Style::default().fg(palette.muted),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(error) = &detail.chart_error {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            format!("⚠ Historique indisponible : {}", error),
            Style::default().fg(palette.negative),
        )))
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let points = detail.chart.to_xy();
    let (min_price, max_price) = match detail.chart.bounds() {
        Some(bounds) => bounds,
        None => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "Pas de données à afficher",
                Style::default().fg(palette.muted),
            )))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }
    };

    // Marge de 5% ; série plate : marge arbitraire pour éviter des bornes égales
    let spread = max_price - min_price;
    let margin = if spread > 0.0 { spread * 0.05 } else { (max_price.abs() * 0.01).max(0.01) };
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let datasets = vec![Dataset::default()
        .name(detail.coin_id.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let first_label = detail.chart.first().map(|p| p.label.clone()).unwrap_or_default();
    let last_label = detail.chart.last().map(|p| p.label.clone()).unwrap_or_default();

    let x_axis = Axis::default()
        .style(Style::default().fg(palette.muted))
        .bounds([0.0, (points.len().saturating_sub(1)).max(1) as f64])
        .labels(vec![Span::raw(first_label), Span::raw(last_label)]);

    let y_axis = Axis::default()
        .style(Style::default().fg(palette.muted))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format_price(y_min, currency)),
            Span::raw(format_price((y_min + y_max) / 2.0, currency)),
            Span::raw(format_price(y_max, currency)),
        ]);

    let chart = Chart::new(datasets).block(block).x_axis(x_axis).y_axis(y_axis);
    frame.render_widget(chart, area);
}

fn render_description(frame: &mut Frame, palette: &Palette, details: &CoinDetails, area: Rect) {
    let text = if details.description.is_empty() {
        Line::from(Span::styled("Pas de description", Style::default().fg(palette.muted)))
    } else {
        Line::from(details.description.as_str())
    };

    let paragraph = Paragraph::new(text)
        .block(themed_block(palette, " Description "))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
