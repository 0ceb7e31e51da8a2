// ============================================================================
// Écran Home : recommandations + tableau du marché
// ============================================================================
// CONCEPTS RATATUI :
// 1. Layout horizontal : deux panneaux côte à côte
// 2. Table : colonnes alignées avec largeurs contraintes
// 3. Focus : le panneau actif a une bordure accentuée
// 4. TableState / ListState : la ligne sélectionnée reste dans la zone
//    visible, ratatui fait défiler le tableau
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, HomeFocus};
use crate::models::{Action, Palette};
use crate::ui::format::{change_color, format_amount, format_change, format_price};
use crate::ui::layout::{self, themed_block};

/// Raccourcis affichés sur l'écran Home
const SHORTCUTS: &[(&str, &str)] = &[
    ("q", "Quit"),
    ("↑↓ / j k", "Navigate"),
    ("Tab", "Focus"),
    ("Enter", "Détail"),
    ("/", "Search"),
    ("w", "Watch"),
    ("W", "Watchlist"),
    ("t", "Thème"),
    ("L", "Login"),
];

/// Dessine l'écran Home (ou Search : même écran, footer de saisie)
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = layout::create_layout(frame.size());

    layout::render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);

    if app.is_in_search() {
        render_search_footer(frame, app, chunks[2]);
    } else {
        layout::render_footer(frame, app, chunks[2], SHORTCUTS);
    }
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();

    // Rien à afficher avant le premier poll
    if app.market.loading {
        layout::render_message(
            frame,
            &palette,
            area,
            " Marché ",
            vec![Line::from(Span::styled(
                "Chargement des cours...",
                Style::default().fg(palette.muted),
            ))],
        );
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_recommendations(frame, app, &palette, columns[0]);
    render_market(frame, app, &palette, columns[1]);
}

/// Couleur d'un badge d'action
fn action_color(palette: &Palette, action: Action) -> ratatui::style::Color {
    match action {
        Action::Buy => palette.positive,
        Action::TakeProfit => palette.warning,
        Action::Hold => palette.muted,
    }
}

/// Style de la ligne sélectionnée : visible seulement sur le panneau actif
fn highlight_style(focused: bool) -> Style {
    if focused {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Bordure accentuée pour le panneau qui a le focus
fn focus_style(palette: &Palette, focused: bool) -> Style {
    if focused {
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.border)
    }
}

fn render_recommendations(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let focused = app.home_focus == HomeFocus::Recommendations;
    let block = themed_block(palette, " 💡 Recommandations ").border_style(focus_style(palette, focused));

    let recommendations = app.recommendations();
    if recommendations.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Aucune recommandation",
            Style::default().fg(palette.muted),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = recommendations
        .iter()
        .map(|rec| {
            let marker = if app.is_watched(&rec.id) { "★" } else { " " };

            let header = Line::from(vec![
                Span::styled(marker, Style::default().fg(palette.warning)),
                Span::raw(" "),
                Span::styled(
                    format!("{:<6}", rec.symbol.to_uppercase()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {:<12} ", rec.action.label()),
                    Style::default()
                        .fg(action_color(palette, rec.action))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format_price(rec.current_price, &app.vs_currency)),
            ]);
            let reason = Line::from(vec![
                Span::raw(format!("   {} ", rec.name)),
                Span::styled(
                    format!("· {} · score {:.2}", rec.reason, rec.score),
                    Style::default().fg(palette.muted),
                ),
            ]);

            ListItem::new(vec![header, reason])
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.recommendation_index));

    let list = List::new(items).block(block).highlight_style(highlight_style(focused));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_market(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let focused = app.home_focus == HomeFocus::Market;

    let title = if app.search_query.is_empty() {
        " 📊 Marché ".to_string()
    } else {
        format!(" 📊 Marché (filtre : {}) ", app.search_query)
    };
    let block = themed_block(palette, title).border_style(focus_style(palette, focused));

    let coins = app.visible_coins();
    if coins.is_empty() {
        let message = if app.market.coins.is_empty() {
            "Aucune donnée de marché"
        } else {
            "Aucun coin ne correspond à la recherche"
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(message, Style::default().fg(palette.muted))))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec!["#", "", "Symbole", "Nom", "Prix", "24h", "Market cap"])
        .style(Style::default().fg(palette.muted).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = coins
        .iter()
        .enumerate()
        .map(|(index, coin)| {
            let marker = if app.is_watched(&coin.id) { "★" } else { "" };

            Row::new(vec![
                Line::from(format!("{}", index + 1)),
                Line::from(Span::styled(marker, Style::default().fg(palette.warning))),
                Line::from(coin.display_symbol()),
                Line::from(coin.name.as_str()),
                Line::from(format_price(coin.current_price, &app.vs_currency)),
                Line::from(Span::styled(
                    format_change(coin.change_24h()),
                    Style::default().fg(change_color(palette, coin.change_24h())),
                )),
                Line::from(format_amount(coin.market_cap, &app.vs_currency)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(2),
        Constraint::Length(8),
        Constraint::Min(12),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(20),
    ];

    // Sélection toujours posée pour que le défilement suive le curseur
    let mut state = TableState::default();
    state.select(Some(app.selected_index));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(highlight_style(focused));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Footer en mode recherche : ligne de saisie
fn render_search_footer(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let block = themed_block(&palette, "").border_style(Style::default().fg(palette.positive));

    let input_line = Line::from(vec![
        Span::styled("Recherche : ", Style::default().fg(palette.border).add_modifier(Modifier::BOLD)),
        Span::styled(app.search_query.as_str(), Style::default().fg(palette.text)),
        Span::styled("█", Style::default().fg(palette.text).add_modifier(Modifier::SLOW_BLINK)),
        Span::raw("   "),
        Span::styled("[Enter]", Style::default().fg(palette.positive).add_modifier(Modifier::BOLD)),
        Span::raw(" Valider  "),
        Span::styled("[ESC]", Style::default().fg(palette.negative).add_modifier(Modifier::BOLD)),
        Span::raw(" Annuler"),
    ]);

    frame.render_widget(Paragraph::new(input_line).block(block), area);
}
