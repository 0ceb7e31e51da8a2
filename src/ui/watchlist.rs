// ============================================================================
// Écran watchlist : coins suivis par l'utilisateur connecté
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
    Frame,
};

use crate::app::App;
use crate::models::Palette;
use crate::ui::format::{change_color, format_change, format_price};
use crate::ui::layout::{self, themed_block};

const SHORTCUTS: &[(&str, &str)] = &[
    ("ESC", "Retour"),
    ("↑↓ / j k", "Navigate"),
    ("Enter", "Détail"),
    ("w", "Retirer"),
    ("L", "Logout"),
    ("q", "Quit"),
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = layout::create_layout(frame.size());
    let palette = app.theme.palette();

    layout::render_header(frame, app, chunks[0]);
    render_list(frame, app, &palette, chunks[1]);
    layout::render_footer(frame, app, chunks[2], SHORTCUTS);
}

fn render_list(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let rows = app.watchlist_rows();

    if rows.is_empty() {
        layout::render_message(
            frame,
            palette,
            area,
            " ★ Watchlist ",
            vec![
                Line::from(Span::styled("Watchlist vide", Style::default().fg(palette.muted))),
                Line::from(Span::styled(
                    "Ajoutez des coins avec [w] depuis le marché",
                    Style::default().fg(palette.muted),
                )),
            ],
        );
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|(id, coin)| {
            // Un coin suivi peut sortir du top du marché : on affiche l'id seul
            let line = match coin {
                Some(coin) => {
                    let color = change_color(palette, coin.change_24h());
                    Line::from(vec![
                        Span::styled(
                            format!(" {:<8}", coin.display_symbol()),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(format!("{:<24}", coin.name)),
                        Span::raw(format!("{:>14}  ", format_price(coin.current_price, &app.vs_currency))),
                        Span::styled(format_change(coin.change_24h()), Style::default().fg(color)),
                    ])
                }
                None => Line::from(vec![
                    Span::styled(format!(" {:<8}", id), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled("hors du marché suivi", Style::default().fg(palette.muted)),
                ]),
            };

            ListItem::new(line)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.watchlist_index));

    let title = format!(" ★ Watchlist ({}) ", rows.len());
    let list = List::new(items)
        .block(themed_block(palette, title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut state);
}
