// ============================================================================
// Éléments communs à tous les écrans
// ============================================================================
// Header (titre, session, thème, état du poll) et footer (raccourcis,
// message d'état, confirmation de quit)
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::Palette;

/// Découpe l'écran en header / contenu / footer
pub fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

/// Bloc bordé aux couleurs du thème
pub fn themed_block<'a>(palette: &Palette, title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .style(Style::default().bg(palette.background).fg(palette.text))
        .title(title)
}

/// Dessine le header : titre, état du marché, session et thème
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let block = themed_block(&palette, " LazyCrypto ").title_alignment(Alignment::Center);

    let mut spans = Vec::new();

    // État du poll
    if app.market.loading {
        spans.push(Span::styled("Chargement du marché...", Style::default().fg(palette.muted)));
    } else if let Some(error) = &app.market.error {
        spans.push(Span::styled(
            format!("⚠ {}", error),
            Style::default().fg(palette.negative).add_modifier(Modifier::BOLD),
        ));
    } else if let Some(updated) = app.market.last_updated {
        spans.push(Span::styled(
            format!("Mis à jour {}", updated.with_timezone(&chrono::Local).format("%H:%M:%S")),
            Style::default().fg(palette.muted),
        ));
    }

    spans.push(Span::raw("   "));

    // Session
    match app.session.user() {
        Some(user) => spans.push(Span::styled(
            format!("● {}", user.display_name()),
            Style::default().fg(palette.positive),
        )),
        None if app.login_pending => {
            spans.push(Span::styled("○ connexion...", Style::default().fg(palette.warning)))
        }
        None => spans.push(Span::styled("○ anonyme", Style::default().fg(palette.muted))),
    }

    spans.push(Span::raw("   "));
    spans.push(Span::styled(
        format!("thème {}", app.theme),
        Style::default().fg(palette.muted),
    ));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Dessine le footer avec les raccourcis de l'écran
///
/// Le message de confirmation de quit et le message d'état ont priorité.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect, shortcuts: &[(&str, &str)]) {
    let palette = app.theme.palette();
    let block = themed_block(&palette, "");
    let key_style = Style::default().fg(palette.warning).add_modifier(Modifier::BOLD);

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", key_style),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(palette.negative)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                key_style,
            ),
        ])
    } else if let Some(message) = &app.status_message {
        Line::from(Span::styled(message.as_str(), Style::default().fg(palette.accent)))
    } else {
        let mut spans = Vec::with_capacity(shortcuts.len() * 2);
        for (key, label) in shortcuts {
            spans.push(Span::styled(format!("[{}]", key), key_style));
            spans.push(Span::raw(format!(" {}  ", label)));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Message centré dans un bloc (chargement, vide, introuvable)
pub fn render_message(frame: &mut Frame, palette: &Palette, area: Rect, title: &str, lines: Vec<Line>) {
    let mut text = vec![Line::from("")];
    text.extend(lines);

    let paragraph = Paragraph::new(text)
        .block(themed_block(palette, title.to_string()))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
