use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{
        components::{card::Card, input::render_input, status::render_error},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let form = &state.create_user;

    let card = Card::new("Create user", &theme).focused(true);
    let inner = card.draw(frame, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Name
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Status
            Constraint::Length(1), // Error
        ])
        .margin(1)
        .split(inner);

    render_input(frame, rows[0], "Name", &form.name, !form.is_busy(), &theme);

    if form.is_busy() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Creating...",
                Style::default().fg(theme.text_muted),
            )),
            rows[2],
        );
    }
    render_error(frame, rows[3], form.error(), &theme);
}
