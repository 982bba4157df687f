use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
    app::AppState,
    ui::{
        components::{card::Card, status::ready_or_placeholder},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let card = Card::new("Your groups", &theme).focused(true);
    let inner = card.draw(frame, area);

    let Some(groups) = ready_or_placeholder(
        frame,
        inner,
        &state.dashboard.view.groups,
        "No groups",
        &theme,
    ) else {
        return;
    };

    if groups.is_empty() {
        let hint = Line::from(vec![
            Span::styled(
                "You don't have any groups yet. ",
                Style::default().fg(theme.text_muted),
            ),
            Span::styled("Press g to create one.", Style::default().fg(theme.accent)),
        ]);
        frame.render_widget(Paragraph::new(hint), inner);
        return;
    }

    let items: Vec<ListItem> = groups
        .iter()
        .map(|group| {
            let members = match group.member_count {
                1 => "1 member".to_string(),
                n => format!("{n} members"),
            };
            ListItem::new(Line::from(vec![
                Span::styled(group.name.clone(), Style::default().fg(theme.text)),
                Span::styled(format!("  {members}"), Style::default().fg(theme.text_muted)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("› ");
    let mut list_state = ListState::default().with_selected(Some(state.dashboard.selected));
    frame.render_stateful_widget(list, inner, &mut list_state);
}
