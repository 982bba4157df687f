use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
    app::{AppState, GroupField},
    ui::{
        components::{
            card::Card,
            input::{checkbox, render_input},
            status::{ready_or_placeholder, render_error},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let group = &state.create_group;
    let form = &group.form;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Min(4),    // Members
            Constraint::Length(1), // Selected
            Constraint::Length(1), // Status / error
        ])
        .split(area);

    let name_card = Card::new("Group name", &theme).focused(group.focus == GroupField::Name);
    let name_area = name_card.draw(frame, layout[0]);
    render_input(
        frame,
        name_area,
        "Name",
        &form.name,
        group.focus == GroupField::Name && !form.is_busy(),
        &theme,
    );

    let members_focused = group.focus == GroupField::Members;
    let members_card = Card::new("Members", &theme).focused(members_focused);
    let members_area = members_card.draw(frame, layout[1]);

    if let Some(users) =
        ready_or_placeholder(frame, members_area, form.users(), "No users", &theme)
    {
        if users.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No users yet. Create one from the dashboard first.",
                    Style::default().fg(theme.text_muted),
                )),
                members_area,
            );
        } else {
            let items: Vec<ListItem> = users
                .iter()
                .map(|user| {
                    let marker = checkbox(form.is_selected(&user.id));
                    ListItem::new(format!("{marker} {}", user.name))
                })
                .collect();
            let list = List::new(items)
                .style(Style::default().fg(theme.text))
                .highlight_style(
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                );
            let selected = members_focused.then_some(group.cursor);
            let mut list_state = ListState::default().with_selected(selected);
            frame.render_stateful_widget(list, members_area, &mut list_state);
        }
    }

    let names: Vec<&str> = form.selected().iter().map(|user| user.name.as_str()).collect();
    let selected = if names.is_empty() {
        "nobody".to_string()
    } else {
        names.join(", ")
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" Selected: ", Style::default().fg(theme.text_muted)),
            Span::styled(selected, Style::default().fg(theme.text)),
        ])),
        layout[2],
    );

    if form.is_busy() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                " Creating...",
                Style::default().fg(theme.text_muted),
            )),
            layout[3],
        );
    } else {
        render_error(frame, layout[3], form.error(), &theme);
    }
}
