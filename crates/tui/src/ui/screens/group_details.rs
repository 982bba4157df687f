use divvy_engine::{GroupDetails, Money, Resource};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
};

use crate::{
    app::AppState,
    ui::{
        components::{
            card::{Card, StatCard},
            money::{amount_span, debt_span, format_amount},
            status::ready_or_placeholder,
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let Some(details) = state.details.as_ref() else {
        return;
    };

    // A missing group replaces the whole screen; the other panels are moot.
    if matches!(details.group, Resource::NotFound) {
        let card = Card::new("Group", &theme);
        card.render_with(
            frame,
            area,
            Paragraph::new(Span::styled(
                "Group not found",
                Style::default().fg(theme.text_muted),
            )),
        );
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Stats
            Constraint::Min(0),    // Expenses and balances
        ])
        .split(area);

    render_stats(frame, layout[0], details, &theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout[1]);

    render_expenses(frame, columns[0], details, &theme);
    render_settlement(frame, columns[1], details, &theme);
}

fn render_stats(frame: &mut Frame<'_>, area: Rect, details: &GroupDetails, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let card = Card::new("Group", theme);
    let inner = card.draw(frame, cols[0]);
    if let Some(group) = ready_or_placeholder(frame, inner, &details.group, "", theme) {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(group.name.clone(), Style::default().fg(theme.text)),
                Span::styled(
                    format!("  {} members", group.members.len()),
                    Style::default().fg(theme.text_muted),
                ),
            ])),
            inner,
        );
    }

    let (spent, count) = match details.expenses.ready() {
        Some(expenses) => (
            format_amount(expenses.iter().map(|expense| expense.amount).sum::<Money>()),
            format!("{} expenses", expenses.len()),
        ),
        None => ("-".to_string(), String::new()),
    };
    StatCard::new("Total spent", spent, theme)
        .caption(count)
        .render(frame, cols[1]);

    let settlement = &details.settlement;
    let open = settlement.current().ready().map(Vec::len);
    let tone = match open {
        Some(0) => theme.positive,
        Some(_) => theme.negative,
        None => theme.text_muted,
    };
    let value = open.map_or_else(|| "-".to_string(), |count| count.to_string());
    StatCard::new("Open payments", value, theme)
        .caption(settlement.mode().label())
        .tone(tone)
        .render(frame, cols[2]);
}

fn render_expenses(frame: &mut Frame<'_>, area: Rect, details: &GroupDetails, theme: &Theme) {
    let card = Card::new("Expenses", theme);
    let inner = card.draw(frame, area);

    let Some(expenses) = ready_or_placeholder(frame, inner, &details.expenses, "", theme) else {
        return;
    };
    if expenses.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No expenses yet. Press a to add one.",
                Style::default().fg(theme.text_muted),
            )),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = expenses
        .iter()
        .map(|expense| {
            let split: Vec<&str> = expense
                .split_among
                .iter()
                .map(|member| member.name.as_str())
                .collect();
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        expense.created_at.format("%Y-%m-%d ").to_string(),
                        Style::default().fg(theme.text_muted),
                    ),
                    Span::styled(expense.payer.name.clone(), Style::default().fg(theme.text)),
                    Span::raw(" paid "),
                    amount_span(expense.amount, theme),
                ]),
                Line::from(Span::styled(
                    format!("           split among {}", split.join(", ")),
                    Style::default().fg(theme.text_muted),
                )),
            ])
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}

fn render_settlement(frame: &mut Frame<'_>, area: Rect, details: &GroupDetails, theme: &Theme) {
    let settlement = &details.settlement;
    let card = Card::new(settlement.mode().label(), theme).focused(true);
    let inner = card.draw(frame, area);

    let Some(edges) = ready_or_placeholder(frame, inner, settlement.current(), "", theme) else {
        return;
    };
    if edges.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No balances to settle",
                Style::default().fg(theme.positive),
            )),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = edges
        .iter()
        .map(|edge| {
            let amount = match Money::from_major(edge.amount) {
                Some(amount) => debt_span(amount, theme),
                None => Span::raw(edge.amount.to_string()),
            };
            ListItem::new(Line::from(vec![
                Span::styled(edge.from_name.clone(), Style::default().fg(theme.text)),
                Span::styled(" owes ", Style::default().fg(theme.text_muted)),
                Span::styled(edge.to_name.clone(), Style::default().fg(theme.text)),
                Span::raw(" "),
                amount,
            ]))
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}
