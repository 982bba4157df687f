use divvy_engine::{CreateExpenseForm, Money, SplitAllocator, SplitMode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
    app::{AppState, ExpenseField, ExpenseState},
    ui::{
        components::{
            card::Card,
            input::{checkbox, render_input},
            money::{format_amount, remainder_span},
            status::{ready_or_placeholder, render_error},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let Some(expense) = state.expense.as_ref() else {
        return;
    };
    let form = &expense.form;

    let title = form.group().ready().map_or_else(
        || "Add expense".to_string(),
        |group| format!("Add expense to {}", group.name),
    );
    let card = Card::new(&title, &theme);
    let inner = card.draw(frame, area);

    if ready_or_placeholder(frame, inner, form.group(), "Group not found", &theme).is_none() {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Amount
            Constraint::Length(1), // Payer
            Constraint::Length(1), // Spacer
            Constraint::Min(4),    // Split
            Constraint::Length(1), // Status / error
        ])
        .split(inner);

    render_input(
        frame,
        rows[0],
        "Amount",
        &form.amount,
        expense.focus == ExpenseField::Amount && !form.is_busy(),
        &theme,
    );
    render_payer(frame, rows[1], expense, &theme);
    if let Some(split) = form.split() {
        render_split(frame, rows[3], expense, split, &theme);
    }

    if form.is_busy() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Adding expense...",
                Style::default().fg(theme.text_muted),
            )),
            rows[4],
        );
    } else {
        render_error(frame, rows[4], form.error(), &theme);
    }
}

fn render_payer(frame: &mut Frame<'_>, area: Rect, expense: &ExpenseState, theme: &Theme) {
    let form = &expense.form;
    let name = form
        .payer()
        .and_then(|payer| form.group().ready()?.member(payer))
        .map_or("select who paid", |member| member.name.as_str());
    let focused = expense.focus == ExpenseField::Payer;
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };
    let mut spans = vec![
        Span::styled("Paid by: ", Style::default().fg(theme.text_muted)),
        Span::styled(name.to_string(), style),
    ];
    if focused {
        spans.push(Span::styled(" ↑↓", Style::default().fg(theme.text_muted)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Even share per selected member, for display only. The server does the
/// actual division.
fn equal_share(form: &CreateExpenseForm, split: &SplitAllocator) -> Option<Money> {
    let amount = form.amount_value().filter(|amount| amount.is_positive())?;
    let count = i64::try_from(split.selected().len()).ok().filter(|n| *n > 0)?;
    Some(Money::new(amount.cents() / count))
}

fn render_split(
    frame: &mut Frame<'_>,
    area: Rect,
    expense: &ExpenseState,
    split: &SplitAllocator,
    theme: &Theme,
) {
    let focused = expense.focus == ExpenseField::Split;
    let title = format!("Split: {}", split.mode().label());
    let card = Card::new(&title, theme).focused(focused);
    let inner = card.draw(frame, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let form = &expense.form;
    let group = form.group().ready();
    let share = equal_share(form, split);

    let items: Vec<ListItem> = split
        .members()
        .iter()
        .map(|member| {
            let selected = split.is_selected(member);
            let name = group
                .and_then(|group| group.member(member))
                .map_or(member.as_str(), |user| user.name.as_str());
            let detail = match (split.mode(), selected) {
                (_, false) => String::new(),
                (SplitMode::Equal, true) => share.map(format_amount).unwrap_or_default(),
                (SplitMode::Custom, true) => {
                    let typed = expense
                        .custom_inputs
                        .get(member)
                        .map_or("", String::as_str);
                    format!("$ {typed}")
                }
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} {name:<20} ", checkbox(selected))),
                Span::styled(detail, Style::default().fg(theme.text_muted)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .style(Style::default().fg(theme.text))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        );
    let mut list_state = ListState::default().with_selected(focused.then_some(expense.cursor));
    frame.render_stateful_widget(list, parts[0], &mut list_state);

    if split.mode() == SplitMode::Custom {
        let total = split.custom_total();
        let mut spans = vec![
            Span::styled("Total: ", Style::default().fg(theme.text_muted)),
            Span::raw(format_amount(total)),
        ];
        if let Some(amount) = form.amount_value() {
            spans.push(Span::raw(format!(" of {}  ", format_amount(amount))));
            spans.push(remainder_span(total, amount, split.is_balanced(amount), theme));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), parts[1]);
    }
}
