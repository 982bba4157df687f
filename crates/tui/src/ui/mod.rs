pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, ExpenseField, GroupField, Screen};
use components::hints::{KeyHint, common, hint_separator, hints_to_spans};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Min(0),    // Screen
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);

    let content = layout[1];
    match state.screen {
        Screen::Dashboard => screens::dashboard::render(frame, content, state),
        Screen::CreateUser => screens::create_user::render(frame, content, state),
        Screen::CreateGroup => screens::create_group::render(frame, content, state),
        Screen::GroupDetails => screens::group_details::render(frame, content, state),
        Screen::AddExpense => screens::add_expense::render(frame, content, state),
    }

    render_bottom_bar(frame, layout[2], state, &theme);
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            " Divvy",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" › ", Style::default().fg(theme.text_muted)),
        Span::raw(state.screen.label()),
        Span::styled("  API", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}", state.base_url)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = hints_to_spans(&context_hints(state), theme);
    parts.push(hint_separator(theme));
    parts.extend(hints_to_spans(&common::global_shortcuts(), theme));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

/// Keyboard hints for the screen and field in focus.
fn context_hints(state: &AppState) -> Vec<KeyHint> {
    match state.screen {
        Screen::Dashboard => vec![
            KeyHint::new("↑↓", "select"),
            KeyHint::new("Enter", "open"),
            KeyHint::new("g", "new group"),
            KeyHint::new("u", "new user"),
            KeyHint::new("r", "refresh"),
            KeyHint::new("q", "quit"),
        ],
        Screen::CreateUser => vec![
            KeyHint::new("Enter", "create"),
            KeyHint::new("Esc", "cancel"),
        ],
        Screen::CreateGroup => {
            let mut hints = common::form_editing();
            if state.create_group.focus == GroupField::Members {
                hints.push(KeyHint::new("Space", "add/remove"));
                if state.create_group.form.users().error().is_some() {
                    hints.push(KeyHint::new("r", "retry"));
                }
            }
            hints
        }
        Screen::GroupDetails => vec![
            KeyHint::new("a", "add expense"),
            KeyHint::new("s", "switch balances"),
            KeyHint::new("r", "refresh"),
            KeyHint::new("Esc", "back"),
        ],
        Screen::AddExpense => {
            let mut hints = common::form_editing();
            match state.expense.as_ref().map(|expense| expense.focus) {
                Some(ExpenseField::Payer) => hints.push(KeyHint::new("↑↓", "payer")),
                Some(ExpenseField::Split) => {
                    hints.push(KeyHint::new("Space", "include"));
                    hints.push(KeyHint::new("m", "equal/custom"));
                }
                _ => {}
            }
            hints
        }
    }
}
