use divvy_engine::Money;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Formats an amount for display, e.g. `$12.50`.
#[must_use]
pub fn format_amount(amount: Money) -> String {
    format!("${amount}")
}

/// A plain amount in the regular text color.
#[must_use]
pub fn amount_span(amount: Money, theme: &Theme) -> Span<'static> {
    Span::styled(format_amount(amount), Style::default().fg(theme.text))
}

/// An amount someone owes, in bold debt color.
#[must_use]
pub fn debt_span(amount: Money, theme: &Theme) -> Span<'static> {
    Span::styled(
        format_amount(amount),
        Style::default()
            .fg(theme.negative)
            .add_modifier(Modifier::BOLD),
    )
}

/// How far a custom split is from the expense total.
///
/// Green once balanced, otherwise the signed remainder in the debt color.
#[must_use]
pub fn remainder_span(total: Money, amount: Money, balanced: bool, theme: &Theme) -> Span<'static> {
    if balanced {
        return Span::styled("balanced", Style::default().fg(theme.positive));
    }
    let text = if total > amount {
        format!("over by {}", format_amount(total - amount))
    } else {
        format!("{} left", format_amount(amount - total))
    };
    Span::styled(text, Style::default().fg(theme.negative))
}
