use divvy_engine::Resource;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::Paragraph,
};

use crate::ui::theme::Theme;

/// Renders the placeholder for a resource that is not ready.
///
/// Returns the loaded value, leaving the area untouched, when it is.
pub fn ready_or_placeholder<'r, T>(
    frame: &mut Frame<'_>,
    area: Rect,
    resource: &'r Resource<T>,
    not_found: &str,
    theme: &Theme,
) -> Option<&'r T> {
    let (text, style) = match resource {
        Resource::Ready(value) => return Some(value),
        Resource::Loading => ("Loading...".to_string(), Style::default().fg(theme.text_muted)),
        Resource::NotFound => (not_found.to_string(), Style::default().fg(theme.text_muted)),
        Resource::Failed(message) => (message.clone(), Style::default().fg(theme.error)),
    };
    frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
    None
}

/// Renders a form error line, if any.
pub fn render_error(frame: &mut Frame<'_>, area: Rect, error: Option<&str>, theme: &Theme) {
    if let Some(message) = error {
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(theme.error))),
            area,
        );
    }
}
