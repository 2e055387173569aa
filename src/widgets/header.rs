use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Widget},
};

pub const TITLE: &str = "Products";

/// Label of the chart toggle; names the action a press will take
pub fn toggle_label(chart_visible: bool) -> &'static str {
    if chart_visible {
        "Hide chart"
    } else {
        "Show chart"
    }
}

/// Title line with the chart toggle control on the right
pub struct Header {
    chart_visible: bool,
    toggle_color: Color,
}

impl Header {
    pub fn new(chart_visible: bool) -> Self {
        Self {
            chart_visible,
            toggle_color: Color::Blue,
        }
    }

    pub fn with_toggle_color(mut self, color: Color) -> Self {
        self.toggle_color = color;
        self
    }

    fn button_text(&self) -> String {
        format!(" ▂▄▆ {} [c] ", toggle_label(self.chart_visible))
    }

    /// Area the toggle occupies within `area`; clicks here flip the chart
    pub fn toggle_area(&self, area: Rect) -> Rect {
        let width = (self.button_text().chars().count() as u16).min(area.width);
        Rect::new(area.right() - width, area.y, width, area.height.min(1))
    }
}

impl Widget for &Header {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let toggle = self.toggle_area(area);
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(toggle.width)])
            .split(area);

        Paragraph::new(TITLE)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .render(layout[0], buf);
        Paragraph::new(self.button_text())
            .style(
                Style::default()
                    .bg(self.toggle_color)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .render(layout[1], buf);
    }
}
