use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

const NORMAL_CONTROLS: [(&str, &str); 5] = [
    ("/", "Search"),
    ("c", "Chart"),
    ("↑↓", "Select"),
    ("←→", "Bar"),
    ("q", "Quit"),
];

const EDITING_CONTROLS: [(&str, &str); 2] = [("Enter", "Done"), ("Esc", "Done")];

/// Key hints strip at the bottom of the screen
#[derive(Default)]
pub struct Controls {
    pub row_count: Option<usize>,
    pub editing: bool,
    pub key_color: Option<Color>,
    pub label_color: Option<Color>,
    pub background: Option<Color>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = Some(row_count);
        self
    }

    pub fn with_editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    pub fn with_colors(mut self, key: Color, label: Color, background: Color) -> Self {
        self.key_color = Some(key);
        self.label_color = Some(label);
        self.background = Some(background);
        self
    }

    fn controls(&self) -> &'static [(&'static str, &'static str)] {
        if self.editing {
            &EDITING_CONTROLS
        } else {
            &NORMAL_CONTROLS
        }
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controls = self.controls();

        let mut constraints = controls.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));
        if self.row_count.is_some() {
            constraints.push(Constraint::Length(15)); // "Rows: 12345"
        }

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let bg = self.background.unwrap_or(Color::DarkGray);
        let key_style = Style::default().fg(self.key_color.unwrap_or(Color::Reset));
        let label_style = Style::default()
            .bg(bg)
            .fg(self.label_color.unwrap_or(Color::Reset));

        for (i, (key, action)) in controls.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(key_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(label_style)
                .render(layout[j + 1], buf);
        }

        let fill_idx = controls.len() * 2;
        Paragraph::new("")
            .style(Style::default().bg(bg))
            .render(layout[fill_idx], buf);

        if let Some(count) = self.row_count {
            Paragraph::new(format!("Rows: {}", count))
                .style(label_style)
                .right_aligned()
                .render(layout[fill_idx + 1], buf);
        }
    }
}
