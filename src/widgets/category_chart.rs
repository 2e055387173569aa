//! Bar chart of product counts per category, with a one-line tooltip for the hovered bar.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Widget},
};

use crate::aggregate::CategoryCount;

pub const BAR_GAP: u16 = 1;
/// Widest bar the chart accepts; wider values are clamped
pub const MAX_BAR_WIDTH: u16 = 64;

/// Where the bars were drawn on the last frame; used to map mouse positions to bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartGeometry {
    pub bars_area: Rect,
    pub bar_width: u16,
    pub first_bar: usize,
    pub visible_bars: usize,
}

impl ChartGeometry {
    /// How many bars of `bar_width` fit in `width`
    pub fn capacity(width: u16, bar_width: u16) -> usize {
        (width.saturating_add(BAR_GAP) / bar_width.saturating_add(BAR_GAP)) as usize
    }

    /// Index (into the full count list) of the bar under the given cell, if any.
    /// Gaps between bars do not hit.
    pub fn bar_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.bars_area;
        if column < area.x || column >= area.right() || row < area.y || row >= area.bottom() {
            return None;
        }
        let offset = column - area.x;
        let stride = self.bar_width.saturating_add(BAR_GAP);
        let slot = offset / stride;
        if offset % stride >= self.bar_width {
            return None;
        }
        let slot = slot as usize;
        (slot < self.visible_bars).then_some(self.first_bar + slot)
    }
}

/// Tooltip text for a bar: the exact category label and count
pub fn tooltip_text(count: &CategoryCount) -> String {
    format!("{}: {}", count.category, count.count)
}

/// Label for the top of the count axis
pub fn scale_label(max_count: usize) -> String {
    format!(" max count {} ", max_count)
}

pub struct CategoryChart<'a> {
    counts: &'a [CategoryCount],
    hovered: Option<usize>,
    bar_width: u16,
    bar_color: Color,
    hovered_color: Color,
    tooltip_color: Color,
    border_color: Color,
}

impl<'a> CategoryChart<'a> {
    pub fn new(counts: &'a [CategoryCount], bar_width: u16) -> Self {
        Self {
            counts,
            hovered: None,
            bar_width: bar_width.clamp(1, MAX_BAR_WIDTH),
            bar_color: Color::Blue,
            hovered_color: Color::Cyan,
            tooltip_color: Color::Yellow,
            border_color: Color::DarkGray,
        }
    }

    pub fn with_hovered(mut self, hovered: Option<usize>) -> Self {
        self.hovered = hovered.filter(|&i| i < self.counts.len());
        self
    }

    pub fn with_colors(mut self, bar: Color, hovered: Color, tooltip: Color, border: Color) -> Self {
        self.bar_color = bar;
        self.hovered_color = hovered;
        self.tooltip_color = tooltip;
        self.border_color = border;
        self
    }

    /// Render and report where the bars landed.
    pub fn render_with_geometry(self, area: Rect, buf: &mut Buffer) -> ChartGeometry {
        // Bar heights are relative to the largest count, so name it as the scale
        let max_count = CategoryCount::max(self.counts);
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .title(" Products per category ");
        if max_count > 0 {
            block = block.title(Line::from(scale_label(max_count)).right_aligned());
        }
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Fill(1)])
            .split(inner);
        let (tooltip_area, bars_area) = (layout[0], layout[1]);

        let tooltip = match self.hovered.and_then(|i| self.counts.get(i)) {
            Some(count) => Line::from(Span::styled(
                tooltip_text(count),
                Style::default()
                    .fg(self.tooltip_color)
                    .add_modifier(Modifier::BOLD),
            )),
            None => Line::from(Span::styled(
                "hover a bar or press ←/→ for exact counts",
                Style::default().fg(self.border_color),
            )),
        };
        Paragraph::new(tooltip).render(tooltip_area, buf);

        let capacity = ChartGeometry::capacity(bars_area.width, self.bar_width);
        // Scroll so the hovered bar is always on screen
        let first_bar = match self.hovered {
            Some(h) if capacity > 0 && h >= capacity => h + 1 - capacity,
            _ => 0,
        };
        let visible: Vec<(usize, &CategoryCount)> = self
            .counts
            .iter()
            .enumerate()
            .skip(first_bar)
            .take(capacity)
            .collect();

        let bars: Vec<Bar> = visible
            .iter()
            .map(|(i, count)| {
                let color = if Some(*i) == self.hovered {
                    self.hovered_color
                } else {
                    self.bar_color
                };
                Bar::default()
                    .label(Line::from(count.category.clone()))
                    .value(count.count as u64)
                    .text_value(count.count.to_string())
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(Color::Black).bg(color))
            })
            .collect();

        BarChart::default()
            .data(BarGroup::default().bars(&bars))
            .bar_width(self.bar_width)
            .bar_gap(BAR_GAP)
            .max(max_count.max(1) as u64)
            .render(bars_area, buf);

        ChartGeometry {
            bars_area,
            bar_width: self.bar_width,
            first_bar,
            visible_bars: visible.len(),
        }
    }
}

impl Widget for CategoryChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_with_geometry(area, buf);
    }
}
