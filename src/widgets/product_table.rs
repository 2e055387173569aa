use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Row, StatefulWidget, Table, TableState},
};

use crate::catalog::{Product, ProductId};

const HEADERS: [&str; 3] = ["Name", "Price", "Category"];

/// Table selection keyed by product identity rather than row index, so the selected product
/// stays selected while the filter changes around it.
#[derive(Debug, Default)]
pub struct ProductTableState {
    selected: Option<ProductId>,
    table_state: TableState,
}

impl ProductTableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_id(&self) -> Option<&ProductId> {
        self.selected.as_ref()
    }

    /// Row index of the selected product within `rows`
    pub fn selected_index(&self, rows: &[&Product]) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        rows.iter().position(|p| &p.id == selected)
    }

    /// Keep the selection valid for `rows`: the selected product if still visible,
    /// otherwise the first row (or nothing when empty).
    pub fn sync(&mut self, rows: &[&Product]) {
        let index = match self.selected_index(rows) {
            Some(index) => Some(index),
            None if rows.is_empty() => None,
            None => Some(0),
        };
        self.select_index(rows, index);
    }

    fn select_index(&mut self, rows: &[&Product], index: Option<usize>) {
        self.selected = index.and_then(|i| rows.get(i)).map(|p| p.id.clone());
        self.table_state.select(self.selected.as_ref().and(index));
    }

    pub fn select_next(&mut self, rows: &[&Product]) {
        self.step(rows, 1);
    }

    pub fn select_previous(&mut self, rows: &[&Product]) {
        self.step(rows, -1);
    }

    pub fn select_first(&mut self, rows: &[&Product]) {
        self.select_index(rows, if rows.is_empty() { None } else { Some(0) });
    }

    pub fn select_last(&mut self, rows: &[&Product]) {
        self.select_index(rows, rows.len().checked_sub(1));
    }

    fn step(&mut self, rows: &[&Product], delta: isize) {
        if rows.is_empty() {
            self.select_index(rows, None);
            return;
        }
        let index = match self.selected_index(rows) {
            Some(current) => current
                .saturating_add_signed(delta)
                .min(rows.len() - 1),
            None => 0,
        };
        self.select_index(rows, Some(index));
    }
}

/// Name / Price / Category table over the filtered products
pub struct ProductTable<'a> {
    rows: &'a [&'a Product],
    price_prefix: &'a str,
    header_fg: Color,
    header_bg: Color,
    selected_fg: Color,
}

impl<'a> ProductTable<'a> {
    pub fn new(rows: &'a [&'a Product], price_prefix: &'a str) -> Self {
        Self {
            rows,
            price_prefix,
            header_fg: Color::Reset,
            header_bg: Color::Reset,
            selected_fg: Color::Reset,
        }
    }

    /// `selected` of `Color::Reset` means reversed video (the "reversed" theme value)
    pub fn with_colors(mut self, header_fg: Color, header_bg: Color, selected: Color) -> Self {
        self.header_fg = header_fg;
        self.header_bg = header_bg;
        self.selected_fg = selected;
        self
    }

    fn price_width(&self) -> u16 {
        self.rows
            .iter()
            .map(|p| p.price_label(self.price_prefix).chars().count())
            .chain(std::iter::once(HEADERS[1].len()))
            .max()
            .unwrap_or(0) as u16
    }
}

impl StatefulWidget for ProductTable<'_> {
    type State = ProductTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let header = Row::new(HEADERS).style(
            Style::default()
                .fg(self.header_fg)
                .bg(self.header_bg)
                .add_modifier(Modifier::BOLD),
        );
        let rows = self.rows.iter().map(|p| {
            Row::new(vec![
                p.title.clone(),
                p.price_label(self.price_prefix),
                p.category.clone(),
            ])
        });
        let highlight = if self.selected_fg == Color::Reset {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(self.selected_fg)
        };
        let widths = [
            Constraint::Fill(3),
            Constraint::Length(self.price_width()),
            Constraint::Fill(1),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .row_highlight_style(highlight);
        StatefulWidget::render(table, area, buf, &mut state.table_state);
    }
}
