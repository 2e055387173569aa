use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, StatefulWidget};
use ratatui::{buffer::Buffer, widgets::Widget};
use std::sync::mpsc::Sender;
use tracing::{debug, error, trace};

pub mod aggregate;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod filter;
pub mod logging;
pub mod widgets;

pub use aggregate::{count_by_category, CategoryCount};
pub use cache::CacheManager;
pub use catalog::{CatalogClient, FetchError, FetchHandle, Product, ProductId};
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use filter::filter_products;
pub use storeview_cli::Args;

use config::DisplayConfig;
use widgets::category_chart::{CategoryChart, ChartGeometry};
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::header::Header;
use widgets::product_table::{ProductTable, ProductTableState};
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for config/cache directories
pub const APP_NAME: &str = "storeview";

pub const SEARCH_PLACEHOLDER: &str = "Search by name or category";

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Start the one catalog request for this app
    Fetch,
    CatalogLoaded(Result<Vec<Product>, FetchError>),
    Exit,
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Keys go to the search input
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Pending,
    Loaded(usize),
    Failed,
    Cancelled,
}

pub struct App {
    events: Sender<AppEvent>,
    catalog: CatalogClient,
    fetch: Option<FetchHandle>,
    fetch_state: FetchState,
    products: Vec<Product>,
    search: TextInput,
    pub input_mode: InputMode,
    show_chart: bool,
    hovered_bar: Option<usize>,
    table: ProductTableState,
    chart_geometry: Option<ChartGeometry>,
    toggle_area: Rect,
    debug: DebugState,
    theme: Theme,
    display: DisplayConfig,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        Self::new_with_config(events, Theme::default(), AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, app_config: AppConfig) -> App {
        let search = TextInput::new()
            .with_placeholder(SEARCH_PLACEHOLDER)
            .with_theme(&theme);
        let mut debug = DebugState::default();
        debug.enabled = app_config.debug.enabled;
        debug.fetch_status = "idle".to_string();

        App {
            events,
            catalog: CatalogClient::from_config(&app_config.catalog),
            fetch: None,
            fetch_state: FetchState::Idle,
            products: Vec::new(),
            search,
            input_mode: InputMode::Normal,
            show_chart: app_config.display.show_chart,
            hovered_bar: None,
            table: ProductTableState::new(),
            chart_geometry: None,
            toggle_area: Rect::default(),
            debug,
            theme,
            display: app_config.display,
        }
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn search_term(&self) -> &str {
        self.search.value()
    }

    pub fn chart_visible(&self) -> bool {
        self.show_chart
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch_state
    }

    pub fn fetch_handle(&self) -> Option<&FetchHandle> {
        self.fetch.as_ref()
    }

    /// Products matching the current search term, in catalog order
    pub fn filtered(&self) -> Vec<&Product> {
        filter_products(&self.products, self.search.value())
    }

    /// Category counts over the currently filtered products
    pub fn category_counts(&self) -> Vec<CategoryCount> {
        count_by_category(&self.filtered())
    }

    pub fn hovered_bar(&self) -> Option<usize> {
        self.hovered_bar
    }

    pub fn selected_product(&self) -> Option<&Product> {
        let id = self.table.selected_id()?;
        self.products.iter().find(|p| &p.id == id)
    }

    /// Replace the search term as if typed
    pub fn set_search_term(&mut self, term: &str) {
        self.search.set_value(term);
        self.on_search_changed();
    }

    fn on_search_changed(&mut self) {
        trace!(term = self.search.value(), "search changed");
        let filtered = filter_products(&self.products, self.search.value());
        self.table.sync(&filtered);
        let bars = count_by_category(&filtered).len();
        self.hovered_bar = match self.hovered_bar {
            Some(_) if bars == 0 => None,
            Some(i) => Some(i.min(bars - 1)),
            None => None,
        };
    }

    pub fn toggle_chart(&mut self) {
        self.show_chart = !self.show_chart;
        if !self.show_chart {
            self.chart_geometry = None;
        }
        debug!(visible = self.show_chart, "chart toggled");
        self.debug.action("toggle_chart");
    }

    /// Start the catalog request. Only the first call per app does anything.
    pub fn start_fetch(&mut self) {
        if self.fetch_state != FetchState::Idle {
            return;
        }
        match catalog::spawn_fetch(self.catalog.clone(), self.events.clone()) {
            Ok(handle) => {
                self.fetch = Some(handle);
                self.set_fetch_state(FetchState::Pending);
            }
            Err(e) => {
                error!(error = %e, detail = ?e, "catalog fetch failed");
                self.set_fetch_state(FetchState::Failed);
            }
        }
    }

    /// Tear down: a fetch still in flight is cancelled and its result ignored.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.fetch.as_ref().filter(|h| !h.is_cancelled()) {
            handle.cancel();
        }
        if matches!(self.fetch_state, FetchState::Idle | FetchState::Pending) {
            debug!("catalog fetch cancelled");
            self.set_fetch_state(FetchState::Cancelled);
        }
    }

    fn set_fetch_state(&mut self, state: FetchState) {
        self.fetch_state = state;
        self.debug.fetch_status = match state {
            FetchState::Idle => "idle".to_string(),
            FetchState::Pending => "pending".to_string(),
            FetchState::Loaded(n) => format!("loaded {}", n),
            FetchState::Failed => "failed".to_string(),
            FetchState::Cancelled => "cancelled".to_string(),
        };
    }

    fn on_catalog_loaded(&mut self, result: &Result<Vec<Product>, FetchError>) {
        match self.fetch_state {
            FetchState::Idle | FetchState::Pending => {}
            _ => {
                debug!("ignoring catalog result; app already settled");
                return;
            }
        }
        match result {
            Ok(products) => {
                self.products = products.clone();
                self.set_fetch_state(FetchState::Loaded(self.products.len()));
                self.on_search_changed();
            }
            // Already logged by the fetch worker; the list stays empty.
            Err(_) => self.set_fetch_state(FetchState::Failed),
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        if self.input_mode == InputMode::Editing {
            match self.search.handle_key(event) {
                TextInputEvent::Changed => {
                    self.debug.action("search");
                    self.on_search_changed();
                }
                TextInputEvent::Submit | TextInputEvent::Cancel => {
                    self.input_mode = InputMode::Normal;
                    self.search.set_focused(false);
                    self.debug.action("leave_search");
                }
                TextInputEvent::None => {}
            }
            return None;
        }

        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppEvent::Exit),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Editing;
                self.search.set_focused(true);
                self.debug.action("focus_search");
                return None;
            }
            KeyCode::Char('c') => {
                self.toggle_chart();
                return None;
            }
            _ => {}
        }

        let filtered = filter_products(&self.products, self.search.value());
        match event.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.table.select_next(&filtered);
                self.debug.action("select_next");
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.table.select_previous(&filtered);
                self.debug.action("select_previous");
            }
            KeyCode::Home | KeyCode::Char('g') => self.table.select_first(&filtered),
            KeyCode::End | KeyCode::Char('G') => self.table.select_last(&filtered),
            KeyCode::Left | KeyCode::Char('h') if self.show_chart => {
                self.hovered_bar = match self.hovered_bar {
                    Some(i) => Some(i.saturating_sub(1)),
                    None if filtered.is_empty() => None,
                    None => Some(0),
                };
                self.debug.action("bar_left");
            }
            KeyCode::Right | KeyCode::Char('l') if self.show_chart => {
                let bars = count_by_category(&filtered).len();
                self.hovered_bar = match self.hovered_bar {
                    _ if bars == 0 => None,
                    Some(i) => Some((i + 1).min(bars - 1)),
                    None => Some(0),
                };
                self.debug.action("bar_right");
            }
            _ => {}
        }
        None
    }

    fn mouse(&mut self, event: &MouseEvent) -> Option<AppEvent> {
        self.debug.num_mouse_events += 1;
        let position = Position::new(event.column, event.row);
        let bar = self
            .chart_geometry
            .filter(|_| self.show_chart)
            .and_then(|g| g.bar_at(event.column, event.row));

        match event.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if bar.is_some() {
                    self.hovered_bar = bar;
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if self.toggle_area.contains(position) {
                    self.toggle_chart();
                } else if bar.is_some() {
                    self.hovered_bar = bar;
                }
            }
            MouseEventKind::ScrollDown => {
                let filtered = filter_products(&self.products, self.search.value());
                self.table.select_next(&filtered);
            }
            MouseEventKind::ScrollUp => {
                let filtered = filter_products(&self.products, self.search.value());
                self.table.select_previous(&filtered);
            }
            _ => {}
        }
        None
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Mouse(mouse) => self.mouse(mouse),
            AppEvent::Fetch => {
                self.start_fetch();
                None
            }
            AppEvent::CatalogLoaded(result) => {
                self.on_catalog_loaded(result);
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit => None,
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        Block::default()
            .style(Style::default().bg(self.color("background")))
            .render(area, buf);

        let mut constraints = vec![
            Constraint::Length(1), // header
            Constraint::Length(3), // search
            Constraint::Fill(1),   // table
        ];
        if self.show_chart {
            constraints.push(Constraint::Length(self.display.chart_height));
        }
        constraints.push(Constraint::Length(1)); // controls
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let toggle_color = self.color("toggle");
        let header_fg = self.color("table_header");
        let header_bg = self.color("table_header_bg");
        let selected = self.color("table_selected");
        let input_border = if self.input_mode == InputMode::Editing {
            self.color("input_border_active")
        } else {
            self.color("input_border")
        };
        let chart_colors = (
            self.color("chart_bar"),
            self.color("chart_bar_hovered"),
            self.color("chart_tooltip"),
            self.color("dimmed"),
        );
        let control_colors = (
            self.color("keybind_hints"),
            self.color("keybind_labels"),
            self.color("controls_bg"),
        );

        let header = Header::new(self.show_chart).with_toggle_color(toggle_color);
        self.toggle_area = header.toggle_area(layout[0]);
        (&header).render(layout[0], buf);

        let search_block = Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .border_style(Style::default().fg(input_border));
        let search_area = search_block.inner(layout[1]);
        search_block.render(layout[1], buf);
        (&self.search).render(search_area, buf);

        let filtered = filter_products(&self.products, self.search.value());
        self.table.sync(&filtered);
        ProductTable::new(&filtered, &self.display.price_prefix)
            .with_colors(header_fg, header_bg, selected)
            .render(layout[2], buf, &mut self.table);

        let mut next = 3;
        if self.show_chart {
            let counts = count_by_category(&filtered);
            let (bar, hovered, tooltip, border) = chart_colors;
            let geometry = CategoryChart::new(&counts, self.display.bar_width)
                .with_hovered(self.hovered_bar)
                .with_colors(bar, hovered, tooltip, border)
                .render_with_geometry(layout[next], buf);
            self.chart_geometry = Some(geometry);
            next += 1;
        }

        let (key, label, bg) = control_colors;
        let controls = Controls::new()
            .with_row_count(filtered.len())
            .with_editing(self.input_mode == InputMode::Editing)
            .with_colors(key, label, bg);
        (&controls).render(layout[next], buf);

        if self.debug.enabled {
            (&self.debug).render(layout[next + 1], buf);
        }
    }
}
