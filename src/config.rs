use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use supports_color::Stream;

use crate::catalog::DEFAULT_CATALOG_URL;
use crate::widgets::category_chart::MAX_BAR_WIDTH;

/// Name of the user config file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Locates storeview's config directory and reads or writes the user config file in it
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Use `config_dir` as is; tests point this at a temporary directory
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// `<platform config dir>/<app_name>`, e.g. `~/.config/storeview` on Linux
    pub fn new(app_name: &str) -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| eyre!("No config directory on this platform"))?;
        Ok(Self::with_dir(base.join(app_name)))
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir).map_err(|e| {
            eyre!(
                "Could not create config directory {}: {}",
                self.config_dir.display(),
                e
            )
        })
    }

    /// The commented template written by `--generate-config`
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write the template to the user config file. An existing file is kept unless `force` is set.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let target = self.config_path(CONFIG_FILE);
        if target.exists() && !force {
            return Err(eyre!(
                "{} already exists; pass --force to replace it",
                target.display()
            ));
        }
        self.ensure_config_dir()?;
        std::fs::write(&target, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(target)
    }

    /// The user config file as written; a missing file reads as all defaults
    pub fn load_user_config(&self) -> Result<AppConfig> {
        let source = self.config_path(CONFIG_FILE);
        let content = match std::fs::read_to_string(&source) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
            Err(e) => return Err(eyre!("Failed to read config file at {}: {}", source.display(), e)),
        };
        toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file at {}: {}", source.display(), e))
    }
}

/// Everything read from `config.toml`, after defaults and command-line flags are applied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Template format version; only 0.1.x is accepted
    pub version: String,
    pub catalog: CatalogConfig,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

/// Where the product list comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the category chart at startup
    pub show_chart: bool,
    /// Height in rows of the chart panel, including its border
    pub chart_height: u16,
    pub bar_width: u16,
    /// Text placed before every price
    pub price_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

/// Color configuration for the application theme.
///
/// Colors can be named ("cyan"), hex ("#ff0000"), indexed ("indexed(236)") or the special
/// modifier "reversed" for the selected row.
///
/// - `keybind_hints` / `keybind_labels`: keys and labels in the controls bar
/// - `toggle`: the show/hide chart control in the header
/// - `table_header`, `table_header_bg`, `table_selected`: product table
/// - `chart_bar`, `chart_bar_hovered`, `chart_tooltip`: category chart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub keybind_hints: String,
    pub keybind_labels: String,
    pub toggle: String,
    pub dimmed: String,
    pub background: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub table_header: String,
    pub table_header_bg: String,
    pub table_selected: String,
    pub input_border: String,
    pub input_border_active: String,
    pub chart_bar: String,
    pub chart_bar_hovered: String,
    pub chart_tooltip: String,
    pub cursor_focused: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

// Default implementations
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            catalog: CatalogConfig::default(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_chart: false,
            chart_height: 14,
            bar_width: 9,
            price_prefix: "$".to_string(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            keybind_hints: "cyan".to_string(),
            keybind_labels: "indexed(252)".to_string(),
            toggle: "#0f47ff".to_string(),
            dimmed: "dark_gray".to_string(),
            background: "default".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "default".to_string(),
            text_secondary: "dark_gray".to_string(),
            table_header: "white".to_string(),
            table_header_bg: "indexed(235)".to_string(),
            table_selected: "reversed".to_string(),
            input_border: "dark_gray".to_string(),
            input_border_active: "cyan".to_string(),
            chart_bar: "#0f47ff".to_string(),
            chart_bar_hovered: "cyan".to_string(),
            chart_tooltip: "yellow".to_string(),
            cursor_focused: "default".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the user file on top
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from(&config_manager)
    }

    /// Load configuration using the given config directory
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(config_manager.load_user_config()?);
        config.validate()?;
        Ok(config)
    }

    /// Fields of `other` that differ from the defaults replace ours
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.catalog.merge(other.catalog);
        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    /// Apply command-line overrides (highest precedence layer)
    pub fn apply_args(&mut self, args: &crate::Args) {
        if let Some(url) = &args.url {
            self.catalog.url = url.clone();
        }
        if let Some(timeout) = args.timeout_secs {
            self.catalog.timeout_secs = timeout;
        }
        if args.show_chart {
            self.display.show_chart = true;
        }
        if args.debug {
            self.debug.enabled = true;
        }
    }

    /// Reject values the UI or the fetch cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        let url = self.catalog.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(eyre!(
                "Invalid catalog url: '{}'. Must start with http:// or https://",
                self.catalog.url
            ));
        }

        if self.catalog.timeout_secs == 0 {
            return Err(eyre!("timeout_secs must be greater than 0"));
        }

        if self.display.bar_width == 0 || self.display.bar_width > MAX_BAR_WIDTH {
            return Err(eyre!(
                "bar_width must be between 1 and {}",
                MAX_BAR_WIDTH
            ));
        }

        // Border, tooltip line, bars, and the label row
        if self.display.chart_height < 5 {
            return Err(eyre!("chart_height must be at least 5"));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }
}

impl CatalogConfig {
    pub fn merge(&mut self, other: Self) {
        let default = CatalogConfig::default();
        if other.url != default.url {
            self.url = other.url;
        }
        if other.timeout_secs != default.timeout_secs {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.show_chart != default.show_chart {
            self.show_chart = other.show_chart;
        }
        if other.chart_height != default.chart_height {
            self.chart_height = other.chart_height;
        }
        if other.bar_width != default.bar_width {
            self.bar_width = other.bar_width;
        }
        if other.price_prefix != default.price_prefix {
            self.price_prefix = other.price_prefix;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

macro_rules! color_fields {
    ($mac:ident) => {
        $mac!(keybind_hints);
        $mac!(keybind_labels);
        $mac!(toggle);
        $mac!(dimmed);
        $mac!(background);
        $mac!(controls_bg);
        $mac!(text_primary);
        $mac!(text_secondary);
        $mac!(table_header);
        $mac!(table_header_bg);
        $mac!(table_selected);
        $mac!(input_border);
        $mac!(input_border_active);
        $mac!(chart_bar);
        $mac!(chart_bar_hovered);
        $mac!(chart_tooltip);
        $mac!(cursor_focused);
    };
}

impl ColorConfig {
    /// All color settings as (name, value) pairs
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = Vec::new();
        macro_rules! push {
            ($field:ident) => {
                entries.push((stringify!($field), self.$field.as_str()));
            };
        }
        color_fields!(push);
        entries
    }

    /// Every entry must be a color `ColorParser` understands
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        macro_rules! merge {
            ($field:ident) => {
                if other.$field != default.$field {
                    self.$field = other.$field.clone();
                }
            };
        }
        color_fields!(merge);
    }
}

/// How many colors the attached terminal can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorDepth {
    Monochrome,
    Basic,
    Palette,
    TrueColor,
}

/// Turns color strings from the config into colors the terminal can show
pub struct ColorParser {
    depth: ColorDepth,
}

impl ColorParser {
    /// Detect the terminal's color depth; `NO_COLOR` turns every color into `Reset`
    pub fn new() -> Self {
        let depth = if std::env::var_os("NO_COLOR").is_some() {
            ColorDepth::Monochrome
        } else {
            match supports_color::on(Stream::Stdout) {
                Some(level) if level.has_16m => ColorDepth::TrueColor,
                Some(level) if level.has_256 => ColorDepth::Palette,
                _ => ColorDepth::Basic,
            }
        };
        Self { depth }
    }

    /// Accepts `#rrggbb`, `indexed(N)` and color names such as `cyan` or `bright_red`
    pub fn parse(&self, s: &str) -> Result<Color> {
        let value = s.trim().to_lowercase();
        let color = if value.starts_with('#') {
            let (r, g, b) = parse_hex(&value)?;
            self.fit_rgb(r, g, b)
        } else if let Some(index) = value
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let index = index.trim().parse::<u8>().map_err(|_| {
                eyre!("Invalid indexed color '{}', expected indexed(0-255)", s.trim())
            })?;
            Color::Indexed(index)
        } else {
            named_color(&value).ok_or_else(|| {
                eyre!(
                    "Unknown color '{}', expected a color name, bright_<name>, indexed(0-255) or #rrggbb",
                    s.trim()
                )
            })?
        };

        if self.depth == ColorDepth::Monochrome {
            return Ok(Color::Reset);
        }
        Ok(color)
    }

    fn fit_rgb(&self, r: u8, g: u8, b: u8) -> Color {
        match self.depth {
            ColorDepth::TrueColor => Color::Rgb(r, g, b),
            ColorDepth::Palette => Color::Indexed(rgb_to_256_color(r, g, b)),
            ColorDepth::Basic | ColorDepth::Monochrome => rgb_to_basic_ansi(r, g, b),
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Names are compared without `_` or spaces, so `bright red` and `bright_red` agree
fn named_color(name: &str) -> Option<Color> {
    let compact = name.replace(['_', ' '], "");
    let color = match compact.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "brightblack" | "gray" | "grey" | "darkgray" | "darkgrey" => Color::Indexed(8),
        "brightred" => Color::Indexed(9),
        "brightgreen" => Color::Indexed(10),
        "brightyellow" => Color::Indexed(11),
        "brightblue" => Color::Indexed(12),
        "brightmagenta" => Color::Indexed(13),
        "brightcyan" => Color::Indexed(14),
        "brightwhite" => Color::Indexed(15),
        "lightgray" | "lightgrey" => Color::Indexed(7),
        // Widgets treat Reset as "leave the terminal default" (reversed is applied as a modifier)
        "default" | "reset" | "reversed" => Color::Reset,
        _ => return None,
    };
    Some(color)
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let digits = s
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| eyre!("Invalid hex color '{}', expected #rrggbb", s))?;
    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| eyre!("Invalid hex color '{}', expected #rrggbb", s))?;
    Ok(((value >> 16) as u8, (value >> 8) as u8, value as u8))
}

type Rgb = (u8, u8, u8);

fn distance(a: Rgb, b: Rgb) -> u32 {
    let d = |x: u8, y: u8| (x as i32 - y as i32).pow(2) as u32;
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

/// Nearest xterm palette entry, from either the 6x6x6 cube or the gray ramp
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let step = |v: u8| -> u8 {
        let mut best = 0;
        for (i, level) in LEVELS.iter().enumerate() {
            if (*level as i16 - v as i16).abs() < (LEVELS[best] as i16 - v as i16).abs() {
                best = i;
            }
        }
        best as u8
    };

    let (ri, gi, bi) = (step(r), step(g), step(b));
    let cube = (
        LEVELS[ri as usize],
        LEVELS[gi as usize],
        LEVELS[bi as usize],
    );

    // Ramp entries 232..=255 run from 8 to 238 in steps of 10
    let average = (r as u16 + g as u16 + b as u16) / 3;
    let ramp = (average.saturating_sub(3) / 10).min(23) as u8;
    let gray = 8 + 10 * ramp;

    if distance((r, g, b), (gray, gray, gray)) < distance((r, g, b), cube) {
        232 + ramp
    } else {
        16 + 36 * ri + 6 * gi + bi
    }
}

/// Nearest of the eight basic ANSI colors, using xterm's default values for them
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    const BASIC: [(Color, Rgb); 8] = [
        (Color::Black, (0, 0, 0)),
        (Color::Red, (205, 0, 0)),
        (Color::Green, (0, 205, 0)),
        (Color::Yellow, (205, 205, 0)),
        (Color::Blue, (0, 0, 238)),
        (Color::Magenta, (205, 0, 205)),
        (Color::Cyan, (0, 205, 205)),
        (Color::White, (229, 229, 229)),
    ];
    BASIC
        .iter()
        .min_by_key(|(_, rgb)| distance((r, g, b), *rgb))
        .map(|(color, _)| *color)
        .unwrap_or(Color::Reset)
}

/// Theme colors keyed by their config name
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Unknown names fall back to the terminal default
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Theme {
            colors: HashMap::new(),
        })
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
