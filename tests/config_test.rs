use ratatui::style::Color;
use std::fs;
use storeview::config::{AppConfig, ColorParser, ConfigManager, Theme};
use storeview::Args;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.catalog.url, "https://fakestoreapi.com/products");
    assert_eq!(config.catalog.timeout_secs, 30);

    assert!(!config.display.show_chart);
    assert_eq!(config.display.price_prefix, "$");
    assert_eq!(config.display.bar_width, 9);

    assert_eq!(config.performance.event_poll_interval_ms, 25);

    assert_eq!(config.theme.colors.toggle, "#0f47ff");
    assert_eq!(config.theme.colors.chart_bar, "#0f47ff");
    assert_eq!(config.theme.colors.table_selected, "reversed");

    assert!(!config.debug.enabled);
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[catalog]"));
    assert!(template.contains("[display]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[debug]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());
    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[catalog]"));

    // Refuses to overwrite without force
    assert!(config_manager.write_default_config(false).is_err());
    assert!(config_manager.write_default_config(true).is_ok());
}

#[test]
fn test_load_without_file_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config = AppConfig::load_from(&config_manager).expect("Failed to load config");
    assert_eq!(config.catalog.url, AppConfig::default().catalog.url);
    assert!(!config.display.show_chart);
}

#[test]
fn test_partial_user_config_merges_over_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    // Unknown keys such as `color_mode` are ignored
    fs::write(
        config_manager.config_path("config.toml"),
        r#"
[catalog]
url = "http://localhost:8080/products"

[display]
show_chart = true

[theme]
color_mode = "dark"

[theme.colors]
chart_bar = "green"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&config_manager).expect("Failed to load config");
    assert_eq!(config.catalog.url, "http://localhost:8080/products");
    assert_eq!(config.catalog.timeout_secs, 30);
    assert!(config.display.show_chart);
    assert_eq!(config.display.chart_height, 14);
    assert_eq!(config.theme.colors.chart_bar, "green");
    assert_eq!(config.theme.colors.toggle, "#0f47ff");
}

#[test]
fn test_invalid_user_config_is_rejected() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();

    fs::write(
        config_manager.config_path("config.toml"),
        "[catalog]\nurl = \"ftp://example.com/products\"\n",
    )
    .unwrap();
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Invalid catalog url"));

    fs::write(config_manager.config_path("config.toml"), "[display\n").unwrap();
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_validation_limits() {
    let mut config = AppConfig::default();
    config.display.chart_height = 4;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.catalog.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.display.bar_width = u16::MAX;
    assert!(config.validate().is_err());
    config.display.bar_width = 64;
    config.validate().unwrap();

    let mut config = AppConfig::default();
    config.theme.colors.chart_bar = "not-a-color".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_command_line_overrides_config() {
    let mut config = AppConfig::default();
    let args = Args {
        url: Some("http://127.0.0.1:9000/items".to_string()),
        timeout_secs: Some(5),
        show_chart: true,
        debug: true,
        ..Args::default()
    };
    config.apply_args(&args);

    assert_eq!(config.catalog.url, "http://127.0.0.1:9000/items");
    assert_eq!(config.catalog.timeout_secs, 5);
    assert!(config.display.show_chart);
    assert!(config.debug.enabled);
    config.validate().unwrap();
}

#[test]
fn test_command_line_leaves_unset_values() {
    let mut config = AppConfig::default();
    config.display.show_chart = true;
    config.apply_args(&Args::default());
    assert!(config.display.show_chart);
    assert_eq!(config.catalog.url, AppConfig::default().catalog.url);
}

#[test]
fn test_color_parser_named_and_indexed() {
    std::env::remove_var("NO_COLOR");
    let parser = ColorParser::new();

    assert_eq!(parser.parse("cyan").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("Bright_Red").unwrap(), Color::Indexed(9));
    assert_eq!(parser.parse("indexed(236)").unwrap(), Color::Indexed(236));
    assert_eq!(parser.parse("reversed").unwrap(), Color::Reset);
    assert!(parser.parse("indexed(300)").is_err());
    assert!(parser.parse("#12345").is_err());
}

#[test]
fn test_theme_from_default_config() {
    std::env::remove_var("NO_COLOR");
    let theme = Theme::from_config(&AppConfig::default().theme).unwrap();

    assert_eq!(theme.get("chart_tooltip"), Color::Yellow);
    assert_eq!(theme.get("table_selected"), Color::Reset);
    assert_eq!(theme.get("no_such_color"), Color::Reset);
    assert_eq!(theme.colors.len(), 17);
}
