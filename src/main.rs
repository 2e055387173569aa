use clap::Parser;
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;
use storeview::{logging, App, AppConfig, AppEvent, Args, CacheManager, ConfigManager, Theme};
use tracing::{info, warn};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, config: AppConfig, theme: Theme) -> Result<()> {
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config);
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Fetch)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => tx.send(AppEvent::Key(key))?,
                Event::Mouse(mouse) => tx.send(AppEvent::Mouse(mouse))?,
                Event::Resize(cols, rows) => tx.send(AppEvent::Resize(cols, rows))?,
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }

    app.shutdown();
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(storeview::APP_NAME) {
            Ok(cache) => {
                match cache.clear_all() {
                    Ok(removed) => println!("Cache cleared ({} files removed)", removed),
                    Err(e) => {
                        eprintln!("Error clearing cache: {}", e);
                        std::process::exit(1);
                    }
                }
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.generate_config {
        let manager = match ConfigManager::new(storeview::APP_NAME) {
            Ok(manager) => manager,
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        };
        match manager.write_default_config(args.force) {
            Ok(path) => println!("Wrote default configuration to {}", path.display()),
            Err(e) => {
                eprintln!("Error writing configuration: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(Some(()));
    }

    Ok(None)
}

/// Config file (if any) layered under the command line
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = AppConfig::load(storeview::APP_NAME)?;
    config.apply_args(args);
    config.validate()?;
    Ok(config)
}

fn init_logging(args: &Args) {
    let cache = match CacheManager::new(storeview::APP_NAME) {
        Ok(cache) => cache,
        Err(e) if args.log_file.is_none() => {
            eprintln!("Logging disabled: {}", e);
            return;
        }
        Err(_) => CacheManager::with_dir(std::env::temp_dir()),
    };
    let result = logging::log_path(args.log_file.as_deref(), &cache)
        .and_then(|path| logging::init(&path));
    if let Err(e) = result {
        eprintln!("Logging disabled: {}", e);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    init_logging(&args);

    let config = load_config(&args)?;
    let theme = Theme::from_config(&config.theme)?;
    info!(url = %config.catalog.url, "starting {}", env!("CARGO_PKG_VERSION"));

    let terminal = ratatui::init();
    if let Err(e) = execute!(std::io::stdout(), EnableMouseCapture) {
        warn!(error = %e, "mouse capture unavailable; chart hover needs the keyboard");
    }
    let result = run(terminal, config, theme);
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
