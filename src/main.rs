use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;
use weatherwatch::app::{write_export, App, View};
use weatherwatch::{
    events, replay, spawn_line_feed, ui, DataSource, FeedState, LiveSource, Settings,
};
use weatherwatch_engine::{Ingestor, StationStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// Subscribe to an MQTT broker
    Mqtt,
    /// Subscribe to a NATS server
    Nats,
    /// Read newline-delimited JSON from a TCP endpoint
    Tcp,
    /// Read newline-delimited JSON from standard input
    Stdin,
}

#[derive(Parser, Debug)]
#[command(name = "weatherwatch")]
#[command(about = "Live console dashboard for weather station readings")]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where readings come from
    #[arg(short, long, value_enum, default_value = "mqtt")]
    transport: Transport,

    /// Broker host (overrides BROKER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Broker port (overrides BROKER_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Base topic or subject (overrides TOPIC)
    #[arg(long)]
    topic: Option<String>,

    /// NATS server URL (overrides NATS_URL)
    #[arg(long)]
    nats_url: Option<String>,

    /// TCP endpoint for the tcp transport (host:port)
    #[arg(short, long)]
    connect: Option<String>,

    /// Ingest a file of recorded readings (one JSON payload per line) instead of subscribing
    #[arg(short, long, conflicts_with_all = ["connect"])]
    replay: Option<PathBuf>,

    /// Export the replayed state to a JSON file and exit
    #[arg(short, long, requires = "replay")]
    export: Option<PathBuf>,

    /// Write logs to this file while the dashboard is running
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Command-line flags win over file and environment settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref host) = self.host {
            settings.broker_host = host.clone();
        }
        if let Some(port) = self.port {
            settings.broker_port = port;
        }
        if let Some(ref topic) = self.topic {
            settings.topic = topic.clone();
        }
        if let Some(ref url) = self.nats_url {
            settings.nats_url = url.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), args.export.is_some())?;

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    let config = settings.engine_config()?;
    let rolling_window = config.rolling_window();
    let refresh = settings.refresh_interval()?;
    let ingestor = Ingestor::new(StationStore::new(config));

    if let Some(ref replay_path) = args.replay {
        let summary = replay(replay_path, &ingestor)?;
        let description = format!("replay:{}", replay_path.display());

        // Handle export mode (non-interactive)
        if let Some(ref export_path) = args.export {
            let snapshot = ingestor.store().snapshot();
            write_export(export_path, &snapshot, ingestor.stats(), &description)?;
            println!(
                "Replayed {} lines ({} accepted, {} dropped), exported {} stations to: {}",
                summary.lines,
                summary.accepted,
                summary.dropped,
                snapshot.len(),
                export_path.display()
            );
            return Ok(());
        }

        let source = LiveSource::new(ingestor, &description, FeedState::default());
        return run_tui(Box::new(source), rolling_window, refresh);
    }

    run_live(&args, &settings, ingestor, rolling_window, refresh)
}

/// Install the log subscriber.
///
/// The dashboard owns the terminal, so logs only go to `--log-file` there;
/// headless runs log to stderr.
fn init_tracing(log_file: Option<&Path>, headless: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// Run with a live transport feeding the store in the background
fn run_live(
    args: &Args,
    settings: &Settings,
    ingestor: Ingestor,
    rolling_window: Duration,
    refresh: Duration,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let guard = rt.enter();
    let feed = FeedState::default();

    let (handle, description) = match args.transport {
        Transport::Mqtt => spawn_mqtt(settings, ingestor.clone(), feed.clone())?,
        Transport::Nats => spawn_nats(settings, ingestor.clone(), feed.clone())?,
        Transport::Tcp => {
            let addr = args
                .connect
                .clone()
                .unwrap_or_else(|| format!("{}:{}", settings.broker_host, settings.broker_port));
            println!("Connecting to {}...", addr);
            let stream = rt
                .block_on(tokio::net::TcpStream::connect(&addr))
                .with_context(|| format!("Failed to connect to {}", addr))?;
            tracing::info!(%addr, "connected");
            let handle = spawn_line_feed(stream, ingestor.clone(), feed.clone());
            (handle, format!("tcp://{}", addr))
        }
        Transport::Stdin => {
            let handle = spawn_line_feed(tokio::io::stdin(), ingestor.clone(), feed.clone());
            (handle, "stdin".to_string())
        }
    };

    let source = LiveSource::new(ingestor, &description, feed);
    let result = run_tui(Box::new(source), rolling_window, refresh);

    handle.abort();
    drop(guard);
    // A stdin read can block shutdown indefinitely
    rt.shutdown_background();
    result
}

#[cfg(feature = "mqtt")]
fn spawn_mqtt(
    settings: &Settings,
    ingestor: Ingestor,
    feed: FeedState,
) -> Result<(JoinHandle<()>, String)> {
    use weatherwatch_adapters::mqtt::MqttAdapter;

    let adapter = MqttAdapter::builder()
        .host(&settings.broker_host)
        .port(settings.broker_port)
        .client_id(&settings.client_id)
        .topic(&settings.topic)
        .build()?;
    let description = format!(
        "mqtt://{}:{}/{}",
        adapter.host(),
        adapter.port(),
        adapter.topic()
    );

    let handle = tokio::spawn(async move {
        if let Err(e) = adapter.run(ingestor).await {
            tracing::error!(error = %e, "mqtt adapter stopped");
            feed.set_error(e.to_string());
        }
    });
    Ok((handle, description))
}

#[cfg(not(feature = "mqtt"))]
fn spawn_mqtt(_: &Settings, _: Ingestor, _: FeedState) -> Result<(JoinHandle<()>, String)> {
    anyhow::bail!("weatherwatch was built without the `mqtt` feature")
}

#[cfg(feature = "nats")]
fn spawn_nats(
    settings: &Settings,
    ingestor: Ingestor,
    feed: FeedState,
) -> Result<(JoinHandle<()>, String)> {
    use weatherwatch_adapters::nats::NatsAdapter;

    let adapter = NatsAdapter::builder()
        .url(&settings.nats_url)
        .subject(&settings.topic)
        .build()?;
    let description = format!("{} {}", adapter.url(), adapter.subject());

    let handle = tokio::spawn(async move {
        match adapter.run(ingestor).await {
            Ok(()) => feed.set_error("Connection closed"),
            Err(e) => {
                tracing::error!(error = %e, "nats adapter stopped");
                feed.set_error(e.to_string());
            }
        }
    });
    Ok((handle, description))
}

#[cfg(not(feature = "nats"))]
fn spawn_nats(_: &Settings, _: Ingestor, _: FeedState) -> Result<(JoinHandle<()>, String)> {
    anyhow::bail!("weatherwatch was built without the `nats` feature")
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    rolling_window: Duration,
    refresh_interval: Duration,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, rolling_window);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 80;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered =
                    ratatui::layout::Rect::new(0, top, area.width, 5.min(area.height - top));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Stations => ui::stations::render(frame, app, chunks[2]),
                View::Problems => ui::problems::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Wake up in time for the next refresh
        let timeout = refresh_interval
            .saturating_sub(last_refresh.elapsed())
            .min(Duration::from_millis(100));
        if let Some(event) = events::poll_event(timeout)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Row 3 is the table header: header bar, tabs and top border come first
                    events::handle_mouse_event(app, mouse, 3);
                }
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
