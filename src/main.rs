use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use nbu_rates::engine::sma::simple_moving_average;
use nbu_rates::types::QUOTE_CURRENCY;
use nbu_rates::{
    Config, Dispatch, PointRate, RateSession, SeriesOutcome, SettingsStore, TaskError,
};
use nbu_rs::NbuClient;

/// Official hryvnia exchange rates from the National Bank of Ukraine
#[derive(Parser)]
#[command(name = "nbu_rates")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "NBU exchange rates: current, history and next-day forecast", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List currency codes the bank publishes
    Symbols,

    /// Today's rate of one currency
    Rate {
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Today's rates of several currencies in one request
    Rates {
        #[arg(value_name = "CODE", required = true)]
        codes: Vec<String>,
    },

    /// Daily history ending today
    History {
        #[arg(value_name = "CODE")]
        code: String,

        /// Window length in days (30, 90 or 365)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Next-day forecast from the default window
    Predict {
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Show or change stored preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Interactive session sharing one cache across commands
    Shell,
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    /// Toggle the dark theme flag
    Theme {
        #[arg(value_name = "on|off")]
        dark: String,
    },
}

fn init_logging(cfg: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &cfg.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let cfg = Config::from_env().context("reading configuration")?;
    init_logging(&cfg)?;

    let client = Arc::new(NbuClient::new_with_config(cfg.base_url.clone()));
    let cfg = Arc::new(cfg);
    let session = RateSession::new(cfg.clone(), client.clone());
    info!(base_url = %client.base_url(), "nbu_rates starting");

    match cli.command {
        Commands::Symbols => {
            let codes = session.currency_codes().await?;
            println!("{}", codes.into_iter().collect::<Vec<_>>().join(" "));
        }
        Commands::Rate { code } => {
            let rate = session.rate(&code).await?;
            println!("{rate}");
        }
        Commands::Rates { codes } => {
            let wanted: Vec<&str> = codes.iter().map(String::as_str).collect();
            let rates = client
                .get_current_rates(&wanted)
                .await
                .context("fetching current rates")?;
            for (code, rate) in rates {
                println!("{code} → {QUOTE_CURRENCY}: {rate:.2}");
            }
        }
        Commands::History { code, days } => {
            let days = pick_window(&cfg, days)?;
            let outcome = session.series(&code, days).await?;
            let settings = load_settings(&cfg.settings_path);
            print_history(&code, &outcome, &cfg, settings.as_ref());
        }
        Commands::Predict { code } => {
            let outcome = session.series(&code, cfg.default_window_days).await?;
            print_forecast(&code, &outcome);
        }
        Commands::Settings { action } => {
            let mut store = SettingsStore::load(&cfg.settings_path)
                .with_context(|| format!("loading {}", cfg.settings_path.display()))?;
            if let SettingsAction::Theme { dark } = action {
                let dark = matches!(dark.as_str(), "on" | "dark" | "true" | "1");
                store.set_dark_theme(dark)?;
            }
            println!("{}", serde_json::to_string_pretty(store.raw())?);
        }
        Commands::Shell => shell(session).await?,
    }

    Ok(())
}

fn pick_window(cfg: &Config, days: Option<u32>) -> Result<u32> {
    let days = days.unwrap_or(cfg.default_window_days);
    anyhow::ensure!(
        cfg.is_window_choice(days),
        "window must be one of {:?} days, got {days}",
        cfg.window_choices
    );
    Ok(days)
}

fn load_settings(path: &Path) -> Option<SettingsStore> {
    match SettingsStore::load(path) {
        Ok(s) => Some(s),
        Err(e) => {
            error!(path = %path.display(), "settings unavailable: {e}");
            None
        }
    }
}

fn print_history(code: &str, outcome: &SeriesOutcome, cfg: &Config, settings: Option<&SettingsStore>) {
    let show_sma = settings.is_some_and(|s| s.chart_settings().show_sma);
    let sma = if show_sma {
        simple_moving_average(&outcome.series.rates(), cfg.sma_window)
    } else {
        Vec::new()
    };

    println!("{code} → {QUOTE_CURRENCY}, {} days", outcome.series.len());
    for (i, p) in outcome.series.points().iter().enumerate() {
        match sma.get(i).copied().flatten() {
            Some(avg) => println!("{}  {:.4}  sma {:.4}", p.date.format("%d.%m.%Y"), p.rate, avg),
            None => println!("{}  {:.4}", p.date.format("%d.%m.%Y"), p.rate),
        }
    }
    print_forecast(code, outcome);
}

fn print_forecast(code: &str, outcome: &SeriesOutcome) {
    match outcome.forecast {
        Some(f) => println!("Forecast {code} → {QUOTE_CURRENCY} for next day: {f:.2}"),
        None => println!("Not enough data to forecast {code}"),
    }
}

enum Event {
    Rate(String, Result<PointRate, TaskError>),
    Series { code: String, predict: bool, result: Result<SeriesOutcome, TaskError> },
}

const SHELL_HELP: &str = "commands: rate CODE | history CODE [DAYS] | predict CODE | symbols | clear | status | quit";

async fn shell(session: RateSession) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{SHELL_HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else { break };
                if !shell_command(&session, &tx, line.trim()).await {
                    break;
                }
            }
            Some(event) = rx.recv() => print_event(&session, event),
        }
    }
    Ok(())
}

/// Returns `false` when the shell should exit.
async fn shell_command(session: &RateSession, tx: &mpsc::UnboundedSender<Event>, line: &str) -> bool {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else { return true };
    let arg = words.next();

    match (cmd, arg) {
        ("quit" | "exit", _) => return false,
        ("clear", _) => {
            session.clear();
            println!("cache cleared");
        }
        ("status", _) => {
            println!(
                "cached: {}, running: {}",
                session.cache().len(),
                session.runner().running()
            );
        }
        ("symbols", _) => match session.currency_codes().await {
            Ok(codes) => println!("{}", codes.into_iter().collect::<Vec<_>>().join(" ")),
            Err(e) => println!("error: {e}. Try again."),
        },
        ("rate", Some(code)) => {
            let (ok_tx, err_tx) = (tx.clone(), tx.clone());
            let (ok_code, err_code) = (code.to_string(), code.to_string());
            let sent = session.request_rate(
                code,
                move |r| {
                    let _ = ok_tx.send(Event::Rate(ok_code, Ok(r)));
                },
                move |e| {
                    let _ = err_tx.send(Event::Rate(err_code, Err(e)));
                },
            );
            match sent {
                Ok(Dispatch::Cached(r)) => println!("{r} (cached)"),
                Ok(Dispatch::Started(_)) => println!("fetching {code}..."),
                Err(e) => println!("{e}"),
            }
        }
        ("history" | "predict", Some(code)) => {
            let predict = cmd == "predict";
            let days = match words.next().map(str::parse::<u32>) {
                None => session.config().default_window_days,
                Some(Ok(d)) if session.config().is_window_choice(d) => d,
                Some(_) => {
                    println!("window must be one of {:?}", session.config().window_choices);
                    return true;
                }
            };
            let (ok_tx, err_tx) = (tx.clone(), tx.clone());
            let (ok_code, err_code) = (code.to_string(), code.to_string());
            let sent = session.request_series(
                code,
                days,
                move |o| {
                    let _ = ok_tx.send(Event::Series { code: ok_code, predict, result: Ok(o) });
                },
                move |e| {
                    let _ = err_tx.send(Event::Series { code: err_code, predict, result: Err(e) });
                },
            );
            match sent {
                Ok(Dispatch::Cached(o)) => show_series(session, code, predict, &o),
                Ok(Dispatch::Started(_)) => println!("fetching {days} days of {code}..."),
                Err(e) => println!("{e}"),
            }
        }
        _ => println!("{SHELL_HELP}"),
    }
    true
}

fn show_series(session: &RateSession, code: &str, predict: bool, outcome: &SeriesOutcome) {
    if predict {
        print_forecast(code, outcome);
    } else {
        let cfg = session.config();
        let settings = load_settings(&cfg.settings_path);
        print_history(code, outcome, cfg, settings.as_ref());
    }
}

fn print_event(session: &RateSession, event: Event) {
    match event {
        Event::Rate(_, Ok(rate)) => println!("{rate}"),
        Event::Series { code, predict, result: Ok(o) } => show_series(session, &code, predict, &o),
        Event::Rate(code, Err(e)) | Event::Series { code, result: Err(e), .. } => {
            println!("{code}: {e}. Re-issue the command to retry.");
        }
    }
}
