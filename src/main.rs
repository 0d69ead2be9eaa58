use anyhow::{Context, Result};
use chrono::Local;
use flexi_logger::{FileSpec, Logger};
use std::path::PathBuf;
use structopt::StructOpt;

use subscription_calendar::{load_suitable_config, project, Config, SubscriptionForm};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "subcal",
    about = "Subscription Calendar - track recurring payments on a calendar."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,

    #[structopt(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Interactive calendar (default)
    Tui,

    /// Validate one subscription and print its billing dates
    Project {
        #[structopt(long)]
        name: String,

        #[structopt(long, help = "amount, e.g. 9.99")]
        price: String,

        #[structopt(long, help = "first billing date, YYYY-MM-DD (default: today)")]
        start: Option<String>,

        #[structopt(long, default_value = "monthly", help = "daily, weekly, monthly or yearly")]
        frequency: String,

        #[structopt(long, help = "path to a logo image")]
        logo: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::from_args();

    let config = load_suitable_config(args.configfile.as_deref())
        .context("Failed to load configuration")?;

    let logger = match (&args.log_file, &args.command) {
        (Some(log_file), _) => Logger::try_with_env_or_str(&config.log_level)?
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message(),
        (None, Some(Command::Project { .. })) => Logger::try_with_env_or_str(&config.log_level)?,
        // Stderr output would draw over the TUI
        (None, _) => Logger::try_with_str("off")?,
    };
    let _logger = logger.start()?;

    match args.command {
        Some(Command::Project {
            name,
            price,
            start,
            frequency,
            logo,
        }) => run_project(&config, name, price, start, frequency, logo),
        Some(Command::Tui) | None => run_ui_mode(config),
    }
}

fn run_project(
    config: &Config,
    name: String,
    price: String,
    start: Option<String>,
    frequency: String,
    logo: Option<String>,
) -> Result<()> {
    let mut form = SubscriptionForm::new(Local::now().date_naive());
    form.name = name;
    form.price = price;
    form.frequency = frequency;
    form.logo = logo;
    if let Some(start) = start {
        form.start_date = start;
    }

    let subscription = form
        .submit(&config.currency_symbol)
        .context("Subscription rejected")?;
    let events = project(&subscription)?;

    println!(
        "{} - {} ({})",
        subscription.name(),
        subscription.price(),
        subscription.frequency().label()
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for event in &events {
        println!("{:>3}  {}  {}", event.index, event.date.format("%a %Y-%m-%d"), event.title);
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: Config) -> Result<()> {
    use subscription_calendar::ui;
    use subscription_calendar::SubscriptionStore;

    let mut app = ui::App::new(SubscriptionStore::new(), config, Local::now().date_naive());
    ui::run_ui(&mut app)?;

    println!("\n✅ {} subscriptions tracked this session", app.store.len());

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the web UI: cargo run --bin subcal-server --features server");
    std::process::exit(1);
}
