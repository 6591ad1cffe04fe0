//! `callback` CLI - query call-centre callback availability from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Can a callback be booked at 11:30 today?
//! callback today --time 11:30
//!
//! # Can a callback be booked on a given date, judged at a fixed moment?
//! callback check --date 2015-02-16 --time 09:00 --now 2015-02-13T21:00
//!
//! # The bookable window shown on the booking form, as JSON
//! callback window --days 6 --config rules.json
//!
//! # Opening hours and slots for one date, with GOV.UK bank holidays applied
//! callback schedule --date 2014-12-24 --holidays bank-holidays.json
//! ```
//!
//! Log output goes to stderr and is controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use callback_engine::{
    enumerate_window, is_available_on, is_available_today, parse_bank_holidays, parse_date,
    parse_moment, parse_time, slots_for, CalendarRules, Clock, FixedClock, RulesConfig,
    SystemClock,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "callback",
    version,
    about = "Call-centre callback availability CLI"
)]
struct Cli {
    #[command(flatten)]
    rules: RulesArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RulesArgs {
    /// Calendar rules JSON file (uses the reference calendar if omitted)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// GOV.UK bank-holidays.json file whose dates are added as holidays
    #[arg(long, global = true)]
    holidays: Option<String>,

    /// Division to read from the bank holidays file
    #[arg(long, global = true, default_value = "england-and-wales")]
    division: String,

    /// Evaluate at this local moment (YYYY-MM-DDTHH:MM) instead of the clock
    #[arg(long, global = true)]
    now: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a time later today
    Today {
        /// Slot start time (HH:MM)
        #[arg(short, long)]
        time: String,
    },
    /// Check a specific date and time
    Check {
        /// Date (YYYY-MM-DD or YYYYMMDD)
        #[arg(short, long)]
        date: String,
        /// Slot start time (HH:MM)
        #[arg(short, long)]
        time: String,
    },
    /// Print the bookable window as JSON
    Window {
        /// Number of bookable dates (defaults to the configured horizon)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Print the opening hours and slots for a date
    Schedule {
        /// Date (YYYY-MM-DD or YYYYMMDD)
        #[arg(short, long)]
        date: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rules = load_rules(&cli.rules)?;
    // Sampled once so every check in this command sees the same moment.
    let now = clock(cli.rules.now.as_deref(), &rules)?.now();

    match cli.command {
        Commands::Today { time } => {
            let time = parse_time(&time)?;
            tracing::debug!(%now, %time, "checking same-day slot");
            print_verdict(is_available_today(&rules, time, now));
        }
        Commands::Check { date, time } => {
            let date = parse_date(&date)?;
            let time = parse_time(&time)?;
            tracing::debug!(%now, %date, %time, "checking slot");
            print_verdict(is_available_on(&rules, date, time, now));
        }
        Commands::Window { days } => {
            let days = days.unwrap_or_else(|| rules.horizon_days());
            let window = enumerate_window(&rules, now, days);
            println!("{}", serde_json::to_string_pretty(&window)?);
        }
        Commands::Schedule { date } => {
            let date = parse_date(&date)?;
            match rules.schedule_for(date) {
                Some(hours) => {
                    println!("{} {}", date, hours);
                    let slots: Vec<String> = slots_for(&rules, date)
                        .map(|t| t.format("%H:%M").to_string())
                        .collect();
                    println!("{}", slots.join(" "));
                }
                None => println!("{} closed", date),
            }
        }
    }

    Ok(())
}

/// Build the calendar from `--config` and `--holidays`, or fall back to the
/// reference calendar.
fn load_rules(args: &RulesArgs) -> Result<CalendarRules> {
    let holidays = match &args.holidays {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path))?;
            parse_bank_holidays(&json, &args.division)
                .with_context(|| format!("Failed to load bank holidays from {}", path))?
        }
        None => Vec::new(),
    };

    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path))?;
            Some(
                RulesConfig::from_json(&json)
                    .with_context(|| format!("Failed to parse rules from {}", path))?,
            )
        }
        None => None,
    };

    match config {
        Some(config) => config
            .with_holidays(holidays)
            .into_rules()
            .context("Invalid calendar rules"),
        None if holidays.is_empty() => Ok(CalendarRules::reference()),
        None => RulesConfig::from(&CalendarRules::reference())
            .with_holidays(holidays)
            .into_rules()
            .context("Invalid calendar rules"),
    }
}

/// `--now` pins the clock; otherwise wall-clock time in the rules' timezone.
fn clock(now: Option<&str>, rules: &CalendarRules) -> Result<Box<dyn Clock>> {
    match now {
        Some(s) => Ok(Box::new(FixedClock(parse_moment(s)?))),
        None => Ok(Box::new(SystemClock::new(rules.timezone()))),
    }
}

fn print_verdict(available: bool) {
    if available {
        println!("available");
    } else {
        println!("unavailable");
    }
}
