use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use commands::{check, clear, config, daemon, monitor, status, watch};

mod commands;
mod logging;
mod output;
mod runtime;

#[derive(Parser)]
#[command(name = "ticketwatch")]
#[command(about = "TicketWatch - Get told the moment BookMyShow opens bookings for your movie")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a movie to the watch-list
    #[command(long_about = "Add a movie to the watch-list, either from its title, event id and city, or from a pasted BookMyShow movie URL with --url. Give --date (YYYYMMDD) to wait for bookings on one specific day.")]
    Add {
        /// Movie title, e.g. "Jana Nayagan"
        #[arg(required_unless_present = "url")]
        title: Option<String>,

        /// BookMyShow event id, e.g. ET00430817
        #[arg(required_unless_present = "url")]
        movie_id: Option<String>,

        /// City as it appears in BookMyShow URLs, e.g. chennai
        #[arg(required_unless_present = "url")]
        city: Option<String>,

        /// Target show date as YYYYMMDD
        #[arg(long, value_name = "YYYYMMDD")]
        date: Option<String>,

        /// Fill everything in from a BookMyShow movie page URL
        #[arg(long, conflicts_with_all = ["movie_id", "city"])]
        url: Option<String>,
    },
    /// Remove a movie from the watch-list
    Remove {
        /// Entry id as shown by `ticketwatch list`
        id: String,
    },
    /// Show the watch-list and the last known status of each movie
    List,
    /// Check every movie now
    #[command(long_about = "Run one check pass over the whole watch-list. When the daemon is running the pass runs there; otherwise it runs in this process and waits for any alert it raises to finish.")]
    Check,
    /// Start or stop periodic checking
    Monitor {
        #[command(subcommand)]
        cmd: MonitorCommands,
    },
    /// Silence the alert that is currently playing
    StopAlert,
    /// Show monitoring state, badge and any pending notification
    Status,
    /// Run the background checker
    #[command(long_about = "Run the checker in the foreground until interrupted. Resumes monitoring if it was on, serves the local control socket used by `monitor`, `check` and `stop-alert`, and runs one check pass on startup unless --no-startup-check is given.")]
    Daemon {
        /// Skip the check pass on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_check: bool,

        /// Log file, rotated daily (default: ticketwatch.log in the log directory)
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,
    },
    /// View or change alert settings
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Delete the watch-list, settings and badge
    Clear {
        /// Don't ask for confirmation
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum MonitorCommands {
    /// Check periodically
    Start {
        /// Minutes between checks (default: the stored interval)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=60))]
        interval: Option<u32>,
    },
    /// Stop periodic checks
    Stop,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show settings and configuration file locations
    Show,
    /// Change settings
    #[command(long_about = "Change alert settings. Changing the interval while monitoring reschedules the running daemon.")]
    Set {
        /// Minutes between checks
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=60))]
        interval: Option<u32>,

        /// Play the spoken alert when tickets open
        #[arg(long)]
        sound: Option<bool>,

        /// Open a Teams chat message when tickets open
        #[arg(long)]
        teams: Option<bool>,

        /// Teams address the chat message is sent to
        #[arg(long, value_name = "EMAIL")]
        teams_email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The daemon sets up its own logging so it can add the file writer
    if !matches!(cli.command, Commands::Daemon { .. }) {
        logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    }

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Add {
            title,
            movie_id,
            city,
            date,
            url,
        } => watch::run_add(title, movie_id, city, date, url, &output).await,
        Commands::Remove { id } => watch::run_remove(&id, &output).await,
        Commands::List => watch::run_list(&output).await,
        Commands::Check => check::run_check(&output).await,
        Commands::Monitor { cmd } => match cmd {
            MonitorCommands::Start { interval } => monitor::run_start(interval, &output).await,
            MonitorCommands::Stop => monitor::run_stop(&output).await,
        },
        Commands::StopAlert => monitor::run_stop_alert(&output).await,
        Commands::Status => status::run_status(&output).await,
        Commands::Daemon {
            no_startup_check,
            log_file,
        } => daemon::run_daemon(no_startup_check, log_file, cli.verbose, cli.quiet, &output).await,
        Commands::Config { cmd } => match cmd.unwrap_or(ConfigCommands::Show) {
            ConfigCommands::Show => config::run_show(&output).await,
            ConfigCommands::Set {
                interval,
                sound,
                teams,
                teams_email,
            } => config::run_set(interval, sound, teams, teams_email, &output).await,
        },
        Commands::Clear { yes } => clear::run_clear(yes, &output).await,
    }
}
