use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ynab_sensors::cli::{
    handle_budget_command, handle_refresh_command, handle_run_command, handle_sensors_command,
    handle_setup_command, handle_status_command, BudgetCommands, RefreshArgs, RunArgs,
    SensorsArgs, SetupCommand,
};
use ynab_sensors::config::{SensorPaths, Settings, SettingsOrigin};

#[derive(Parser)]
#[command(
    name = "ynab-sensors",
    author = "Kaylee Beyene",
    version,
    about = "Publish YNAB budget data as sensors",
    long_about = "ynab-sensors polls the YNAB API on an interval and publishes each \
                  budget's accounts, categories and monthly summary as sensor \
                  entities, keeping the last good snapshot when YNAB is unreachable."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure a budget instance
    Setup(SetupCommand),

    /// Budget instance management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Poll configured budgets until Ctrl+C
    Run(RunArgs),

    /// Refresh budgets once and print the snapshot
    Refresh(RefreshArgs),

    /// Show sensors from the last persisted snapshot
    Sensors(SensorsArgs),

    /// Show poll status
    Status(SensorsArgs),

    /// Show current configuration and paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = SensorPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Setup(cmd)) => {
            handle_setup_command(&paths, &mut settings, cmd).await?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&paths, &mut settings, cmd).await?;
        }
        Some(Commands::Run(args)) => {
            handle_run_command(&paths, &settings, args).await?;
        }
        Some(Commands::Refresh(args)) => {
            handle_refresh_command(&paths, &settings, args).await?;
        }
        Some(Commands::Sensors(args)) => {
            handle_sensors_command(&paths, &settings, args)?;
        }
        Some(Commands::Status(args)) => {
            handle_status_command(&paths, &settings, args)?;
        }
        Some(Commands::Config) => {
            println!("ynab-sensors Configuration");
            println!("==========================");
            println!("Base directory:     {}", paths.base_dir().display());
            println!("Settings file:      {}", paths.settings_file().display());
            println!("Snapshot directory: {}", paths.snapshot_dir().display());
            println!("User values:        {}", paths.user_values_dir().display());
            println!();
            println!("Settings:");
            println!("  Schema version:     {}", settings.schema_version);
            if settings.origin() == SettingsOrigin::Fallback {
                println!("  Loaded from:        partially readable file (see warnings)");
            }
            println!("  Request timeout:    {}s", settings.request_timeout_secs);
            println!(
                "  Unavailable after:  {} failed refreshes",
                settings.unavailable_after_failures
            );
            println!(
                "  Underfunded rule:   {:?}",
                settings.attention.underfunded_rule
            );
            println!("  Budgets:            {}", settings.budgets.len());
        }
        None => {
            println!("ynab-sensors - YNAB budget data as sensors");
            println!();
            println!("Run 'ynab-sensors --help' for usage information.");
            println!("Run 'ynab-sensors setup' to configure a budget.");
        }
    }

    Ok(())
}
