//! Setup CLI command
//!
//! Runs the interactive setup wizard, with every answer optionally given as
//! a flag.

use clap::Args;

use crate::config::{SensorPaths, Settings};
use crate::error::YnabResult;
use crate::setup::{SetupArgs, SetupWizard};

/// Arguments of `ynab-sensors setup`
#[derive(Args, Debug, Default)]
pub struct SetupCommand {
    /// YNAB personal access token
    #[arg(long, env = "YNAB_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Budget name or ID
    #[arg(short, long)]
    pub budget: Option<String>,

    /// Instance name used in sensor IDs (defaults to the budget name)
    #[arg(short, long)]
    pub instance: Option<String>,

    /// ISO currency code (defaults to the budget's currency)
    #[arg(long)]
    pub currency: Option<String>,

    /// Update interval in minutes (5-60)
    #[arg(long)]
    pub interval: Option<u32>,

    /// Include closed accounts
    #[arg(long)]
    pub include_closed: bool,

    /// Include hidden categories
    #[arg(long)]
    pub include_hidden: bool,

    /// Accept the YNAB API terms of service without prompting
    #[arg(long)]
    pub accept_terms: bool,

    /// Use defaults instead of prompting
    #[arg(short, long)]
    pub yes: bool,
}

impl From<SetupCommand> for SetupArgs {
    fn from(cmd: SetupCommand) -> Self {
        SetupArgs {
            token: cmd.token,
            budget: cmd.budget,
            instance: cmd.instance,
            currency: cmd.currency,
            interval: cmd.interval,
            include_closed: cmd.include_closed,
            include_hidden: cmd.include_hidden,
            accept_terms: cmd.accept_terms,
            use_defaults: cmd.yes,
        }
    }
}

/// Handle the setup command
pub async fn handle_setup_command(
    paths: &SensorPaths,
    settings: &mut Settings,
    cmd: SetupCommand,
) -> YnabResult<()> {
    paths.ensure_directories()?;
    SetupWizard::new(paths.clone())
        .run(settings, cmd.into())
        .await?;
    Ok(())
}
