//! Sensor CLI commands
//!
//! Reads the state persisted by the poller, so these commands never touch
//! the network.

use clap::Args;
use serde::Serialize;

use super::select_budgets;
use crate::config::{BudgetConfig, SensorPaths, Settings};
use crate::display::{format_sensor_list, format_status};
use crate::error::YnabResult;
use crate::models::{PollStatus, Snapshot};
use crate::sensors::{build_entities, SensorEntity};
use crate::storage::{SnapshotStore, UserValuesStore};

/// Arguments of `ynab-sensors sensors` and `ynab-sensors status`
#[derive(Args, Debug, Default)]
pub struct SensorsArgs {
    /// Only show this instance
    pub instance: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct InstanceSensors {
    instance: String,
    sensors: Vec<SensorEntity>,
}

/// Build the sensors of the selected budgets from persisted state
pub fn collect_sensors(
    paths: &SensorPaths,
    settings: &Settings,
    instance: Option<&str>,
) -> YnabResult<Vec<(String, Vec<SensorEntity>)>> {
    let mut result = Vec::new();

    for (budget, status, snapshot) in load_states(paths, settings, instance)? {
        let user_values = UserValuesStore::new(paths, &budget.sanitized_instance_name()).load()?;
        let entities = build_entities(
            budget,
            snapshot.as_ref(),
            &user_values,
            &status,
            settings.unavailable_after_failures,
        );
        result.push((budget.instance_name.clone(), entities));
    }

    Ok(result)
}

/// Print the sensors of the selected budgets
pub fn handle_sensors_command(
    paths: &SensorPaths,
    settings: &Settings,
    args: SensorsArgs,
) -> YnabResult<()> {
    let sensors = collect_sensors(paths, settings, args.instance.as_deref())?;

    if args.json {
        let out: Vec<InstanceSensors> = sensors
            .into_iter()
            .map(|(instance, sensors)| InstanceSensors { instance, sensors })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (instance, entities) in sensors {
        println!("[{}]", instance);
        print!("{}", format_sensor_list(&entities));
        println!();
    }
    Ok(())
}

/// Print the poll status of the selected budgets
pub fn handle_status_command(
    paths: &SensorPaths,
    settings: &Settings,
    args: SensorsArgs,
) -> YnabResult<()> {
    let states = load_states(paths, settings, args.instance.as_deref())?;

    if args.json {
        let out: Vec<_> = states
            .iter()
            .map(|(budget, status, _)| {
                serde_json::json!({ "instance": budget.instance_name, "status": status })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (budget, status, snapshot) in states {
        println!("[{}]", budget.instance_name);
        print!("{}", format_status(&status));
        if let Some(snapshot) = snapshot {
            println!(
                "  Snapshot From:        {}",
                snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")
            );
            let flagged: Vec<&str> = snapshot
                .categories_needing_attention()
                .map(|c| c.name.as_str())
                .collect();
            if !flagged.is_empty() {
                println!("  Needs Attention:      {}", flagged.join(", "));
            }
        }
        println!();
    }
    Ok(())
}

type LoadedState<'a> = (&'a BudgetConfig, PollStatus, Option<Snapshot>);

fn load_states<'a>(
    paths: &SensorPaths,
    settings: &'a Settings,
    instance: Option<&str>,
) -> YnabResult<Vec<LoadedState<'a>>> {
    let mut states = Vec::new();

    for budget in select_budgets(settings, instance)? {
        let store = SnapshotStore::new(paths, &budget.sanitized_instance_name());
        let (status, snapshot) = match store.load()? {
            Some(state) => (state.status, state.snapshot),
            None => (PollStatus::default(), None),
        };
        states.push((budget, status, snapshot));
    }

    Ok(states)
}
