use crate::output::Output;
use crate::runtime::Context;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::time::Duration;
use ticketwatch_core::{Command, Response};
use tracing::debug;

pub async fn run_check(output: &Output) -> Result<()> {
    let ctx = Context::load()?;

    match ctx.send(&Command::CheckNow).await {
        Ok(Response::Success { success: true, .. }) => {
            output.success("Checked all movies (in the running daemon)");
            output.json(&json!({ "checked": true, "daemon": true }));
            return Ok(());
        }
        Ok(Response::Success { error, .. }) => {
            return Err(eyre!(
                "Daemon failed to run the check: {}",
                error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        Ok(other) => return Err(eyre!("Unexpected reply from daemon: {:?}", other)),
        Err(e) => debug!(operation = "check", error = %e, "Daemon not reachable, checking in-process"),
    }

    let alerts = ctx.alert_driver();
    let checker = ctx.checker(alerts.clone())?;

    let spinner = if output.is_human() {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Checking movies...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    } else {
        None
    };

    let result = checker.check_all().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let summary = result.map_err(|e| eyre!("Check failed: {}", e))?;

    output.success(format!(
        "Checked {} movie(s): {} available, {} waiting on date, {} not yet, {} error(s)",
        summary.checked, summary.available, summary.date_mismatch, summary.not_available, summary.errors
    ));
    if summary.persistence_failures > 0 {
        output.warn(format!(
            "{} result(s) could not be saved",
            summary.persistence_failures
        ));
    }
    output.json(&json!({
        "checked": summary.checked,
        "available": summary.available,
        "dateMismatch": summary.date_mismatch,
        "notAvailable": summary.not_available,
        "errors": summary.errors,
        "persistenceFailures": summary.persistence_failures,
        "daemon": false,
    }));

    // The alert loop lives in this process; keep it alive until it ends or the user interrupts
    if alerts.is_active() {
        output.info("Tickets are open! Alert playing, press Ctrl-C to silence it.");
        let finished = async {
            while alerts.is_active() {
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
        };
        tokio::select! {
            _ = finished => {}
            _ = tokio::signal::ctrl_c() => {}
        }
        alerts.stop();
    }

    Ok(())
}
