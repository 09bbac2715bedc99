use crate::output::Output;
use crate::runtime::Context;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use ticketwatch_core::{Command, ControlError, Response};
use ticketwatch_models::MonitorSettings;

pub async fn run_start(interval: Option<u32>, output: &Output) -> Result<()> {
    let ctx = Context::load()?;
    let settings = ctx.state.settings().await.map_err(|e| eyre!("Failed to read settings: {}", e))?;
    let minutes = MonitorSettings::clamp_interval(interval.unwrap_or(settings.check_interval));

    match ctx.send(&Command::StartMonitoring { interval: Some(minutes) }).await {
        Ok(response) => expect_success(response)?,
        Err(e) => {
            // No daemon: record the intent, the daemon picks it up when it starts
            ctx.state
                .update_settings(|s| {
                    s.is_monitoring = true;
                    s.check_interval = minutes;
                })
                .await
                .map_err(|e| eyre!("Failed to save settings: {}", e))?;
            daemon_hint(&e, output);
        }
    }

    output.success(format!("Monitoring every {} minute(s)", minutes));
    output.json(&json!({ "isMonitoring": true, "checkInterval": minutes }));
    Ok(())
}

pub async fn run_stop(output: &Output) -> Result<()> {
    let ctx = Context::load()?;

    match ctx.send(&Command::StopMonitoring).await {
        Ok(response) => expect_success(response)?,
        Err(_) => {
            ctx.state
                .update_settings(|s| s.is_monitoring = false)
                .await
                .map_err(|e| eyre!("Failed to save settings: {}", e))?;
        }
    }

    output.success("Monitoring stopped");
    output.json(&json!({ "isMonitoring": false }));
    Ok(())
}

pub async fn run_stop_alert(output: &Output) -> Result<()> {
    let ctx = Context::load()?;

    match ctx.send(&Command::StopAlert).await {
        Ok(response) => {
            expect_success(response)?;
            output.success("Alert stopped");
        }
        Err(e) => {
            output.info("No alert is playing (daemon not running)");
            tracing::debug!(operation = "stop_alert", error = %e, "Daemon not reachable");
        }
    }
    Ok(())
}

fn expect_success(response: Response) -> Result<()> {
    match response {
        Response::Success { success: true, .. } => Ok(()),
        Response::Success { error, .. } => Err(eyre!(
            "Daemon refused the request: {}",
            error.unwrap_or_else(|| "unknown error".to_string())
        )),
        other => Err(eyre!("Unexpected reply from daemon: {:?}", other)),
    }
}

fn daemon_hint(error: &ControlError, output: &Output) {
    tracing::debug!(operation = "monitor", error = %error, "Daemon not reachable");
    output.warn("The daemon is not running; checks start once you run `ticketwatch daemon`.");
}
