use crate::output::Output;
use crate::runtime::Context;
use chrono::Utc;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use ticketwatch_core::platform::read_badge;
use ticketwatch_core::{Command, Response};

pub async fn run_status(output: &Output) -> Result<()> {
    let ctx = Context::load()?;
    let settings = ctx.state.settings().await.map_err(|e| eyre!("Failed to read settings: {}", e))?;

    let alert_playing = match ctx.send(&Command::GetAlertStatus).await {
        Ok(Response::AlertStatus { is_playing }) => Some(is_playing),
        _ => None,
    };

    let badge = match read_badge(&ctx.paths.badge_file()) {
        Ok(badge) => badge,
        Err(e) => {
            output.warn(format!("Could not read badge: {}", e));
            None
        }
    };

    // Shown once, like a notification toast
    let pending = ctx
        .state
        .last_notification()
        .await
        .map_err(|e| eyre!("Failed to read notification: {}", e))?;
    let mut shown = None;
    if let Some(notification) = pending {
        let still_watched = ctx
            .state
            .entry(&notification.entry_id)
            .await
            .map_err(|e| eyre!("Failed to read watch-list: {}", e))?
            .is_some();
        if still_watched {
            shown = Some(notification);
        }
        ctx.state
            .clear_last_notification()
            .await
            .map_err(|e| eyre!("Failed to clear notification: {}", e))?;
    }

    let now_millis = Utc::now().timestamp_millis();
    output.json(&json!({
        "isMonitoring": settings.is_monitoring,
        "checkInterval": settings.check_interval,
        "enableSound": settings.enable_sound,
        "alertPolicy": ctx.config.alerts.alert_policy(),
        "daemonRunning": alert_playing.is_some(),
        "alertPlaying": alert_playing,
        "badge": badge,
        "lastNotification": shown,
    }));

    if !output.is_human() {
        return Ok(());
    }

    if settings.is_monitoring {
        output.println(format!(
            "Monitoring: {} (every {} min)",
            "Active".green(),
            settings.check_interval
        ));
    } else {
        output.println(format!("Monitoring: {}", "Stopped".bright_black()));
    }

    output.println(format!("Alerts: {}", ctx.config.alerts.alert_policy()));

    match alert_playing {
        Some(true) => output.println(format!("Alert: {}", "Playing (stop with `ticketwatch stop-alert`)".red().bold())),
        Some(false) => output.println("Alert: Silent"),
        None => output.println(format!("Daemon: {}", "Not running".bright_black())),
    }

    if let Some(badge) = badge.filter(|b| !b.text.is_empty()) {
        output.println(format!("Badge: {} ({})", badge.text, badge.color));
    }

    if let Some(notification) = shown {
        output.println("");
        output.println(format!("🎉 {}", notification.message.bold()));
        output.println(format!(
            "   {} - {}",
            notification.age_text(now_millis),
            notification.url
        ));
    }
    Ok(())
}
