use crate::output::Output;
use crate::runtime::Context;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use ticketwatch_core::{Command, Response};

pub async fn run_show(output: &Output) -> Result<()> {
    let ctx = Context::load()?;
    let settings = ctx.state.settings().await.map_err(|e| eyre!("Failed to read settings: {}", e))?;
    let config = &ctx.config;

    output.json(&json!({
        "settings": settings,
        "config": {
            "fetch": {
                "baseUrl": config.fetch.base_url,
                "timeoutSecs": config.fetch.timeout_secs,
            },
            "alerts": {
                "speechEngine": config.alerts.speech_engine,
                "repeatWhileAvailable": config.alerts.repeat_while_available,
            },
            "notifications": {
                "chatDelayMs": config.notifications.chat_delay_ms,
                "openBrowser": config.notifications.open_browser,
            },
        },
        "paths": {
            "configFile": ctx.paths.config_file(),
            "stateFile": ctx.paths.state_file(),
            "controlSocket": ctx.paths.control_socket(),
        },
    }));

    let on_off = |flag: bool| {
        if flag {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        }
    };
    let teams_email = if settings.teams_email.is_empty() {
        "(not set)".bright_black().to_string()
    } else {
        settings.teams_email.clone()
    };

    output.table(
        "Settings",
        &["Setting", "Value"],
        vec![
            vec!["Monitoring".to_string(), on_off(settings.is_monitoring)],
            vec!["Check interval".to_string(), format!("{} min", settings.check_interval)],
            vec!["Sound alert".to_string(), on_off(settings.enable_sound)],
            vec!["Teams message".to_string(), on_off(settings.enable_teams_call)],
            vec!["Teams address".to_string(), teams_email],
        ],
    );
    output.table(
        "Configuration",
        &["Option", "Value"],
        vec![
            vec!["Config file".to_string(), ctx.paths.config_file().display().to_string()],
            vec!["State file".to_string(), ctx.paths.state_file().display().to_string()],
            vec!["fetch.base_url".to_string(), config.fetch.base_url.clone()],
            vec!["fetch.timeout_secs".to_string(), config.fetch.timeout_secs.to_string()],
            vec![
                "alerts.speech_engine".to_string(),
                config.alerts.speech_engine.clone().unwrap_or_else(|| "(auto)".to_string()),
            ],
            vec![
                "alerts.repeat_while_available".to_string(),
                format!(
                    "{} (alerts {})",
                    config.alerts.repeat_while_available,
                    config.alerts.alert_policy()
                ),
            ],
            vec![
                "notifications.chat_delay_ms".to_string(),
                config.notifications.chat_delay_ms.to_string(),
            ],
            vec![
                "notifications.open_browser".to_string(),
                config.notifications.open_browser.to_string(),
            ],
        ],
    );
    Ok(())
}

pub async fn run_set(
    interval: Option<u32>,
    sound: Option<bool>,
    teams: Option<bool>,
    teams_email: Option<String>,
    output: &Output,
) -> Result<()> {
    if interval.is_none() && sound.is_none() && teams.is_none() && teams_email.is_none() {
        output.warn("Nothing to change. Use --interval, --sound, --teams or --teams-email");
        output.println("\nExample: ticketwatch config set --interval 10 --sound true");
        return Ok(());
    }

    let ctx = Context::load()?;
    let before = ctx.state.settings().await.map_err(|e| eyre!("Failed to read settings: {}", e))?;

    let settings = ctx
        .state
        .update_settings(|s| {
            if let Some(minutes) = interval {
                s.check_interval = minutes;
            }
            if let Some(sound) = sound {
                s.enable_sound = sound;
            }
            if let Some(teams) = teams {
                s.enable_teams_call = teams;
            }
            if let Some(email) = teams_email {
                s.teams_email = email.trim().to_string();
            }
        })
        .await
        .map_err(|e| eyre!("Failed to save settings: {}", e))?;

    if settings.enable_teams_call && settings.teams_email.is_empty() {
        output.warn("Teams messages are on but no address is set (use --teams-email)");
    }

    // A new interval only takes effect once the schedule is replaced
    if settings.is_monitoring && settings.check_interval != before.check_interval {
        match ctx
            .send(&Command::StartMonitoring {
                interval: Some(settings.check_interval),
            })
            .await
        {
            Ok(Response::Success { success: true, .. }) => {
                output.info(format!("Daemon now checks every {} minute(s)", settings.check_interval));
            }
            Ok(other) => output.warn(format!("Daemon did not reschedule: {:?}", other)),
            Err(_) => {}
        }
    }

    output.success("Settings saved");
    output.json(&json!({ "settings": settings }));
    Ok(())
}
