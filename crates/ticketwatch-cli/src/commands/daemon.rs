use crate::logging;
use crate::output::Output;
use crate::runtime::Context;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use ticketwatch_core::control;
use ticketwatch_core::platform::CronTimer;
use ticketwatch_core::scheduler::drive_wakeups;
use ticketwatch_core::{Command, Dispatcher, MonitoringScheduler};
use tracing::{error, info, warn};

pub async fn run_daemon(
    no_startup_check: bool,
    log_file: Option<PathBuf>,
    verbose: u8,
    quiet: bool,
    output: &Output,
) -> Result<()> {
    let ctx = Context::load()?;

    let log_path = log_file.unwrap_or_else(|| ctx.paths.daemon_log_file());
    logging::init_logging_with_file(verbose, quiet, Some(&log_path)).map_err(|e| eyre!("{}", e))?;

    let socket = ctx.paths.control_socket();
    if control::daemon_running(&socket).await {
        return Err(eyre!("A daemon is already listening on {}", socket.display()));
    }

    let (timer, wakeups) = CronTimer::start()
        .await
        .map_err(|e| eyre!("Failed to start scheduler: {}", e))?;
    let scheduler = Arc::new(MonitoringScheduler::new(Arc::new(timer)));
    let alerts = ctx.alert_driver();
    let checker = Arc::new(ctx.checker(alerts.clone())?);
    let dispatcher = Arc::new(Dispatcher::new(
        scheduler.clone(),
        checker.clone(),
        alerts.clone(),
        ctx.state.clone(),
    ));

    let wakeup_task = tokio::spawn(drive_wakeups(wakeups, checker.clone()));

    #[cfg(unix)]
    let control_task = {
        let listener = control::bind(&socket).map_err(|e| eyre!("Failed to bind {}: {}", socket.display(), e))?;
        tokio::spawn(control::serve(listener, dispatcher.clone()))
    };
    #[cfg(not(unix))]
    warn!(operation = "daemon_start", "Control socket unavailable on this platform; CLI commands cannot reach the daemon");

    let settings = ctx
        .state
        .settings()
        .await
        .map_err(|e| eyre!("Failed to read settings: {}", e))?;
    if settings.is_monitoring {
        info!(
            operation = "daemon_start",
            interval_minutes = settings.check_interval,
            "Resuming monitoring"
        );
        let response = dispatcher
            .dispatch(Command::StartMonitoring {
                interval: Some(settings.check_interval),
            })
            .await;
        if !response.is_success() {
            warn!(operation = "daemon_start", response = ?response, "Could not resume monitoring");
        }
    }

    if !no_startup_check {
        info!(operation = "daemon_start", "Running startup check");
        let checker = checker.clone();
        tokio::spawn(async move {
            if let Err(e) = checker.check_all().await {
                error!(operation = "startup_check", error = %e, "Startup check failed");
            }
        });
    }

    output.success(format!(
        "Daemon running{}. Press Ctrl-C to stop.",
        if settings.is_monitoring {
            format!(", checking every {} minute(s)", settings.check_interval)
        } else {
            " (monitoring is off, start it with `ticketwatch monitor start`)".to_string()
        }
    ));
    output.info(format!("Logs: {}", log_path.display()));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| eyre!("Failed to listen for Ctrl-C: {}", e))?;
    info!(operation = "daemon_stop", "Shutting down");

    alerts.stop();
    if let Err(e) = scheduler.stop().await {
        warn!(operation = "daemon_stop", error = %e, "Failed to cancel schedule");
    }
    wakeup_task.abort();
    #[cfg(unix)]
    {
        control_task.abort();
        if let Err(e) = std::fs::remove_file(&socket) {
            warn!(operation = "daemon_stop", error = %e, "Failed to remove control socket");
        }
    }

    output.success("Daemon stopped");
    Ok(())
}
