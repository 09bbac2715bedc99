use crate::output::Output;
use crate::runtime::Context;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::Confirm;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use ticketwatch_core::control;

pub async fn run_clear(yes: bool, output: &Output) -> Result<()> {
    let ctx = Context::load()?;

    if !yes {
        if !std::io::stdin().is_terminal() {
            return Err(eyre!("Refusing to clear without confirmation; pass --yes"));
        }
        let confirmed = Confirm::new()
            .with_prompt("Delete the watch-list, settings and badge?")
            .default(false)
            .interact()?;
        if !confirmed {
            output.info("Nothing cleared");
            return Ok(());
        }
    }

    if control::daemon_running(&ctx.paths.control_socket()).await {
        output.warn("The daemon is running; stop it first or it will keep its in-memory alert state");
    }

    clear_file(&ctx.paths.state_file(), "watch-list and settings", output)?;
    clear_file(&ctx.paths.badge_file(), "badge", output)?;
    Ok(())
}

fn clear_file(path: &Path, what: &str, output: &Output) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| eyre!("Failed to remove {} at {}: {}", what, path.display(), e))?;
        output.success(format!("Cleared {}: {}", what, path.display()));
    } else {
        output.info(format!("No {} found to clear", what));
    }
    Ok(())
}
