use crate::output::Output;
use crate::runtime::Context;
use chrono::Local;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use ticketwatch_models::{CheckStatus, TargetDate, WatchEntry};
use ticketwatch_sources::{parse_movie_url, BookingUrls};

pub async fn run_add(
    title: Option<String>,
    movie_id: Option<String>,
    city: Option<String>,
    date: Option<String>,
    url: Option<String>,
    output: &Output,
) -> Result<()> {
    let entry = build_entry(title, movie_id, city, date, url)?;
    let ctx = Context::load()?;

    ctx.state
        .add_entry(entry.clone())
        .await
        .map_err(|e| eyre!("Failed to save watch-list: {}", e))?;

    output.success(format!(
        "Watching {} in {} ({})",
        entry.title,
        entry.city,
        date_label(entry.target_date.as_ref())
    ));
    output.info(format!("Page: {}", BookingUrls::new(ctx.config.fetch.base_url.clone()).page_url(&entry)));
    output.json(&json!({ "added": entry }));
    Ok(())
}

fn build_entry(
    title: Option<String>,
    movie_id: Option<String>,
    city: Option<String>,
    date: Option<String>,
    url: Option<String>,
) -> Result<WatchEntry> {
    if let Some(url) = url {
        let mut link = parse_movie_url(&url).map_err(|e| eyre!("{}", e))?;
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            link.title = title.trim().to_string();
        }
        if let Some(date) = date {
            link.target_date = Some(parse_date(&date)?);
        }
        return Ok(link.into_entry());
    }

    let title = required(title, "title")?;
    let movie_id = required(movie_id, "movie id")?;
    let city = required(city, "city")?;
    let target_date = date.as_deref().map(parse_date).transpose()?;

    Ok(WatchEntry::new(title, movie_id, city, target_date))
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| eyre!("Please fill in the {}", name))
}

fn parse_date(date: &str) -> Result<TargetDate> {
    TargetDate::parse(date.trim()).map_err(|e| eyre!("{}", e))
}

pub async fn run_remove(id: &str, output: &Output) -> Result<()> {
    let ctx = Context::load()?;

    let Some(removed) = ctx
        .state
        .remove_entry(id)
        .await
        .map_err(|e| eyre!("Failed to update watch-list: {}", e))?
    else {
        output.warn(format!("No movie with id {} on the watch-list", id));
        return Ok(());
    };

    if removed.cleared_notification {
        let badge = ctx.paths.badge_file();
        if let Err(e) = std::fs::remove_file(&badge) {
            if e.kind() != std::io::ErrorKind::NotFound {
                output.warn(format!("Could not clear badge at {}: {}", badge.display(), e));
            }
        }
    }

    output.success(format!("Removed {}", removed.entry.title));
    output.json(&json!({ "removed": removed.entry }));
    Ok(())
}

pub async fn run_list(output: &Output) -> Result<()> {
    let ctx = Context::load()?;
    let entries = ctx
        .state
        .watch_list()
        .await
        .map_err(|e| eyre!("Failed to read watch-list: {}", e))?;

    output.json(&json!({ "movies": entries }));

    if entries.is_empty() {
        output.info("No movies added yet. Add one with `ticketwatch add`.");
        return Ok(());
    }

    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.id.clone(),
                entry.title.clone(),
                entry.city.clone(),
                date_label(entry.target_date.as_ref()),
                status_label(entry),
                checked_label(entry),
            ]
        })
        .collect();
    output.table(
        "Watch-list",
        &["ID", "Movie", "City", "Date", "Status", "Last checked"],
        rows,
    );
    Ok(())
}

pub fn date_label(date: Option<&TargetDate>) -> String {
    date.map(TargetDate::display_long).unwrap_or_else(|| "(Any Date)".to_string())
}

pub fn status_text(status: Option<CheckStatus>) -> &'static str {
    match status {
        Some(CheckStatus::Available) => "✅ Tickets Available!",
        Some(CheckStatus::DateMismatch) => "⏳ Not available for target date yet",
        Some(CheckStatus::Error) => "❌ Error",
        Some(CheckStatus::NotAvailable) | None => "⏳ Not Available Yet",
    }
}

fn status_label(entry: &WatchEntry) -> String {
    let text = status_text(entry.last_status);
    match (entry.last_status, &entry.last_error) {
        (Some(CheckStatus::Available), _) => text.green().to_string(),
        (Some(CheckStatus::Error), Some(message)) => format!("{}\n{}", text.red(), message.bright_black()),
        (Some(CheckStatus::Error), None) => text.red().to_string(),
        _ => text.to_string(),
    }
}

fn checked_label(entry: &WatchEntry) -> String {
    entry
        .last_checked
        .map(|at| at.with_timezone(&Local).format("%b %-d, %H:%M:%S").to_string())
        .unwrap_or_else(|| "Not checked yet".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_entry_from_fields() {
        let entry = build_entry(
            Some("Jana Nayagan".to_string()),
            Some("ET00430817".to_string()),
            Some("Chennai".to_string()),
            Some("20260109".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(entry.city, "chennai");
        assert_eq!(entry.movie_slug, "jana-nayagan");
        assert_eq!(entry.target_date.unwrap().as_str(), "20260109");
    }

    #[test]
    fn test_build_entry_from_url_with_title_override() {
        let entry = build_entry(
            Some("Thalapathy 69".to_string()),
            None,
            None,
            None,
            Some("https://in.bookmyshow.com/movies/chennai/jana-nayagan/buytickets/ET00430817/20260109".to_string()),
        )
        .unwrap();
        assert_eq!(entry.title, "Thalapathy 69");
        // the slug from the URL is what the site routes on
        assert_eq!(entry.movie_slug, "jana-nayagan");
        assert_eq!(entry.movie_id, "ET00430817");
    }

    #[test]
    fn test_build_entry_rejects_bad_input() {
        assert!(build_entry(Some(" ".to_string()), Some("ET1".to_string()), Some("pune".to_string()), None, None).is_err());
        assert!(build_entry(
            Some("Movie".to_string()),
            Some("ET1".to_string()),
            Some("pune".to_string()),
            Some("20260230".to_string()),
            None
        )
        .is_err());
        assert!(build_entry(None, None, None, None, Some("https://example.com/movie".to_string())).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(date_label(None), "(Any Date)");
        assert_eq!(date_label(Some(&TargetDate::parse("20260109").unwrap())), "Jan 9, 2026");
        assert_eq!(status_text(None), "⏳ Not Available Yet");
        assert_eq!(status_text(Some(CheckStatus::DateMismatch)), "⏳ Not available for target date yet");
    }
}
