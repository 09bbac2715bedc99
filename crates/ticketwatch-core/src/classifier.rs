//! Turns a fetched movie page into an availability verdict.
//!
//! The booking site publishes no machine-readable availability flag, so these
//! are substring and pattern heuristics over raw markup. They tolerate markup
//! churn rather than parse it; false positives and negatives are expected.
//! Nothing here fails: markup that matches nothing is simply `NotAvailable`.

use regex::Regex;
use std::sync::LazyLock;
use ticketwatch_models::{CheckResult, TargetDate};
use tracing::debug;

/// Theater chains and the generic venue marker that show up in a showtimes listing.
pub const VENUE_MARKERS: [&str; 4] = ["PVR", "INOX", "Cinepolis", "venue"];

/// A showtimes grid needs strictly more than this many `HH:MM AM/PM` matches.
/// Tunable: it only exists to ignore stray time-like text.
pub const SHOWTIME_THRESHOLD: usize = 2;

/// Max characters between day number and month abbreviation for the proximity signal.
pub const DATE_PROXIMITY_CHARS: usize = 50;

static SHOWTIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d{2}:\d{2}\s*(?:AM|PM)").expect("showtime pattern is valid"));

pub fn classify(html: &str, target_date: Option<&TargetDate>) -> CheckResult {
    match target_date {
        None => classify_general(html),
        Some(date) => classify_for_date(html, date),
    }
}

/// Any-date check: a booking button anywhere on the page.
pub fn classify_general(html: &str) -> CheckResult {
    let open = has_booking_button(html);
    debug!(operation = "classify_general", booking_open = open, "General availability check");
    if open {
        CheckResult::Available
    } else {
        CheckResult::NotAvailable
    }
}

pub fn has_booking_button(html: &str) -> bool {
    let lower = html.to_lowercase();
    lower.contains("book tickets") || lower.contains("buy tickets")
}

pub fn classify_for_date(html: &str, date: &TargetDate) -> CheckResult {
    let tickets = TicketSignals::scan(html);
    let dates = DateSignals::scan(html, date);

    debug!(
        operation = "classify_for_date",
        target_date = %date,
        day = date.day(),
        month = date.month_abbrev(),
        has_venue = tickets.has_venue,
        showtimes = tickets.showtimes,
        selected_day = dates.selected_day,
        day_month_proximity = dates.day_month_proximity,
        date_box = dates.date_box,
        "Date-specific availability check"
    );

    combine(tickets.available(), dates.matched())
}

/// Date match without open booking collapses into `NotAvailable`.
pub fn combine(tickets_available: bool, date_matched: bool) -> CheckResult {
    match (tickets_available, date_matched) {
        (true, true) => CheckResult::Available,
        (true, false) => CheckResult::DateMismatch,
        (false, _) => CheckResult::NotAvailable,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TicketSignals {
    pub has_venue: bool,
    pub showtimes: usize,
}

impl TicketSignals {
    pub fn scan(html: &str) -> Self {
        Self {
            has_venue: VENUE_MARKERS.iter().any(|marker| html.contains(marker)),
            showtimes: SHOWTIME.find_iter(html).count(),
        }
    }

    pub fn available(&self) -> bool {
        self.has_venue && self.showtimes > SHOWTIME_THRESHOLD
    }
}

/// Three independent guesses at "the page is showing the requested date".
/// Any one of them is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateSignals {
    /// An element whose class mentions selected/active and whose text is the day.
    pub selected_day: bool,
    /// Day and month abbreviation within a few characters of each other.
    pub day_month_proximity: bool,
    /// `>09</...JAN` date-box shape.
    pub date_box: bool,
}

impl DateSignals {
    pub fn scan(html: &str, date: &TargetDate) -> Self {
        let patterns = DatePatterns::for_date(date);
        Self {
            selected_day: is_match(&patterns.selected_day, html),
            day_month_proximity: is_match(&patterns.day_month_proximity, html),
            date_box: is_match(&patterns.date_box, html),
        }
    }

    pub fn matched(&self) -> bool {
        self.selected_day || self.day_month_proximity || self.date_box
    }
}

struct DatePatterns {
    selected_day: Option<Regex>,
    day_month_proximity: Option<Regex>,
    date_box: Option<Regex>,
}

impl DatePatterns {
    fn for_date(date: &TargetDate) -> Self {
        // "9" and "09" both count as the ninth
        let day = format!("0?{}", date.day());
        let month = regex::escape(date.month_abbrev());
        let gap = DATE_PROXIMITY_CHARS - 1;

        Self {
            selected_day: build(&format!(
                r#"(?i)<[a-z][a-z0-9]*\b[^>]*\bclass\s*=\s*["'][^"']*(?:selected|active)[^"']*["'][^>]*>\s*{day}\s*<"#
            )),
            day_month_proximity: build(&format!(
                r"(?i)(?:^|[^0-9]){day}(?:[^0-9<][^<]{{0,{gap}}})?{month}|{month}(?:[^<]{{0,{gap}}}[^0-9<])?{day}(?:[^0-9]|$)"
            )),
            date_box: build(&format!(r"(?i)>\s*{day}\s*</.*?{month}")),
        }
    }
}

// Patterns are assembled from a validated date; a template that fails to
// compile counts as "no match" so classification stays infallible.
fn build(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            debug!(pattern = %pattern, error = %err, "Date pattern failed to compile");
            None
        }
    }
}

fn is_match(pattern: &Option<Regex>, html: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(html))
}
