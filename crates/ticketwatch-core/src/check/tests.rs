use super::*;
use crate::alert::AlertDriver;
use crate::store::MemoryStore;
use crate::test_support::{RecordingBadge, RecordingOpener, RecordingSpeaker, StaticFetcher};
use std::time::Duration;
use ticketwatch_models::TargetDate;
use ticketwatch_sources::BookMyShowClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OPEN_PAGE: &str = "<html><button>Book tickets</button></html>";
const CLOSED_PAGE: &str = "<html><button>I'm interested</button></html>";

const DATED_OPEN_PAGE: &str = r#"<html>
<div class="date-item selected">09</div><span>FRI</span><span>JAN</span>
<div class="venue-card">PVR Grand Galada</div>
<a>10:00 AM</a><a>01:15 PM</a><a>04:30 PM</a><a>07:45 PM</a>
</html>"#;

struct Harness {
    checker: MovieChecker,
    state: StateStore,
    opener: Arc<RecordingOpener>,
    speaker: Arc<RecordingSpeaker>,
}

fn harness(fetcher: Arc<dyn PageFetcher>, state: StateStore, urls: BookingUrls) -> Harness {
    let opener = Arc::new(RecordingOpener::default());
    let speaker = Arc::new(RecordingSpeaker::default());
    let alerts = AlertDriver::new(speaker.clone(), Arc::new(RecordingBadge::default()));
    let notifier = Notifier::new(opener.clone(), alerts, state.clone());
    Harness {
        checker: MovieChecker::new(fetcher, state.clone(), urls, notifier),
        state,
        opener,
        speaker,
    }
}

fn entry(title: &str, movie_id: &str) -> WatchEntry {
    WatchEntry::new(title, movie_id, "chennai", None)
}

fn url_of(entry: &WatchEntry) -> String {
    BookingUrls::default().page_url(entry)
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_marks_only_that_entry() {
    let failing = entry("Broken", "ET1");
    let mut available = entry("Open", "ET2");
    available.record(&CheckResult::Available, Utc::now());
    let mut mismatch = entry("Elsewhere", "ET3");
    mismatch.record(&CheckResult::DateMismatch, Utc::now());

    let state = StateStore::in_memory();
    for e in [&failing, &available, &mismatch] {
        state.add_entry(e.clone()).await.unwrap();
    }

    let fetcher = Arc::new(StaticFetcher::default().failing(&url_of(&failing), "connection reset by peer"));
    let h = harness(fetcher, state, BookingUrls::default());

    let result = h.checker.check_one(&failing).await.unwrap();
    assert_eq!(result.status(), CheckStatus::Error);

    let stored = h.state.entry(&failing.id).await.unwrap().unwrap();
    assert_eq!(stored.last_status, Some(CheckStatus::Error));
    let message = stored.last_error.unwrap();
    assert!(!message.is_empty());
    assert!(message.contains("connection reset by peer"));
    assert!(stored.last_checked.is_some());

    assert_eq!(h.state.entry(&available.id).await.unwrap().unwrap(), available);
    assert_eq!(h.state.entry(&mismatch.id).await.unwrap().unwrap(), mismatch);
    assert!(h.opener.opened().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_pass_continues_after_a_failed_fetch() {
    let a = entry("First", "ET1");
    let b = entry("Second", "ET2");
    let c = entry("Third", "ET3");

    let state = StateStore::in_memory();
    for e in [&a, &b, &c] {
        state.add_entry(e.clone()).await.unwrap();
    }

    let fetcher = Arc::new(
        StaticFetcher::default()
            .page(&url_of(&a), CLOSED_PAGE)
            .failing(&url_of(&b), "timed out")
            .page(&url_of(&c), OPEN_PAGE),
    );
    let h = harness(fetcher.clone(), state, BookingUrls::default());

    let summary = h.checker.check_all().await.unwrap();
    assert_eq!(
        summary,
        PassSummary {
            checked: 3,
            available: 1,
            date_mismatch: 0,
            not_available: 1,
            errors: 1,
            persistence_failures: 0,
        }
    );

    // sequential, in watch-list order
    assert_eq!(fetcher.requests(), vec![url_of(&a), url_of(&b), url_of(&c)]);

    let statuses: Vec<_> = h
        .state
        .watch_list()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.last_status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            Some(CheckStatus::NotAvailable),
            Some(CheckStatus::Error),
            Some(CheckStatus::Available)
        ]
    );
    assert_eq!(h.opener.opened(), vec![url_of(&c)]);
    h.checker.notifier().alerts().stop();
}

#[tokio::test(start_paused = true)]
async fn test_announces_only_on_transition_to_available() {
    let movie = entry("Open", "ET2");
    let state = StateStore::in_memory();
    state.add_entry(movie.clone()).await.unwrap();

    let fetcher = Arc::new(StaticFetcher::default().page(&url_of(&movie), OPEN_PAGE));
    let h = harness(fetcher, state, BookingUrls::default());

    h.checker.check_all().await.unwrap();
    h.checker.check_all().await.unwrap();
    assert_eq!(h.opener.opened().len(), 1);
    assert_eq!(h.speaker.spoken(), 1);
    h.checker.notifier().alerts().stop();

    let notification = h.state.last_notification().await.unwrap().unwrap();
    assert_eq!(notification.entry_id, movie.id);
    assert_eq!(notification.url, url_of(&movie));
}

#[tokio::test(start_paused = true)]
async fn test_repeat_while_available_announces_every_time() {
    let movie = entry("Open", "ET2");
    let state = StateStore::in_memory();
    state.add_entry(movie.clone()).await.unwrap();
    state.update_settings(|s| s.enable_sound = false).await.unwrap();

    let fetcher = Arc::new(StaticFetcher::default().page(&url_of(&movie), OPEN_PAGE));
    let mut h = harness(fetcher, state, BookingUrls::default());
    h.checker = h.checker.with_repeat_while_available(true);

    h.checker.check_all().await.unwrap();
    h.checker.check_all().await.unwrap();
    assert_eq!(h.opener.opened().len(), 2);
    assert_eq!(h.speaker.spoken(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_removed_entry_is_neither_written_nor_announced() {
    let kept = entry("Kept", "ET1");
    let removed = entry("Gone", "ET2");
    let state = StateStore::in_memory();
    state.add_entry(kept.clone()).await.unwrap();

    let fetcher = Arc::new(StaticFetcher::default().page(&url_of(&removed), OPEN_PAGE));
    let h = harness(fetcher, state, BookingUrls::default());

    let result = h.checker.check_one(&removed).await.unwrap();
    assert!(result.is_available());
    assert_eq!(h.state.watch_list().await.unwrap(), vec![kept]);
    assert!(h.opener.opened().is_empty());
    assert!(h.state.last_notification().await.unwrap().is_none());
}

#[tokio::test]
async fn test_unwritable_store_is_counted_not_fatal() {
    let kv = Arc::new(MemoryStore::new());
    let state = StateStore::new(kv.clone());
    let a = entry("First", "ET1");
    let b = entry("Second", "ET2");
    state.add_entry(a.clone()).await.unwrap();
    state.add_entry(b.clone()).await.unwrap();
    kv.set_read_only(true);

    let fetcher = Arc::new(
        StaticFetcher::default()
            .page(&url_of(&a), CLOSED_PAGE)
            .page(&url_of(&b), CLOSED_PAGE),
    );
    let h = harness(fetcher.clone(), state, BookingUrls::default());

    assert!(matches!(h.checker.check_one(&a).await, Err(CheckError::Persistence(_))));

    let summary = h.checker.check_all().await.unwrap();
    assert_eq!(summary.persistence_failures, 2);
    assert_eq!(summary.checked, 0);
    assert_eq!(fetcher.requests().len(), 3);
}

#[tokio::test]
async fn test_full_cycle_against_http_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies/chennai/jana-nayagan/buytickets/ET00430817/20260109"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DATED_OPEN_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies/chennai/leo/ET00351731"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
        .mount(&server)
        .await;

    let dated = WatchEntry::new(
        "Jana Nayagan",
        "ET00430817",
        "Chennai",
        Some(TargetDate::parse("20260109").unwrap()),
    );
    let general = WatchEntry::new("Leo", "ET00351731", "chennai", None);

    let state = StateStore::in_memory();
    state.add_entry(dated.clone()).await.unwrap();
    state.add_entry(general.clone()).await.unwrap();
    state.update_settings(|s| s.enable_sound = false).await.unwrap();

    let client = Arc::new(BookMyShowClient::new(Duration::from_secs(5)).unwrap());
    let h = harness(client, state, BookingUrls::new(server.uri()));

    let summary = h.checker.check_all().await.unwrap();
    assert_eq!(summary.available, 1);
    assert_eq!(summary.not_available, 1);

    let stored = h.state.entry(&dated.id).await.unwrap().unwrap();
    assert_eq!(stored.last_status, Some(CheckStatus::Available));
    let expected_url = format!(
        "{}/movies/chennai/jana-nayagan/buytickets/ET00430817/20260109",
        server.uri()
    );
    assert_eq!(h.opener.opened(), vec![expected_url]);

    // a 404 page is classified like any other page
    let stored = h.state.entry(&general.id).await.unwrap().unwrap();
    assert_eq!(stored.last_status, Some(CheckStatus::NotAvailable));
}
