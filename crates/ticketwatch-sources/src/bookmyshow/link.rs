use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use ticketwatch_models::{TargetDate, TargetDateError, WatchEntry};

static MOVIE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)bookmyshow\.com/movies/([^/]+)/([^/]+)/(buytickets/)?([A-Z0-9]+)(/(\d{8}))?")
        .expect("movie URL pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error(
        "Could not parse URL. Use https://in.bookmyshow.com/movies/city/movie-name/ET12345 \
         or https://in.bookmyshow.com/movies/city/movie-name/buytickets/ET12345/20260109"
    )]
    Unrecognized,
    #[error(transparent)]
    Date(#[from] TargetDateError),
}

/// Fields recovered from a pasted movie page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMovieLink {
    pub title: String,
    pub city: String,
    pub slug: String,
    pub movie_id: String,
    pub target_date: Option<TargetDate>,
}

impl ParsedMovieLink {
    pub fn into_entry(self) -> WatchEntry {
        WatchEntry::new(self.title, self.movie_id, self.city, self.target_date).with_slug(self.slug)
    }
}

pub fn parse_movie_url(url: &str) -> Result<ParsedMovieLink, LinkError> {
    let caps = MOVIE_URL.captures(url.trim()).ok_or(LinkError::Unrecognized)?;

    let city = caps[1].to_lowercase();
    let slug = caps[2].to_string();
    let movie_id = caps[4].to_string();
    let target_date = caps
        .get(6)
        .map(|m| TargetDate::parse(m.as_str()))
        .transpose()?;

    Ok(ParsedMovieLink {
        title: title_from_slug(&slug),
        city,
        slug,
        movie_id,
        target_date,
    })
}

fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
