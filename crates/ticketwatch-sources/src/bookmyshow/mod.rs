pub mod client;
pub mod link;
pub mod urls;

pub use client::BookMyShowClient;
pub use link::{LinkError, ParsedMovieLink, parse_movie_url};
pub use urls::BookingUrls;
