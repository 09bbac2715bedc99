pub mod bookmyshow;
pub mod error;
pub mod traits;

pub use bookmyshow::{BookMyShowClient, BookingUrls, LinkError, ParsedMovieLink, parse_movie_url};
pub use error::FetchError;
pub use traits::PageFetcher;
