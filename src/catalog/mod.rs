pub mod client;
pub mod request;
pub mod types;

pub use client::{CatalogApi, CatalogError, TmdbClient};
pub use request::{CatalogRequest, Endpoint};
pub use types::{Genre, Movie, MoviePage, ResultPage};
