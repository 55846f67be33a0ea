pub mod court_api_client;

pub use court_api_client::{CourtApiClient, ResultSink};
