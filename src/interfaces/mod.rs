pub mod fetch;
pub mod policy;
pub mod site;

pub use fetch::{EndpointAttempt, FetchResponse, HttpFetch};
pub use policy::{PolicyResult, ResponsePolicy};
pub use site::ArticleSource;
