pub mod client;
pub mod raw;

pub use client::{HttpClient, HttpResponse};
