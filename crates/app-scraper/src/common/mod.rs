pub mod candidate;
pub mod request;
