pub mod client;
pub mod credentials;
pub mod listing;
pub mod session;

pub use client::{AuthError, ListingError, RedditClient};
pub use credentials::RedditCredentials;
pub use listing::Submission;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
