pub mod api;
pub mod client;
pub mod store;
pub mod tables;
pub const BASE_URL: &str = "http://localhost:3333";
pub const NOTES_API: &str = "notes";
pub const TAGS_API: &str = "tags";
