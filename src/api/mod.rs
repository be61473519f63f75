// RepNet API surface — wire types, HTTP client, and the trait seam
// that feed and vote logic depend on.

pub mod client;
pub mod dto;
pub mod error;
pub mod traits;
