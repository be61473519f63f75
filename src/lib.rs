// RepNet headless client — community reporting of malicious websites.
//
// This is the library root. The modules follow the client pipeline:
// fetch (api), cache (lookups), reconcile and filter (report), vote,
// and orchestration (feed).

pub mod api;
pub mod config;
pub mod credentials;
pub mod feed;
pub mod lookups;
pub mod output;
pub mod report;
pub mod vote;
