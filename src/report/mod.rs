// Report domain — the resolved model, reconciliation from wire payloads,
// and client-side filtering/sorting.

pub mod filter;
pub mod model;
pub mod resolve;
