//! Aggregation layer behind the campus front-end: date normalization,
//! role-based visibility, pagination and the "my workplace" dashboard.

pub mod dashboard;
pub mod dates;
pub mod events;
pub mod filter;
pub mod paginate;
