pub mod analytics;
pub mod calendar;
pub mod date_keys;
mod domain;
pub mod pending;

pub use domain::*;
