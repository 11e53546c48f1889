pub mod analysis;
pub mod calendar;
pub mod columns;
pub mod config;
pub mod defects;
pub mod error;
pub mod events;
pub mod financials;
pub mod generator;
pub mod output;
pub mod record;
pub mod reference;
pub mod types;
