//! Domain types for TickerLab

pub mod bar;
pub mod trade;

pub use bar::{closes, Bar};
pub use trade::Trade;
