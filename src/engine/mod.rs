pub mod admin;
pub mod aggregator;
pub mod calendar;
pub mod projection;
pub mod reader;
pub mod search;
