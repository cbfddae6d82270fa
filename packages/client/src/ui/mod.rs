//! Line-oriented terminal front end.

pub mod input;
pub mod render;
mod runner;

pub use runner::run;
