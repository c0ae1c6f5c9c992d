#![forbid(unsafe_code)]

pub mod grading;
pub mod matching;
pub mod model;
pub mod time;

pub use time::Clock;
