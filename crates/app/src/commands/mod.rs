pub mod explain;
pub mod practice;
pub mod quiz;
pub mod review;
pub mod search;
pub mod settings;
pub mod stats;
