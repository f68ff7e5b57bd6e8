pub mod display;
pub mod progress;
