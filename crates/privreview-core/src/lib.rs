pub mod config;
pub mod controller;
pub mod doctor;
pub mod error;
pub mod indicator;
pub mod location;
pub mod navigation;
pub mod signals;
pub mod state;
pub mod step;
pub mod watcher;
pub mod welcome;
