// User accounts and their progress counters.

pub mod handlers;
pub mod progress;
pub mod repository;
