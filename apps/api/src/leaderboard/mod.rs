// Leaderboard aggregation over the users' cumulative counters.
// Per-job figures are estimates: there is no record of which lessons a user finished.

pub mod aggregation;
pub mod handlers;
pub mod repository;
