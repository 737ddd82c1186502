// Related jobs: career-path tags attached to lessons.
// The resolver is the only place that creates rows implicitly.

pub mod handlers;
pub mod repository;
pub mod resolver;
