// Lessons and their related-job associations.
// Association writes always go through `associations::sync_associations`.

pub mod associations;
pub mod handlers;
pub mod repository;
