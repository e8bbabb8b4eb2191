// JobSleuth - app/mod.rs
//
// Application layer: batch orchestration and the history store.
// Dependencies: core, platform.

pub mod batch;
pub mod store;
