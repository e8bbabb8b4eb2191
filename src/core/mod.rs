// JobSleuth - core/mod.rs
//
// Core business logic layer: screen analysis, input selection, history.
// Dependencies: util, regex, indexmap, serde, chrono, walkdir/glob (metadata only).
// Must NOT depend on: platform, app.

pub mod aggregate;
pub mod analyzer;
pub mod brand;
pub mod discovery;
pub mod export;
pub mod extract;
pub mod health;
pub mod history;
pub mod model;
pub mod noise;
pub mod normalize;
pub mod persist;
pub mod report;
