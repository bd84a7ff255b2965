pub mod detection;
pub mod errors;
pub mod events;
pub mod media;
pub mod model;
pub mod report;
pub mod thresholds;
