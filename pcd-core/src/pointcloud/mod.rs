pub mod point;
pub mod schema;
pub mod stats;
