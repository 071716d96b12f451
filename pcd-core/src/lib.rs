pub mod pointcloud;
pub mod tile;
