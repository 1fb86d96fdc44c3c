pub mod chunk;
pub mod coords;
pub mod voxel;
pub mod worldgen;
