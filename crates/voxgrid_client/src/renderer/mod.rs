pub mod ao;
pub mod atlas;
pub mod face;
pub mod mesh;
pub mod vertex;
