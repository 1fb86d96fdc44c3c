pub mod app;
pub mod mesh_worker;
pub mod renderer;
pub mod settings;
