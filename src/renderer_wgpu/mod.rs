pub mod camera;
pub mod egui_bridge;
pub mod egui_pass;
pub mod geometry;
pub mod gpu_context;
pub mod pipeline;
pub mod scene;
pub mod uniforms;

mod sky_pass;
mod skyline_pass;
mod stars_pass;
mod sun_pass;
