pub mod app;
pub mod debug_api;
pub mod renderer_wgpu;
pub mod scene_runtime;
pub mod sky_core;
pub mod ui;
