use glam::Mat4;

use super::camera::SceneCamera;
use super::sky_pass::SkyPass;
use super::skyline_pass::SkylinePass;
use super::stars_pass::StarsPass;
use super::sun_pass::SunPass;
use super::uniforms::{FrameBindGroup, FrameUniform};
use crate::sky_core::config::SceneConfig;
use crate::sky_core::state::VisualParameters;

/// Owns the four scene passes and the shared frame uniform. The
/// renderer only applies evaluated parameters; it never decides them.
pub struct SceneRenderer {
    frame: FrameBindGroup,
    sky: SkyPass,
    stars: StarsPass,
    sun: SunPass,
    skyline: SkylinePass,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        scene_config: &SceneConfig,
    ) -> Self {
        let frame = FrameBindGroup::new(device);
        let sky = SkyPass::new(device, config.format, &frame.layout);
        let stars = StarsPass::new(device, config.format, &frame.layout, &scene_config.stars);
        let sun = SunPass::new(device, config.format, &frame.layout);
        let skyline = SkylinePass::new(device, config.format, &frame.layout, &scene_config.skyline);

        Self {
            frame,
            sky,
            stars,
            sun,
            skyline,
        }
    }

    pub fn update_frame(
        &self,
        queue: &wgpu::Queue,
        view_proj: Mat4,
        camera: &SceneCamera,
        elapsed: f32,
    ) {
        self.frame.update(
            queue,
            &FrameUniform::new(
                view_proj,
                camera.position,
                camera.right(),
                camera.up(),
                elapsed,
            ),
        );
    }

    /// Push one evaluated parameter bundle to every pass.
    pub fn apply(&self, queue: &wgpu::Queue, visual: &VisualParameters) {
        self.sky.set(queue, visual.sky_top, visual.sky_bottom);
        self.stars.set(queue, visual.stars_visible);
        self.sun.set(
            queue,
            visual.sun_color,
            visual.glow_intensity,
            visual.sun_position,
        );
        self.skyline.set(queue, visual);
    }

    /// Back-to-front: gradient, stars, sun, silhouette. No depth
    /// buffer; the order is the layering.
    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_bind_group(0, &self.frame.bind_group, &[]);
        self.sky.render(pass);
        self.stars.render(pass);
        self.sun.render(pass);
        self.skyline.render(pass);
    }
}

pub fn clear_color() -> wgpu::Color {
    wgpu::Color {
        r: 0.01,
        g: 0.0,
        b: 0.03,
        a: 1.0,
    }
}
