use glam::Vec3;

use super::pipeline::{create_scene_pipeline, ADDITIVE_BLEND};
use super::uniforms::{ParamsBindGroup, SunUniform};
use crate::sky_core::palette::Rgb;

/// Billboard half-extent: disc plus room for the halo falloff.
const BILLBOARD_HALF_EXTENT: f32 = 6.0;

/// Camera-facing sun disc with an additive glow halo. The disc color
/// and halo strength come straight from the evaluated parameters.
pub struct SunPass {
    pipeline: wgpu::RenderPipeline,
    params: ParamsBindGroup,
}

impl SunPass {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sun-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sun.wgsl").into()),
        });

        // Parked far below the horizon until the first evaluation.
        let params = ParamsBindGroup::new(
            device,
            &SunUniform {
                color: [1.0, 1.0, 1.0, 1.0],
                center: [0.0, -100.0, -35.0, BILLBOARD_HALF_EXTENT],
            },
            "sun",
        );

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sun-pipeline-layout"),
            bind_group_layouts: &[frame_layout, &params.layout],
            push_constant_ranges: &[],
        });

        let pipeline = create_scene_pipeline(
            device,
            format,
            &layout,
            &shader,
            &[],
            ADDITIVE_BLEND,
            "sun-pipeline",
        );

        Self { pipeline, params }
    }

    pub fn set(&self, queue: &wgpu::Queue, color: Rgb, glow_intensity: f32, position: Vec3) {
        self.params.update(
            queue,
            &SunUniform {
                color: [color[0], color[1], color[2], glow_intensity],
                center: [position.x, position.y, position.z, BILLBOARD_HALF_EXTENT],
            },
        );
    }

    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &self.params.bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}
