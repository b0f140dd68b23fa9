use super::pipeline::create_scene_pipeline;
use super::uniforms::{ParamsBindGroup, SkyUniform};
use crate::sky_core::palette::{Phase, Rgb};

pub struct SkyPass {
    pipeline: wgpu::RenderPipeline,
    params: ParamsBindGroup,
}

impl SkyPass {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sky-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sky.wgsl").into()),
        });

        // Before sun times arrive the gradient holds the night look.
        let night = Phase::Night.palette();
        let params = ParamsBindGroup::new(
            device,
            &SkyUniform {
                top: pad(night.sky_top),
                bottom: pad(night.sky_bottom),
            },
            "sky",
        );

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky-pipeline-layout"),
            bind_group_layouts: &[frame_layout, &params.layout],
            push_constant_ranges: &[],
        });

        let pipeline = create_scene_pipeline(
            device,
            format,
            &layout,
            &shader,
            &[],
            wgpu::BlendState::REPLACE,
            "sky-pipeline",
        );

        Self { pipeline, params }
    }

    pub fn set(&self, queue: &wgpu::Queue, top: Rgb, bottom: Rgb) {
        self.params.update(
            queue,
            &SkyUniform {
                top: pad(top),
                bottom: pad(bottom),
            },
        );
    }

    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &self.params.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn pad(rgb: Rgb) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 1.0]
}
