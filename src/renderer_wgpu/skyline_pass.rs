use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wgpu::util::DeviceExt;

use super::geometry::{Vertex, VERTEX_LAYOUT};
use super::pipeline::create_scene_pipeline;
use super::uniforms::{ParamsBindGroup, SkylineUniform};
use crate::sky_core::config::SkylineConfig;
use crate::sky_core::palette::{Phase, Rgb};
use crate::sky_core::state::VisualParameters;

/// The silhouette strip sits on this ground line, at this depth.
const BASELINE_Y: f32 = -20.0;
const SKYLINE_DEPTH: f32 = -40.0;

/// Procedural city silhouette: a front and a back row of flat building
/// quads, built once from the config seed and recolored per evaluation
/// through the tint/emissive/fog uniforms.
pub struct SkylinePass {
    pipeline: wgpu::RenderPipeline,
    params: ParamsBindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl SkylinePass {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        config: &SkylineConfig,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skyline-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skyline.wgsl").into()),
        });

        let night = Phase::Night.palette();
        let params = ParamsBindGroup::new(
            device,
            &SkylineUniform {
                tint: pad(night.skyline, 0.9),
                emissive: pad([0.0, 0.0, 0.0], 1.0),
                fog: pad(night.sky_top, 0.008),
            },
            "skyline",
        );

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skyline-pipeline-layout"),
            bind_group_layouts: &[frame_layout, &params.layout],
            push_constant_ranges: &[],
        });

        let pipeline = create_scene_pipeline(
            device,
            format,
            &layout,
            &shader,
            &[VERTEX_LAYOUT],
            wgpu::BlendState::ALPHA_BLENDING,
            "skyline-pipeline",
        );

        let vertices = build_silhouette(config);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skyline-vertex-buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline,
            params,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn set(&self, queue: &wgpu::Queue, visual: &VisualParameters) {
        self.params.update(
            queue,
            &SkylineUniform {
                tint: pad(visual.skyline_tint, visual.skyline_opacity),
                emissive: pad(visual.skyline_emissive, visual.skyline_emissive_intensity),
                fog: pad(visual.fog_color, visual.fog_density),
            },
        );
    }

    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &self.params.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

fn pad(rgb: Rgb, w: f32) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], w]
}

/// Two staggered rows of flat quads spanning the configured width. The
/// back row is taller and deeper, so fog separates the layers.
fn build_silhouette(config: &SkylineConfig) -> Vec<Vertex> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut vertices = Vec::new();

    for (depth_offset, height_scale) in [(0.0, 1.0f32), (-8.0, 1.35f32)] {
        let z = SKYLINE_DEPTH + depth_offset;
        let mut x = -config.width / 2.0;
        while x < config.width / 2.0 {
            let width = rng.random_range(3.0f32..8.0);
            let height = rng.random_range(6.0f32..config.max_building_height) * height_scale;
            push_quad(&mut vertices, x, x + width, BASELINE_Y, BASELINE_Y + height, z);
            x += width + rng.random_range(0.5f32..2.5);
        }
    }

    vertices
}

fn push_quad(vertices: &mut Vec<Vertex>, x0: f32, x1: f32, y0: f32, y1: f32, z: f32) {
    let corners = [
        [x0, y0, z],
        [x1, y0, z],
        [x1, y1, z],
        [x0, y0, z],
        [x1, y1, z],
        [x0, y1, z],
    ];
    vertices.extend(corners.map(|position| Vertex { position }));
}

#[cfg(test)]
mod tests {
    use super::{build_silhouette, BASELINE_Y};
    use crate::sky_core::config::SkylineConfig;

    #[test]
    fn silhouette_is_deterministic_and_spans_the_strip() {
        let config = SkylineConfig::default();
        let a = build_silhouette(&config);
        let b = build_silhouette(&config);

        assert!(!a.is_empty());
        assert_eq!(a.len() % 6, 0, "whole quads only");
        for (va, vb) in a.iter().zip(&b) {
            assert_eq!(va.position, vb.position);
        }
    }

    #[test]
    fn buildings_rise_from_the_ground_line() {
        let config = SkylineConfig::default();
        for vertex in build_silhouette(&config) {
            let [x, y, _] = vertex.position;
            assert!(y >= BASELINE_Y);
            assert!(x.abs() <= config.width / 2.0 + 10.0);
        }
    }
}
