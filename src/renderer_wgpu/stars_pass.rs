use bytemuck::{Pod, Zeroable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wgpu::util::DeviceExt;

use super::pipeline::{create_scene_pipeline, ADDITIVE_BLEND};
use super::uniforms::{ParamsBindGroup, StarsUniform};
use crate::sky_core::config::StarsConfig;

#[repr(C)]
#[derive(Clone, Copy, Debug, Zeroable, Pod)]
struct StarInstance {
    position: [f32; 3],
    size: f32,
    phase: f32,
    _pad: [f32; 3],
}

const INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<StarInstance>() as u64,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: 12,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32,
        },
        wgpu::VertexAttribute {
            offset: 16,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32,
        },
    ],
};

/// Camera-facing star quads on a spherical shell behind the skyline,
/// twinkling in the shader. Placement is deterministic per seed.
pub struct StarsPass {
    pipeline: wgpu::RenderPipeline,
    params: ParamsBindGroup,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
}

impl StarsPass {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        config: &StarsConfig,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stars-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/stars.wgsl").into()),
        });

        // Stars start fully faded; visibility is driven per evaluation.
        let params = ParamsBindGroup::new(
            device,
            &StarsUniform {
                params: [0.0, 0.0, 0.0, 0.0],
            },
            "stars",
        );

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stars-pipeline-layout"),
            bind_group_layouts: &[frame_layout, &params.layout],
            push_constant_ranges: &[],
        });

        let pipeline = create_scene_pipeline(
            device,
            format,
            &layout,
            &shader,
            &[INSTANCE_LAYOUT],
            ADDITIVE_BLEND,
            "stars-pipeline",
        );

        let instances = build_star_shell(config);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stars-instance-buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline,
            params,
            instance_buffer,
            instance_count: instances.len() as u32,
        }
    }

    pub fn set(&self, queue: &wgpu::Queue, visible: bool) {
        let opacity = if visible { 1.0 } else { 0.0 };
        self.params.update(
            queue,
            &StarsUniform {
                params: [opacity, 0.0, 0.0, 0.0],
            },
        );
    }

    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &self.params.bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.instance_count);
    }
}

/// Uniformly distributed shell between radius 100 and 180, lifted a
/// little and pushed back so the densest band sits behind the skyline.
fn build_star_shell(config: &StarsConfig) -> Vec<StarInstance> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut instances = Vec::with_capacity(config.count as usize);

    for _ in 0..config.count {
        let radius = 100.0 + rng.random_range(0.0f32..80.0);
        let theta = rng.random_range(0.0f32..std::f32::consts::TAU);
        let phi = (rng.random_range(-1.0f32..1.0)).acos();

        instances.push(StarInstance {
            position: [
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin() + 10.0,
                radius * phi.cos() - 50.0,
            ],
            size: rng.random_range(0.2f32..0.9),
            phase: rng.random_range(0.0f32..std::f32::consts::TAU),
            _pad: [0.0; 3],
        });
    }

    instances
}

#[cfg(test)]
mod tests {
    use super::build_star_shell;
    use crate::sky_core::config::StarsConfig;

    #[test]
    fn star_shell_is_deterministic_for_a_seed() {
        let config = StarsConfig {
            count: 64,
            seed: 11,
        };
        let a = build_star_shell(&config);
        let b = build_star_shell(&config);

        assert_eq!(a.len(), 64);
        for (sa, sb) in a.iter().zip(&b) {
            assert_eq!(sa.position, sb.position);
            assert_eq!(sa.size, sb.size);
        }
    }

    #[test]
    fn stars_stay_on_the_configured_shell() {
        let config = StarsConfig {
            count: 256,
            seed: 5,
        };
        for star in build_star_shell(&config) {
            let [x, y, z] = star.position;
            let r = (x * x + (y - 10.0) * (y - 10.0) + (z + 50.0) * (z + 50.0)).sqrt();
            assert!((99.0..=181.0).contains(&r), "radius {r}");
            assert!((0.2..=0.9).contains(&star.size));
        }
    }
}
