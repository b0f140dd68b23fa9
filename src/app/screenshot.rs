use anyhow::{Context, Result};

use crate::debug_api::CommandAppliedEvent;

use super::AppState;

impl AppState {
    /// Copy the presented frame into a staging buffer and write it out
    /// as a PNG under `captures/`. Blocks the frame loop for one
    /// readback; this is debug tooling, not a per-frame path.
    pub(super) fn handle_screenshot(
        &mut self,
        command_id: String,
        texture: &wgpu::Texture,
        mut encoder: wgpu::CommandEncoder,
    ) {
        let width = self.gpu.config.width;
        let height = self.gpu.config.height;
        let bytes_per_pixel = 4u32;
        let unpadded_row = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row = unpadded_row.div_ceil(align) * align;
        let buffer_size = (padded_row * height) as u64;

        let staging = self.gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("screenshot-staging"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.gpu.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.gpu.device.poll(wgpu::PollType::wait_indefinitely());

        let result = rx
            .recv()
            .map_err(|_| "channel closed".to_string())
            .and_then(|r| r.map_err(|e| e.to_string()));

        let (ok, message) = match result {
            Ok(()) => {
                let data = slice.get_mapped_range();
                let is_bgra = matches!(
                    self.gpu.config.format,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
                );
                match save_screenshot(&data, width, height, padded_row, unpadded_row, is_bgra) {
                    Ok(filename) => (true, format!("screenshot saved: {filename}")),
                    Err(e) => (false, format!("screenshot save failed: {e}")),
                }
            }
            Err(e) => (false, format!("screenshot readback failed: {e}")),
        };

        if let Some(api) = &self.debug_api {
            api.publish_command_applied(CommandAppliedEvent {
                id: command_id,
                frame: self.frame_index,
                ok,
                message,
                speed: None,
            });
        }
    }
}

fn save_screenshot(
    data: &[u8],
    width: u32,
    height: u32,
    padded_row: u32,
    unpadded_row: u32,
    bgra: bool,
) -> Result<String> {
    let mut pixels = Vec::with_capacity((unpadded_row * height) as usize);
    for row in 0..height {
        let offset = (row * padded_row) as usize;
        let row_bytes = &data[offset..offset + unpadded_row as usize];
        if bgra {
            for chunk in row_bytes.chunks_exact(4) {
                pixels.extend_from_slice(&[chunk[2], chunk[1], chunk[0], chunk[3]]);
            }
        } else {
            pixels.extend_from_slice(row_bytes);
        }
    }

    std::fs::create_dir_all("captures").context("failed to create captures dir")?;

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = format!("city-sky-{stamp}.png");
    let path = std::path::Path::new("captures").join(&filename);
    let latest = std::path::Path::new("captures").join("latest.png");

    image::save_buffer(&path, &pixels, width, height, image::ColorType::Rgba8)
        .context("failed to encode PNG")?;
    let _ = std::fs::copy(&path, &latest);

    log::info!("screenshot saved: {}", path.display());
    Ok(filename)
}
