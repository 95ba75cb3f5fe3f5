//! GPU texture upload and depth-buffer creation.

use crate::texture::{PixelFormat, PngTexture};

/// Depth buffer format shared by every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Create a depth texture view matching the surface size.
#[must_use]
pub fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Upload a decoded PNG as an `Rgba8UnormSrgb` texture.
///
/// Non-RGBA channel layouts are expanded on the CPU; texture strides on
/// the GPU side always assume four bytes per pixel.
#[must_use]
pub fn upload_png(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    png: &PngTexture,
    label: &str,
) -> wgpu::TextureView {
    let rgba = to_rgba(png);
    let size = wgpu::Extent3d {
        width: png.width,
        height: png.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * png.width),
            rows_per_image: Some(png.height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// A 1x1 opaque white texture, bound in place of missing textures so
/// every draw uses the same bind group layout.
#[must_use]
pub fn white_pixel(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
    let png = PngTexture {
        pixels: vec![255; 4],
        width: 1,
        height: 1,
        format: PixelFormat::Rgba,
    };
    upload_png(device, queue, &png, "White Pixel")
}

fn to_rgba(png: &PngTexture) -> Vec<u8> {
    match png.format {
        PixelFormat::Rgba => png.pixels.clone(),
        PixelFormat::Rgb => png
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        PixelFormat::Gray => png.pixels.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        PixelFormat::GrayAlpha => png
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_expands_to_rgba() {
        let png = PngTexture {
            pixels: vec![10, 20, 30, 40, 50, 60],
            width: 2,
            height: 1,
            format: PixelFormat::Rgb,
        };
        assert_eq!(to_rgba(&png), vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn gray_alpha_expands_to_rgba() {
        let png = PngTexture {
            pixels: vec![100, 200],
            width: 1,
            height: 1,
            format: PixelFormat::GrayAlpha,
        };
        assert_eq!(to_rgba(&png), vec![100, 100, 100, 200]);
    }
}
