use std::io::Cursor;

use image::error::{LimitError, LimitErrorKind};

use crate::gpu::GpuContext;

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Wrap around the longitude seam, clamp at the poles
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// A 1x1 texture of a single color, used for untextured draws.
    pub fn solid(gpu: &GpuContext, rgba: [u8; 4], label: &str) -> Self {
        Self::from_rgba(gpu, &rgba, 1, 1, label)
    }

    /// Load a texture from an image file.
    ///
    /// Images larger than the device's 2D texture limit are rejected with
    /// [`image::ImageError::Limits`] instead of reaching the GPU.
    pub fn from_file(gpu: &GpuContext, path: &str) -> Result<Self, image::ImageError> {
        let max = gpu.device.limits().max_texture_dimension_2d;
        let mut reader = image::ImageReader::open(path)?.with_guessed_format()?;
        reader.limits(decode_limits(max));
        let img = reader.decode()?.to_rgba8();
        let (width, height) = img.dimensions();
        check_dimensions(width, height, max)?;
        tracing::info!(path, width, height, "loaded texture");
        Ok(Self::from_rgba(gpu, &img, width, height, path))
    }

    /// Load a texture from embedded bytes.
    pub fn from_bytes(
        gpu: &GpuContext,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, image::ImageError> {
        let max = gpu.device.limits().max_texture_dimension_2d;
        let mut reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        reader.limits(decode_limits(max));
        let img = reader.decode()?.to_rgba8();
        let (width, height) = img.dimensions();
        check_dimensions(width, height, max)?;
        Ok(Self::from_rgba(gpu, &img, width, height, label))
    }
}

/// Decoder limits that stop oversized images before they are decoded.
fn decode_limits(max_dimension: u32) -> image::Limits {
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);
    limits
}

/// Rejects images the GPU cannot hold in a single 2D texture.
fn check_dimensions(
    width: u32,
    height: u32,
    max_dimension: u32,
) -> Result<(), image::ImageError> {
    if width == 0 || height == 0 || width > max_dimension || height > max_dimension {
        return Err(image::ImageError::Limits(LimitError::from_kind(
            LimitErrorKind::DimensionError,
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_within_device_limit() {
        assert!(check_dimensions(4096, 2048, 8192).is_ok());
        assert!(check_dimensions(8192, 8192, 8192).is_ok());
        assert!(check_dimensions(1, 1, 8192).is_ok());
    }

    #[test]
    fn oversized_maps_are_rejected() {
        let err = check_dimensions(16384, 8192, 8192).unwrap_err();
        assert!(matches!(err, image::ImageError::Limits(_)));
        assert!(check_dimensions(8192, 8193, 8192).is_err());
        assert!(check_dimensions(0, 16, 8192).is_err());
    }

    #[test]
    fn decoder_stops_at_device_limit() {
        // 2x1 PNG against a 1 pixel limit
        let mut png = Vec::new();
        image::RgbaImage::new(2, 1)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut reader = image::ImageReader::new(Cursor::new(&png[..]))
            .with_guessed_format()
            .unwrap();
        reader.limits(decode_limits(1));
        let err = reader.decode().unwrap_err();
        assert!(matches!(err, image::ImageError::Limits(_)));

        let mut reader = image::ImageReader::new(Cursor::new(&png[..]))
            .with_guessed_format()
            .unwrap();
        reader.limits(decode_limits(8192));
        assert_eq!(reader.decode().unwrap().width(), 2);
    }
}
