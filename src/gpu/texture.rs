//! Sampled texture holding the latest CPU-rasterized frame.

use crate::surface::SurfaceSize;

/// A sampled 2D texture that is rewritten from the CPU every frame.
///
/// Created with `TEXTURE_BINDING | COPY_DST` usage: the viewer uploads the
/// raster with `Queue::write_texture` and the present pass samples it.
pub struct SceneTexture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    size: SurfaceSize,
}

impl SceneTexture {
    /// Create an uninitialized texture of the given size and format. Zero
    /// dimensions are bumped to one texel.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        size: SurfaceSize,
        format: wgpu::TextureFormat,
    ) -> Self {
        let size = SurfaceSize::new(size.width.max(1), size.height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Texture"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size,
        }
    }

    /// Texel dimensions.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Replace the contents with tightly packed RGBA8 rows. Uploads of the
    /// wrong length are skipped.
    pub fn upload(&self, queue: &wgpu::Queue, rgba: &[u8]) {
        let expected = (self.size.width * self.size.height * 4) as usize;
        if rgba.len() != expected {
            log::warn!(
                "skipping scene upload: {} bytes for a {}x{} texture",
                rgba.len(),
                self.size.width,
                self.size.height
            );
            return;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.size.width * 4),
                rows_per_image: Some(self.size.height),
            },
            extent(self.size),
        );
    }
}

fn extent(size: SurfaceSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}
