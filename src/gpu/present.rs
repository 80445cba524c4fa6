//! Full-screen pass presenting the rasterized scene on the swapchain.
//!
//! The scene raster is flattened over the palette background, uploaded to
//! a [`SceneTexture`], and drawn with one oversized triangle. When the
//! window and raster aspect ratios differ the raster is letterboxed and
//! the bars are cleared to the background color.

use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::SceneTexture;
use crate::surface::{RasterSurface, Surface, SurfaceSize};

/// Placement of the scene rectangle in viewport UV space.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PresentParams {
    /// Fraction of the viewport covered by the scene on each axis.
    pub scale: [f32; 2],
    /// UV of the scene's top-left corner.
    pub offset: [f32; 2],
}

impl PresentParams {
    /// Fit `scene` inside `target` preserving aspect ratio, centered.
    #[must_use]
    pub fn letterbox(scene: SurfaceSize, target: SurfaceSize) -> Self {
        if scene.is_empty() || target.is_empty() {
            return Self {
                scale: [1.0, 1.0],
                offset: [0.0, 0.0],
            };
        }
        let (sw, sh) = (scene.width as f32, scene.height as f32);
        let (tw, th) = (target.width as f32, target.height as f32);
        let fit = (tw / sw).min(th / sh);
        let scale = [sw * fit / tw, sh * fit / th];
        Self {
            scale,
            offset: [(1.0 - scale[0]) / 2.0, (1.0 - scale[1]) / 2.0],
        }
    }
}

/// Uploads scene frames and draws them to the window.
pub struct PresentPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    texture: SceneTexture,
    bind_group: wgpu::BindGroup,
    background: [f32; 3],
    clear_color: wgpu::Color,
}

impl PresentPass {
    /// Build the pipeline and a texture for scene frames of `scene_size`.
    #[must_use]
    pub fn new(
        context: &RenderContext,
        scene_size: SurfaceSize,
        background: [f32; 3],
    ) -> Self {
        let device = &context.device;
        let shader = device
            .create_shader_module(wgpu::include_wgsl!("../../assets/shaders/present.wgsl"));

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Present Bind Group Layout"),
            entries: &[
                // Binding 0: scene texture
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Binding 1: sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Binding 2: letterbox placement
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Present Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Present Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Present Params"),
            size: size_of::<PresentParams>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texture = SceneTexture::new(device, scene_size, texture_format(context.format()));
        let bind_group = create_bind_group(device, &layout, &texture, &sampler, &params_buffer);

        let pass = Self {
            pipeline,
            layout,
            sampler,
            params_buffer,
            texture,
            bind_group,
            background,
            clear_color: clear_color(background, context.format()),
        };
        pass.update_placement(context);
        pass
    }

    /// Recompute the letterbox for the current window size.
    pub fn update_placement(&self, context: &RenderContext) {
        let params = PresentParams::letterbox(self.texture.size(), context.size());
        context
            .queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));
    }

    /// Upload a finished raster. A raster of a new size replaces the
    /// texture first.
    pub fn upload(&mut self, context: &RenderContext, raster: &RasterSurface) {
        let size = raster.size();
        if size.is_empty() {
            return;
        }
        if size != self.texture.size() {
            log::debug!("scene texture resized to {}x{}", size.width, size.height);
            self.texture =
                SceneTexture::new(&context.device, size, texture_format(context.format()));
            self.bind_group = create_bind_group(
                &context.device,
                &self.layout,
                &self.texture,
                &self.sampler,
                &self.params_buffer,
            );
            self.update_placement(context);
        }
        self.texture
            .upload(&context.queue, &raster.to_rgba8_over(self.background));
    }

    /// Record the blit into `view`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Present Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &SceneTexture,
    sampler: &wgpu::Sampler,
    params: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Present Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: params.as_entire_binding(),
            },
        ],
    })
}

/// Raster bytes are sRGB-encoded; decode on sample when the swapchain
/// re-encodes on write.
fn texture_format(surface_format: wgpu::TextureFormat) -> wgpu::TextureFormat {
    if surface_format.is_srgb() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

/// Clear colors are linear for sRGB targets.
fn clear_color(background: [f32; 3], surface_format: wgpu::TextureFormat) -> wgpu::Color {
    let channel = |c: f32| {
        let c = f64::from(c);
        if !surface_format.is_srgb() {
            c
        } else if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    wgpu::Color {
        r: channel(background[0]),
        g: channel(background[1]),
        b: channel(background[2]),
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_aspect_fills_the_viewport() {
        let p = PresentParams::letterbox(SurfaceSize::new(800, 600), SurfaceSize::new(800, 600));
        assert_eq!(p.scale, [1.0, 1.0]);
        assert_eq!(p.offset, [0.0, 0.0]);
    }

    #[test]
    fn square_scene_in_wide_window_is_pillarboxed() {
        let p = PresentParams::letterbox(SurfaceSize::new(320, 320), SurfaceSize::new(640, 320));
        assert!((p.scale[0] - 0.5).abs() < 1e-6);
        assert!((p.scale[1] - 1.0).abs() < 1e-6);
        assert!((p.offset[0] - 0.25).abs() < 1e-6);
        assert_eq!(p.offset[1], 0.0);
    }

    #[test]
    fn empty_sizes_fall_back_to_identity() {
        let p = PresentParams::letterbox(SurfaceSize::new(0, 320), SurfaceSize::new(640, 320));
        assert_eq!(p.scale, [1.0, 1.0]);
    }

    #[test]
    fn clear_color_is_linearized_for_srgb() {
        let linear = clear_color([0.5, 0.0, 1.0], wgpu::TextureFormat::Bgra8UnormSrgb);
        assert!((linear.r - 0.214).abs() < 1e-3);
        assert_eq!(linear.g, 0.0);
        assert!((linear.b - 1.0).abs() < 1e-9);
        let raw = clear_color([0.5, 0.0, 1.0], wgpu::TextureFormat::Bgra8Unorm);
        assert!((raw.r - 0.5).abs() < 1e-9);
    }
}
