use std::{fmt, sync::Arc};

use winit::window::Window;

use crate::surface::SurfaceSize;

/// Why the window could not get a GPU presentation target.
#[derive(Debug)]
pub enum RenderContextError {
    /// wgpu refused to create a surface for the window.
    Surface(wgpu::CreateSurfaceError),
    /// No adapter can present to the window surface.
    Adapter(wgpu::RequestAdapterError),
    /// The adapter refused a device with default limits.
    Device(wgpu::RequestDeviceError),
    /// The adapter offers no configuration for this surface.
    NoSurfaceConfig,
}

impl fmt::Display for RenderContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(e) => write!(f, "cannot create window surface: {e}"),
            Self::Adapter(e) => write!(f, "no adapter for window surface: {e}"),
            Self::Device(e) => write!(f, "cannot open GPU device: {e}"),
            Self::NoSurfaceConfig => {
                write!(f, "adapter has no configuration for window surface")
            }
        }
    }
}

impl std::error::Error for RenderContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Surface(e) => Some(e),
            Self::Adapter(e) => Some(e),
            Self::Device(e) => Some(e),
            Self::NoSurfaceConfig => None,
        }
    }
}

/// What happened to a frame handed to [`RenderContext::present`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// The frame reached the window.
    Presented,
    /// The surface was stale; it has been reconfigured and the frame dropped.
    Reconfigured,
    /// The swapchain had no texture to give (timeout, out of memory).
    Dropped,
}

/// A window together with the device that presents scene frames on it.
pub struct RenderContext {
    /// The wgpu logical device.
    pub device: wgpu::Device,
    /// The wgpu command queue.
    pub queue: wgpu::Queue,
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl RenderContext {
    /// Open a device able to present on `window`, preferring a low-power
    /// adapter since the GPU only samples one texture per frame.
    ///
    /// # Errors
    ///
    /// Any step of surface, adapter or device creation can fail; see
    /// [`RenderContextError`].
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .map_err(RenderContextError::Surface)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                power_preference: wgpu::PowerPreference::LowPower,
                ..Default::default()
            })
            .await
            .map_err(RenderContextError::Adapter)?;
        log::info!("presenting with {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Scene Device"),
                ..Default::default()
            })
            .await
            .map_err(RenderContextError::Device)?;

        let inner = window.inner_size();
        let mut config = surface
            .get_default_config(&adapter, inner.width.max(1), inner.height.max(1))
            .ok_or(RenderContextError::NoSurfaceConfig)?;
        config.present_mode = wgpu::PresentMode::Fifo;
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            window,
            surface,
            config,
        })
    }

    /// The window being presented to.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Swapchain texture format.
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current swapchain size in physical pixels.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    /// Follow a window resize. A minimized (zero-sized) window keeps the
    /// previous configuration; returns whether anything changed.
    pub fn resize(&mut self, size: SurfaceSize) -> bool {
        if size.is_empty() || size == self.size() {
            return false;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        true
    }

    /// Acquire the next swapchain texture, let `record` encode into it, and
    /// present. Stale surfaces are reconfigured for the next attempt.
    pub fn present(
        &self,
        record: impl FnOnce(&mut wgpu::CommandEncoder, &wgpu::TextureView),
    ) -> PresentOutcome {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                log::debug!("surface outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return PresentOutcome::Reconfigured;
            }
            Err(e) => {
                log::warn!("no swapchain texture: {e}");
                return PresentOutcome::Dropped;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });
        record(&mut encoder, &view);
        let _ = self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();
        PresentOutcome::Presented
    }
}
