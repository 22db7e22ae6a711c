//! Error type shared by the GPU context, the torus builder and the app loop.

/// Errors that can occur while setting up or driving the renderer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Torus parameters that cannot produce a closed mesh.
    #[error("invalid torus parameters: {0}")]
    InvalidTorus(String),
    /// The window system refused to create a window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// The event loop could not be created or exited abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// wgpu could not create a surface for the window.
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    /// No adapter compatible with the surface was found.
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to hand out a device.
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    /// The surface reported it has run out of memory while acquiring a frame.
    #[error("surface out of memory")]
    OutOfMemory,
}

pub type Result<T> = std::result::Result<T, Error>;
