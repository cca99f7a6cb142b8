use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::camera::core::{Camera, CameraUniform};
use crate::camera::orbit::OrbitControls;
use crate::gpu::render_context::RenderContext;
use crate::options::CameraOptions;

/// Orbit camera plus its GPU uniform buffer.
pub struct CameraController {
    controls: OrbitControls,

    /// Current camera state, rebuilt from the controls every update.
    pub camera: Camera,
    /// CPU copy of the uniform.
    pub uniform: CameraUniform,
    /// Uniform buffer bound in the per-frame bind group.
    pub buffer: wgpu::Buffer,
}

impl CameraController {
    /// Camera at the initial pose from `options`, sized to the context's
    /// surface.
    #[must_use]
    pub fn new(context: &RenderContext, options: &CameraOptions) -> Self {
        let controls = OrbitControls::new(options);
        let camera = Camera {
            eye: controls.eye(),
            target: controls.target(),
            up: Vec3::Y,
            aspect: aspect_ratio(context.width(), context.height()),
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        };

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera);

        let buffer = context.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            },
        );

        Self {
            controls,
            camera,
            uniform,
            buffer,
        }
    }

    /// Step the controls and upload the matrices. Returns `true` while the
    /// camera is moving.
    pub fn update_gpu(&mut self, queue: &wgpu::Queue) -> bool {
        let moved = self.controls.update();
        self.camera.eye = self.controls.eye();
        self.camera.target = self.controls.target();
        self.uniform.update_view_proj(&self.camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        moved
    }

    /// Track a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.aspect = aspect_ratio(width, height);
    }

    /// Orbit from a drag of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        self.controls.rotate(delta, viewport_height);
    }

    /// Pan from a drag of `delta` pixels.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32) {
        self.controls.pan(delta, viewport_height);
    }

    /// Dolly toward (positive) or away from (negative) the target.
    pub fn zoom(&mut self, delta: f32) {
        self.controls.zoom(delta);
    }

    /// Return to the initial pose.
    pub fn reset(&mut self) {
        self.controls.reset();
    }

    /// Apply updated projection, limits and speeds.
    pub fn apply_options(&mut self, options: &CameraOptions) {
        self.controls.configure(options);
        self.camera.fovy = options.fovy;
        self.camera.znear = options.znear;
        self.camera.zfar = options.zfar;
    }

    /// Orbit controls, for inspection.
    #[must_use]
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Free the uniform buffer.
    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
