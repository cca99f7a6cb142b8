use wgpu::util::DeviceExt;

use super::lighting::LightingUniform;
use crate::gpu::pipeline_helpers;

/// Group 0, shared by every pipeline: camera at binding 0, lighting at
/// binding 1.
pub struct FrameBindings {
    /// Layout for group 0.
    pub layout: wgpu::BindGroupLayout,
    /// Bind group over the camera and lighting buffers.
    pub bind_group: wgpu::BindGroup,
    lighting_buffer: wgpu::Buffer,
    lighting: LightingUniform,
}

impl FrameBindings {
    /// Bind `camera_buffer` together with a new lighting buffer.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        camera_buffer: &wgpu::Buffer,
        lighting: LightingUniform,
    ) -> Self {
        let stages = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[
                    pipeline_helpers::uniform_buffer(0, stages),
                    pipeline_helpers::uniform_buffer(1, stages),
                ],
            });

        let lighting_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lighting Buffer"),
                contents: bytemuck::cast_slice(&[lighting]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            layout,
            bind_group,
            lighting_buffer,
            lighting,
        }
    }

    /// Upload lighting if it changed since the last call.
    pub fn update_lighting(
        &mut self,
        queue: &wgpu::Queue,
        lighting: LightingUniform,
    ) {
        if lighting != self.lighting {
            self.lighting = lighting;
            queue.write_buffer(
                &self.lighting_buffer,
                0,
                bytemuck::cast_slice(&[lighting]),
            );
        }
    }

    /// Lighting last uploaded.
    #[must_use]
    pub fn lighting(&self) -> &LightingUniform {
        &self.lighting
    }

    /// Free the lighting buffer. The camera buffer belongs to the camera
    /// controller.
    pub fn destroy(&self) {
        self.lighting_buffer.destroy();
    }
}
