use super::pipeline_util;
use crate::assets::CubeFaces;
use crate::gpu::pipeline_helpers;
use crate::gpu::shader_composer::{ShaderComposer, ShaderError};
use crate::gpu::texture::create_cube_texture;

struct SkyTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Fullscreen cube-map background drawn before the bodies.
pub struct SkyboxRenderer {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    sky: Option<SkyTexture>,
}

impl SkyboxRenderer {
    /// Build the pipeline against the frame layout (group 0).
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the skybox shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, ShaderError> {
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Skybox Layout"),
                entries: &[
                    pipeline_helpers::texture(
                        0,
                        wgpu::TextureViewDimension::Cube,
                    ),
                    pipeline_helpers::filtering_sampler(1),
                ],
            });

        let shader = shader_composer.compose(
            device,
            "Skybox Shader",
            "screen/skybox.wgsl",
        )?;
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Skybox Pipeline Layout"),
                bind_group_layouts: &[frame_layout, &layout],
                push_constant_ranges: &[],
            });
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Skybox Pipeline"),
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
                    targets: &pipeline_util::opaque_target(format),
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: Some(pipeline_util::background_depth_state()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        let sampler =
            pipeline_helpers::linear_clamp_sampler(device, "Skybox Sampler");

        Ok(Self {
            pipeline,
            layout,
            sampler,
            sky: None,
        })
    }

    /// Replace the cube map, destroying any previous one.
    pub fn set_faces(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &CubeFaces,
    ) {
        let texture = create_cube_texture(
            device,
            queue,
            "Skybox Texture",
            faces.side,
            &faces.faces,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Skybox View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox Bind Group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.release();
        self.sky = Some(SkyTexture {
            texture,
            bind_group,
        });
    }

    /// Whether a cube map is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.sky.is_some()
    }

    /// Draw the background. Does nothing until a cube map is loaded.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        frame_bind_group: &wgpu::BindGroup,
    ) {
        let Some(sky) = &self.sky else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
        pass.set_bind_group(1, &sky.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    /// Destroy the cube map.
    pub fn release(&mut self) {
        if let Some(sky) = self.sky.take() {
            sky.texture.destroy();
        }
    }
}
