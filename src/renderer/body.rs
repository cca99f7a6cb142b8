//! Mesh renderer for celestial bodies.
//!
//! Each loaded model owns its vertex/index buffers, textures and one
//! material bind group per primitive. Per-node transforms live in a single
//! [`UniformArray`] addressed with dynamic offsets, indexed by position in
//! the frame's draw list.

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::pipeline_util;
use crate::assets::model::{Material, ModelData, Primitive};
use crate::assets::MeshVertex;
use crate::gpu::dynamic_buffer::UniformArray;
use crate::gpu::pipeline_helpers;
use crate::gpu::shader_composer::{ShaderComposer, ShaderError};
use crate::gpu::texture::create_rgba_texture;
use crate::scene::system::DrawItem;
use crate::scene::ModelSlot;

/// Per-node transform block, mirrors `NodeUniform` in `raster/body.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    /// Model-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model` for normals.
    pub normal: [[f32; 4]; 4],
    /// 1.0 to skip lighting.
    pub unlit: f32,
    pub(crate) _pad: [f32; 3],
}

impl NodeUniform {
    /// Block for a world matrix.
    #[must_use]
    pub fn new(world: Mat4, unlit: bool) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal: world.inverse().transpose().to_cols_array_2d(),
            unlit: if unlit { 1.0 } else { 0.0 },
            _pad: [0.0; 3],
        }
    }
}

/// Mirrors `MaterialUniform` in `raster/body.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
    base_color: [f32; 4],
    emissive: [f32; 3],
    _pad: f32,
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        Self {
            base_color: material.base_color,
            emissive: material.emissive,
            _pad: 0.0,
        }
    }
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuModel {
    primitives: Vec<GpuPrimitive>,
    textures: Vec<wgpu::Texture>,
}

impl GpuModel {
    fn destroy(&self) {
        for p in &self.primitives {
            p.vertex_buffer.destroy();
            p.index_buffer.destroy();
            p.material_buffer.destroy();
        }
        for t in &self.textures {
            t.destroy();
        }
    }
}

/// Draws every loaded body model.
pub struct BodyRenderer {
    pipeline: wgpu::RenderPipeline,
    node_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    nodes: UniformArray<NodeUniform>,
    node_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    white: wgpu::Texture,
    white_view: wgpu::TextureView,
    models: Vec<Option<GpuModel>>,
    /// Draw list uploaded by the last [`prepare`](Self::prepare).
    prepared: Vec<ModelSlot>,
}

impl BodyRenderer {
    /// Build the pipeline against the frame layout (group 0).
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the body shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, ShaderError> {
        let node_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Body Node Layout"),
                entries: &[pipeline_helpers::dynamic_uniform_buffer(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    UniformArray::<NodeUniform>::binding_size(),
                )],
            });
        let material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Body Material Layout"),
                entries: &[
                    pipeline_helpers::uniform_buffer(
                        0,
                        wgpu::ShaderStages::FRAGMENT,
                    ),
                    pipeline_helpers::texture(
                        1,
                        wgpu::TextureViewDimension::D2,
                    ),
                    pipeline_helpers::filtering_sampler(2),
                ],
            });

        let shader = shader_composer.compose(
            device,
            "Body Shader",
            "raster/body.wgsl",
        )?;
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Body Pipeline Layout"),
                bind_group_layouts: &[
                    frame_layout,
                    &node_layout,
                    &material_layout,
                ],
                push_constant_ranges: &[],
            });
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Body Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[MeshVertex::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &pipeline_util::opaque_target(format),
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(pipeline_util::depth_stencil_state()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        let nodes = UniformArray::new(device, "Body Node Uniforms", 16);
        let node_bind_group =
            Self::create_node_bind_group(device, &node_layout, &nodes);

        let white = create_rgba_texture(
            device,
            queue,
            "White Texture",
            1,
            1,
            &[255; 4],
        );
        let white_view =
            white.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler =
            pipeline_helpers::linear_repeat_sampler(device, "Body Sampler");

        Ok(Self {
            pipeline,
            node_layout,
            material_layout,
            nodes,
            node_bind_group,
            sampler,
            white,
            white_view,
            models: Vec::new(),
            prepared: Vec::new(),
        })
    }

    fn create_node_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        nodes: &UniformArray<NodeUniform>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Body Node Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: nodes.buffer(),
                    offset: 0,
                    size: UniformArray::<NodeUniform>::binding_size(),
                }),
            }],
        })
    }

    /// Upload a decoded model and return its slot. Textures larger than
    /// the device's 2D limit are downscaled to fit.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        model: &ModelData,
    ) -> ModelSlot {
        let max_side = device.limits().max_texture_dimension_2d;
        let textures: Vec<wgpu::Texture> = model
            .textures
            .iter()
            .enumerate()
            .map(|(i, image)| {
                let image = image.fit_within(max_side);
                create_rgba_texture(
                    device,
                    queue,
                    &format!("{label} texture {i}"),
                    image.width,
                    image.height,
                    &image.rgba,
                )
            })
            .collect();
        let views: Vec<wgpu::TextureView> = textures
            .iter()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
            .collect();

        let primitives = model
            .primitives
            .iter()
            .filter(|p| !p.indices.is_empty())
            .map(|p| self.upload_primitive(device, label, p, &views))
            .collect();

        let gpu = GpuModel {
            primitives,
            textures,
        };
        let slot = match self.models.iter().position(Option::is_none) {
            Some(free) => {
                self.models[free] = Some(gpu);
                ModelSlot(free)
            }
            None => {
                self.models.push(Some(gpu));
                ModelSlot(self.models.len() - 1)
            }
        };
        log::debug!(
            "{label}: uploaded {} vertices into slot {}",
            model.vertex_count(),
            slot.0
        );
        slot
    }

    fn upload_primitive(
        &self,
        device: &wgpu::Device,
        label: &str,
        primitive: &Primitive,
        views: &[wgpu::TextureView],
    ) -> GpuPrimitive {
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} vertices")),
                contents: bytemuck::cast_slice(&primitive.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} indices")),
                contents: bytemuck::cast_slice(&primitive.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let material_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} material")),
                contents: bytemuck::cast_slice(&[MaterialUniform::from(
                    &primitive.material,
                )]),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let view = primitive
            .material
            .base_color_texture
            .and_then(|i| views.get(i))
            .unwrap_or(&self.white_view);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} material bind group")),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        GpuPrimitive {
            vertex_buffer,
            index_buffer,
            index_count: primitive.indices.len() as u32,
            material_buffer,
            bind_group,
        }
    }

    /// Destroy the model in `slot`. Unknown or empty slots are ignored.
    pub fn release(&mut self, slot: ModelSlot) {
        if let Some(model) = self.models.get_mut(slot.0).and_then(Option::take)
        {
            model.destroy();
        }
    }

    /// Number of models resident on the GPU.
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.iter().flatten().count()
    }

    /// Upload per-node transforms for this frame's draw list.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        draw_list: &[DrawItem],
    ) {
        let uniforms: Vec<NodeUniform> = draw_list
            .iter()
            .map(|item| NodeUniform::new(item.world, item.unlit))
            .collect();
        if self.nodes.write(device, queue, &uniforms) {
            self.node_bind_group = Self::create_node_bind_group(
                device,
                &self.node_layout,
                &self.nodes,
            );
        }
        self.prepared = draw_list.iter().map(|item| item.slot).collect();
    }

    /// Record draws for the list passed to the last
    /// [`prepare`](Self::prepare).
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        frame_bind_group: &wgpu::BindGroup,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
        for (i, slot) in self.prepared.iter().enumerate() {
            let Some(Some(model)) = self.models.get(slot.0) else {
                continue;
            };
            pass.set_bind_group(
                1,
                &self.node_bind_group,
                &[self.nodes.offset(i)],
            );
            for p in &model.primitives {
                pass.set_bind_group(2, &p.bind_group, &[]);
                pass.set_vertex_buffer(0, p.vertex_buffer.slice(..));
                pass.set_index_buffer(
                    p.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..p.index_count, 0, 0..1);
            }
        }
    }

    /// Destroy every model and the renderer's own buffers and textures.
    pub fn destroy_all(&mut self) {
        for model in self.models.drain(..).flatten() {
            model.destroy();
        }
        self.prepared.clear();
        self.nodes.destroy();
        self.white.destroy();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn uniform_layouts_match_wgsl() {
        assert_eq!(size_of::<NodeUniform>(), 144);
        assert_eq!(size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let u = NodeUniform::new(world, false);
        let normal = Mat4::from_cols_array_2d(&u.normal);
        let n = normal.transform_vector3(Vec3::X);
        assert!((n - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(u.unlit, 0.0);
        assert_eq!(NodeUniform::new(world, true).unlit, 1.0);
    }
}
