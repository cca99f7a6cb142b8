//! Model decoding.
//!
//! Models arrive as GLB (or glTF with embedded buffers). Every mesh
//! instance in the default scene is flattened into a [`Primitive`] with its
//! node transform baked into positions and normals, so the renderer only
//! ever applies the body's own world matrix.

use std::borrow::Cow;

use glam::{Mat3, Mat4, Vec3};
use gltf::image::Format;
use image::imageops::FilterType;
use image::RgbaImage;
use gltf::mesh::Mode;

use super::AssetError;

/// Interleaved vertex layout shared by every model.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Model-space position.
    pub position: [f32; 3],
    /// Unit normal.
    pub normal: [f32; 3],
    /// First texture coordinate set.
    pub uv: [f32; 2],
}

impl MeshVertex {
    /// Vertex buffer layout matching `raster/body.wgsl`.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> =
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
                2 => Float32x2,
            ],
        };
}

/// Surface parameters of one primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Linear RGBA multiplier on the base color texture.
    pub base_color: [f32; 4],
    /// Linear emitted radiance.
    pub emissive: [f32; 3],
    /// Index into [`ModelData::textures`].
    pub base_color_texture: Option<usize>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            emissive: [0.0; 3],
            base_color_texture: None,
        }
    }
}

/// One drawable triangle list.
#[derive(Debug, Clone)]
pub struct Primitive {
    /// Vertices with the node transform applied.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
    /// Surface parameters.
    pub material: Material,
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone)]
pub struct TextureImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed sRGB RGBA8 pixels.
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// 1x1 opaque white, the stand-in for an unusable image.
    #[must_use]
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }

    /// This image scaled down, keeping its aspect ratio, so neither side
    /// exceeds `max_side`. Images that already fit are borrowed as-is;
    /// empty or inconsistent ones become [`white`](Self::white).
    #[must_use]
    pub fn fit_within(&self, max_side: u32) -> Cow<'_, Self> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.width == 0 || self.height == 0 || self.rgba.len() != expected
        {
            log::warn!(
                "texture {}x{} with {} bytes is unusable, using white",
                self.width,
                self.height,
                self.rgba.len()
            );
            return Cow::Owned(Self::white());
        }
        let longest = self.width.max(self.height);
        let max_side = max_side.max(1);
        if longest <= max_side {
            return Cow::Borrowed(self);
        }

        let scale = |side: u32| {
            ((u64::from(side) * u64::from(max_side)) / u64::from(longest))
                .max(1) as u32
        };
        let (width, height) = (scale(self.width), scale(self.height));
        log::warn!(
            "texture {}x{} exceeds the {max_side}px limit, downscaling to \
             {width}x{height}",
            self.width,
            self.height
        );
        let Some(source) =
            RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
        else {
            return Cow::Owned(Self::white());
        };
        let resized = image::imageops::resize(
            &source,
            width,
            height,
            FilterType::Triangle,
        );
        Cow::Owned(Self {
            width,
            height,
            rgba: resized.into_raw(),
        })
    }
}

/// A whole model ready for upload.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    /// Flattened primitives.
    pub primitives: Vec<Primitive>,
    /// Images referenced by materials.
    pub textures: Vec<TextureImage>,
}

impl ModelData {
    /// Parse GLB or self-contained glTF bytes. `path` only labels errors
    /// and log lines.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Model`] if the bytes are not valid glTF, hold
    /// no scene, or embed an image in an unsupported pixel format.
    pub fn from_slice(path: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let (document, buffers, images) =
            gltf::import_slice(bytes).map_err(|e| AssetError::Model {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;

        let mut textures = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let rgba = to_rgba8(image.format, &image.pixels).ok_or_else(|| {
                AssetError::Model {
                    path: path.to_owned(),
                    reason: format!(
                        "image {i} has unsupported format {:?}",
                        image.format
                    ),
                }
            })?;
            textures.push(TextureImage {
                width: image.width,
                height: image.height,
                rgba,
            });
        }

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| AssetError::Model {
                path: path.to_owned(),
                reason: "no scene".to_owned(),
            })?;

        let mut primitives = Vec::new();
        let mut stack: Vec<(gltf::Node<'_>, Mat4)> = scene
            .nodes()
            .map(|node| (node, Mat4::IDENTITY))
            .collect();
        while let Some((node, parent)) = stack.pop() {
            let world = parent
                * Mat4::from_cols_array_2d(&node.transform().matrix());
            if let Some(mesh) = node.mesh() {
                for primitive in mesh.primitives() {
                    if primitive.mode() != Mode::Triangles {
                        log::warn!(
                            "{path}: skipping {:?} primitive in mesh {:?}",
                            primitive.mode(),
                            mesh.name()
                        );
                        continue;
                    }
                    if let Some(p) = read_primitive(&primitive, &buffers, world)
                    {
                        primitives.push(p);
                    } else {
                        log::warn!(
                            "{path}: skipping primitive without positions"
                        );
                    }
                }
            }
            stack.extend(node.children().map(|child| (child, world)));
        }

        if primitives.is_empty() {
            return Err(AssetError::Model {
                path: path.to_owned(),
                reason: "no triangle geometry".to_owned(),
            });
        }

        log::debug!(
            "{path}: {} primitives, {} textures",
            primitives.len(),
            textures.len()
        );
        Ok(Self {
            primitives,
            textures,
        })
    }

    /// Total vertex count across primitives.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.vertices.len()).sum()
    }
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
    world: Mat4,
) -> Option<Primitive> {
    let reader = primitive
        .reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let positions: Vec<Vec3> =
        reader.read_positions()?.map(Vec3::from_array).collect();
    let indices: Vec<u32> = reader.read_indices().map_or_else(
        || (0..positions.len() as u32).collect(),
        |i| i.into_u32().collect(),
    );
    let indices: Vec<u32> = indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| (i as usize) < positions.len()))
        .flatten()
        .copied()
        .collect();

    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(iter) => iter.map(Vec3::from_array).collect(),
        None => face_normals(&positions, &indices),
    };
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect())
        .unwrap_or_default();

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let n = normals.get(i).copied().unwrap_or(Vec3::Y);
            MeshVertex {
                position: world.transform_point3(p).to_array(),
                normal: (normal_matrix * n).normalize_or(Vec3::Y).to_array(),
                uv: uvs.get(i).copied().unwrap_or([0.0; 2]),
            }
        })
        .collect();

    let pbr = primitive.material().pbr_metallic_roughness();
    let material = Material {
        base_color: pbr.base_color_factor(),
        emissive: primitive.material().emissive_factor(),
        base_color_texture: pbr
            .base_color_texture()
            .map(|info| info.texture().source().index()),
    };

    Some(Primitive {
        vertices,
        indices,
        material,
    })
}

/// Area-weighted vertex normals from triangle faces.
fn face_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let n =
            (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y))
        .collect()
}

/// Expand any 8-bit or 16-bit glTF pixel format to RGBA8. Float formats
/// are not used by base color textures and return `None`.
fn to_rgba8(format: Format, pixels: &[u8]) -> Option<Vec<u8>> {
    let rgba = match format {
        Format::R8G8B8A8 => pixels.to_vec(),
        Format::R8G8B8 => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        Format::R16G16B16A16 => {
            pixels.chunks_exact(2).map(high_byte).collect()
        }
        Format::R16G16B16 => pixels
            .chunks_exact(6)
            .flat_map(|p| {
                [
                    high_byte(&p[0..2]),
                    high_byte(&p[2..4]),
                    high_byte(&p[4..6]),
                    255,
                ]
            })
            .collect(),
        Format::R16G16 => pixels
            .chunks_exact(4)
            .flat_map(|p| {
                let l = high_byte(&p[0..2]);
                [l, l, l, high_byte(&p[2..4])]
            })
            .collect(),
        Format::R16 => pixels
            .chunks_exact(2)
            .flat_map(|p| {
                let l = high_byte(p);
                [l, l, l, 255]
            })
            .collect(),
        _ => return None,
    };
    Some(rgba)
}

/// Most significant byte of a little-endian u16 sample.
fn high_byte(sample: &[u8]) -> u8 {
    sample.get(1).copied().unwrap_or(0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal GLB: one triangle with positions only, under a translated
    /// node.
    #[must_use]
    pub(crate) fn triangle_glb() -> Vec<u8> {
        let positions: [[f32; 3]; 3] =
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let bin: Vec<u8> = bytemuck::cast_slice(&positions).to_vec();

        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0, "translation": [1.0, 2.0, 3.0] }],
            "meshes": [{
                "primitives": [{ "attributes": { "POSITION": 0 } }]
            }],
            "buffers": [{ "byteLength": bin.len() }],
            "bufferViews": [{
                "buffer": 0,
                "byteOffset": 0,
                "byteLength": bin.len()
            }],
            "accessors": [{
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, 0.0, 0.0],
                "max": [1.0, 1.0, 0.0]
            }]
        });
        let mut json = serde_json::to_vec(&json).unwrap();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(size_of::<MeshVertex>(), 32);
    }

    #[test]
    fn parses_glb_and_bakes_node_transform() {
        let model =
            ModelData::from_slice("tri.glb", &triangle_glb()).unwrap();
        assert_eq!(model.primitives.len(), 1);
        assert!(model.textures.is_empty());

        let prim = &model.primitives[0];
        assert_eq!(prim.indices, vec![0, 1, 2]);
        assert_eq!(prim.vertices[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(prim.vertices[1].position, [2.0, 2.0, 3.0]);
        for v in &prim.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n - Vec3::Z).length() < 1e-5);
        }
        assert_eq!(prim.material, Material::default());
        assert_eq!(model.vertex_count(), 3);
    }

    #[test]
    fn garbage_is_a_model_error() {
        let err = ModelData::from_slice("bad.glb", b"not a model").unwrap_err();
        assert!(matches!(
            err,
            AssetError::Model { ref path, .. } if path == "bad.glb"
        ));
    }

    #[test]
    fn pixel_formats_expand_to_rgba8() {
        assert_eq!(
            to_rgba8(Format::R8G8B8, &[1, 2, 3, 4, 5, 6]).unwrap(),
            vec![1, 2, 3, 255, 4, 5, 6, 255]
        );
        assert_eq!(to_rgba8(Format::R8, &[7]).unwrap(), vec![7, 7, 7, 255]);
        assert_eq!(
            to_rgba8(Format::R8G8, &[9, 100]).unwrap(),
            vec![9, 9, 9, 100]
        );
        assert_eq!(
            to_rgba8(Format::R16G16B16A16, &[0, 1, 0, 2, 0, 3, 0, 4])
                .unwrap(),
            vec![1, 2, 3, 4]
        );
        assert!(to_rgba8(Format::R32G32B32FLOAT, &[0; 12]).is_none());
    }

    fn solid(width: u32, height: u32) -> TextureImage {
        TextureImage {
            width,
            height,
            rgba: [40, 80, 120, 255].repeat((width * height) as usize),
        }
    }

    #[test]
    fn oversized_textures_are_capped_to_the_limit() {
        let wide = solid(64, 16);
        let fitted = wide.fit_within(16);
        assert!(matches!(fitted, Cow::Owned(_)));
        assert_eq!((fitted.width, fitted.height), (16, 4));
        assert_eq!(fitted.rgba.len(), 16 * 4 * 4);
        assert_eq!(&fitted.rgba[..4], &[40, 80, 120, 255]);

        let tall = solid(8, 32);
        let fitted = tall.fit_within(16);
        assert_eq!((fitted.width, fitted.height), (4, 16));
    }

    #[test]
    fn textures_within_the_limit_are_borrowed() {
        let image = solid(16, 8);
        let fitted = image.fit_within(16);
        assert!(matches!(fitted, Cow::Borrowed(_)));
        assert_eq!((fitted.width, fitted.height), (16, 8));
    }

    #[test]
    fn extreme_aspect_keeps_at_least_one_pixel() {
        let strip = solid(1024, 1);
        let fitted = strip.fit_within(8);
        assert_eq!((fitted.width, fitted.height), (8, 1));
    }

    #[test]
    fn inconsistent_textures_become_white() {
        let broken = TextureImage {
            width: 4,
            height: 4,
            rgba: vec![0; 3],
        };
        let fitted = broken.fit_within(16);
        assert_eq!((fitted.width, fitted.height), (1, 1));
        assert_eq!(fitted.rgba, vec![255; 4]);
    }

    #[test]
    fn face_normals_fall_back_for_degenerate_triangles() {
        let positions = [Vec3::ZERO, Vec3::ZERO, Vec3::ZERO];
        let normals = face_normals(&positions, &[0, 1, 2]);
        assert!(normals.iter().all(|&n| n == Vec3::Y));
    }
}
