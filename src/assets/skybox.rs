use image::imageops::FilterType;

use super::AssetError;

/// Largest cube face edge uploaded, in pixels.
pub const MAX_FACE_SIZE: u32 = 2048;

/// Six square RGBA8 faces in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone)]
pub struct CubeFaces {
    /// Edge length of every face.
    pub side: u32,
    /// Face pixels, each `side * side * 4` bytes.
    pub faces: [Vec<u8>; 6],
}

impl CubeFaces {
    /// Decode one image and use it for every face. Non-square images are
    /// squashed to the shorter side, and faces larger than
    /// [`MAX_FACE_SIZE`] are downscaled.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Image`] if the bytes do not decode or the
    /// image is empty.
    pub fn from_single_image(
        path: &str,
        bytes: &[u8],
    ) -> Result<Self, AssetError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| AssetError::Image {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;

        let side = image.width().min(image.height()).min(MAX_FACE_SIZE);
        if side == 0 {
            return Err(AssetError::Image {
                path: path.to_owned(),
                reason: "empty image".to_owned(),
            });
        }
        let image = if image.width() == side && image.height() == side {
            image
        } else {
            log::debug!(
                "{path}: resizing {}x{} skybox to {side}x{side}",
                image.width(),
                image.height()
            );
            image.resize_exact(side, side, FilterType::Triangle)
        };

        let face = image.to_rgba8().into_raw();
        Ok(Self {
            side,
            faces: std::array::from_fn(|_| face.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn square_image_fills_all_faces() {
        let cube = CubeFaces::from_single_image("sky.png", &png(4, 4)).unwrap();
        assert_eq!(cube.side, 4);
        for face in &cube.faces {
            assert_eq!(face.len(), 4 * 4 * 4);
            assert_eq!(&face[..4], &[10, 20, 30, 255]);
        }
    }

    #[test]
    fn non_square_image_becomes_square() {
        let cube = CubeFaces::from_single_image("sky.png", &png(8, 4)).unwrap();
        assert_eq!(cube.side, 4);
        assert!(cube.faces.iter().all(|f| f.len() == 64));
    }

    #[test]
    fn undecodable_bytes_report_path() {
        let err = CubeFaces::from_single_image("sky.webp", b"nope").unwrap_err();
        assert!(matches!(err, AssetError::Image { ref path, .. } if path == "sky.webp"));
    }
}
