use super::core::{Im, RGBAIm};
use image::ImageResult;
use std::path::Path;

fn dim_mismatch_err() -> image::ImageError {
    image::ImageError::Parameter(image::error::ParameterError::from_kind(
        image::error::ParameterErrorKind::DimensionMismatch,
    ))
}

// Decode
// -----------------------------------------------------------------------------
impl Im<u8, 4> {
    /// Decode any format the `image` crate recognizes (by content, then by
    /// extension) into straight 8-bit RGBA.
    pub fn load<P: AsRef<Path>>(path: P) -> ImageResult<Self> {
        let img = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?
            .into_rgba8();
        Self::from_rgba8(img)
    }

    pub fn from_rgba8(img: image::RgbaImage) -> ImageResult<Self> {
        let w = img.width() as usize;
        let h = img.height() as usize;
        let arr = img.into_raw();

        if arr.len() != w * h * 4 {
            return Err(dim_mismatch_err());
        }

        Ok(Self { w, h, s: w * 4, arr })
    }
}

// PNG encode
// -----------------------------------------------------------------------------
impl RGBAIm {
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let img = image::RgbaImage::from_raw(self.w as u32, self.h as u32, self.arr.clone())
            .ok_or_else(dim_mismatch_err)?;

        img.save_with_format(path, image::ImageFormat::Png)
    }
}

// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("px.png");

        let mut im = RGBAIm::new(2, 1);
        im.arr.copy_from_slice(&[10, 20, 30, 0, 40, 50, 60, 128]);
        im.save_png(&path).unwrap();

        let back = RGBAIm::load(&path).unwrap();
        assert_eq!((back.w, back.h, back.s), (2, 1, 8));
        assert_eq!(back.arr, im.arr);
    }

    #[test]
    fn load_converts_rgb_to_opaque_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]))
            .save(&path)
            .unwrap();

        let im = RGBAIm::load(&path).unwrap();
        assert_eq!((im.w, im.h), (3, 2));
        assert!(im.arr.chunks_exact(4).all(|px| px == [1, 2, 3, 255]));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RGBAIm::load(dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, image::ImageError::IoError(_)));
    }

    #[test]
    fn load_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(RGBAIm::load(&path).is_err());
    }
}
