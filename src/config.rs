use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a coordinate that lands on or past the far side of the image is pulled back in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeClamp {
    /// Anything `>= dim` becomes `dim - 1`, on both edges of a slice. Boundary
    /// slices therefore lose their last row/column of pixels.
    #[default]
    Legacy,
    /// Far edges clamp to `dim` (exclusive), so boundary slices reach the image edge.
    Exact,
}

/// Slicing parameters, fixed for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    pub slice_width: u32,
    pub slice_height: u32,
    pub overlap_width: u32,
    pub overlap_height: u32,
    pub left_to_right: bool,
    pub top_to_bottom: bool,
    /// Rows outer, columns inner. Columns outer when false.
    pub row_major: bool,
    pub destination_root: PathBuf,
    pub per_image_subdir: bool,
    pub edge_clamp: EdgeClamp,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            slice_width: 256,
            slice_height: 256,
            overlap_width: 16,
            overlap_height: 16,
            left_to_right: true,
            top_to_bottom: true,
            row_major: true,
            destination_root: PathBuf::from("."),
            per_image_subdir: false,
            edge_clamp: EdgeClamp::Legacy,
        }
    }
}

impl SliceConfig {
    pub fn from_json_str(json_text: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_text)?)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn stride_h(&self) -> i64 {
        i64::from(self.slice_width) - i64::from(self.overlap_width)
    }

    pub fn stride_v(&self) -> i64 {
        i64::from(self.slice_height) - i64::from(self.overlap_height)
    }

    /// Checks `slice > overlap >= 0` on both axes. Overlap is unsigned, so only
    /// the stride needs checking.
    pub fn validate(&self) -> Result<()> {
        if self.stride_h() <= 0 {
            return Err(Error::InvalidConfig(format!(
                "slice width {} must exceed overlap width {}",
                self.slice_width, self.overlap_width
            )));
        }
        if self.stride_v() <= 0 {
            return Err(Error::InvalidConfig(format!(
                "slice height {} must exceed overlap height {}",
                self.slice_height, self.overlap_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_tile_cutter() {
        let c = SliceConfig::default();
        assert_eq!((c.slice_width, c.slice_height), (256, 256));
        assert_eq!((c.overlap_width, c.overlap_height), (16, 16));
        assert!(c.left_to_right && c.top_to_bottom && c.row_major);
        assert!(!c.per_image_subdir);
        assert_eq!(c.destination_root, PathBuf::from("."));
        assert_eq!(c.edge_clamp, EdgeClamp::Legacy);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let c = SliceConfig::from_json_str(
            r#"
            {
                "slice_width": 64,
                "overlap_width": 0,
                "left_to_right": false,
                "destination_root": "out/tiles",
                "edge_clamp": "exact"
            }
            "#,
        )
        .unwrap();

        assert_eq!(c.slice_width, 64);
        assert_eq!(c.slice_height, 256);
        assert_eq!(c.overlap_width, 0);
        assert_eq!(c.overlap_height, 16);
        assert!(!c.left_to_right);
        assert!(c.top_to_bottom);
        assert_eq!(c.destination_root, PathBuf::from("out/tiles"));
        assert_eq!(c.edge_clamp, EdgeClamp::Exact);
    }

    #[test]
    fn bad_json_is_parse_error() {
        let err = SliceConfig::from_json_str(r#"{ "slice_width": -3 }"#).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn missing_config_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SliceConfig::load_json(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn load_json_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "row_major": false, "per_image_subdir": true }"#).unwrap();

        let c = SliceConfig::load_json(&path).unwrap();
        assert!(!c.row_major);
        assert!(c.per_image_subdir);
    }

    #[test]
    fn validate_rejects_non_positive_stride() {
        let mut c = SliceConfig {
            slice_width: 16,
            overlap_width: 16,
            ..SliceConfig::default()
        };
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));

        c.slice_width = 32;
        c.slice_height = 8;
        c.overlap_height = 9;
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));

        c.overlap_height = 7;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_slice_size_is_invalid() {
        let c = SliceConfig {
            slice_width: 0,
            overlap_width: 0,
            ..SliceConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
