use crate::grid::SliceRect;
use crate::im::RGBAIm;
use std::path::{Path, PathBuf};

/// Normalize an indented multi-line grid literal: trim each row, drop blank rows.
pub fn trim_ascii(grid: &str) -> String {
    let mut out = String::new();
    for row in grid.lines().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        out.push_str(row);
        out.push('\n');
    }
    out
}

/// One char per pixel: how many rects cover it (`0`-`9`, `*` beyond).
pub fn coverage_to_ascii(w: usize, h: usize, rects: &[SliceRect]) -> String {
    let mut out = String::new();
    for y in 0..h {
        for x in 0..w {
            let n = rects.iter().filter(|r| r.roi.contains(x, y)).count();
            out.push(match n {
                0..=9 => (b'0' + n as u8) as char,
                _ => '*',
            });
        }
        out.push('\n');
    }
    out
}

/// The pixel a coordinate-stamped image carries at `(x, y)`.
pub fn coord_px(x: usize, y: usize) -> [u8; 4] {
    [(x % 251) as u8, (y % 251) as u8, ((x + y) % 7) as u8 * 30, 255]
}

/// Write a `w x h` PNG whose pixels encode their own position (see `coord_px`).
pub fn write_coord_png(dir: &Path, name: &str, w: usize, h: usize) -> PathBuf {
    let mut im = RGBAIm::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let px = coord_px(x, y);
            for (ch, v) in px.into_iter().enumerate() {
                unsafe {
                    *im.get_unchecked_mut(x, y, ch) = v;
                }
            }
        }
    }
    let path = dir.join(name);
    im.save_png(&path).unwrap();
    path
}

/// Check that `slice` holds exactly the pixels of a coordinate-stamped source
/// starting at `(l, t)`.
pub fn assert_slice_from(slice: &RGBAIm, l: usize, t: usize) {
    for y in 0..slice.h {
        for x in 0..slice.w {
            let got: [u8; 4] = std::array::from_fn(|ch| unsafe { *slice.get_unchecked(x, y, ch) });
            assert_eq!(got, coord_px(l + x, t + y), "pixel ({x}, {y}) of slice at ({l}, {t})");
        }
    }
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
