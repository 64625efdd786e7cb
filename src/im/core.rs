use super::roi::ROI;

#[derive(Debug, Clone)]
pub struct Im<T, const N_CH: usize> {
    pub w: usize,
    pub h: usize,
    pub s: usize, // stride in elements (w * N_CH)
    pub arr: Vec<T>,
}

// Constructor
// -----------------------------------------------------------------------------
impl<T: Copy + Default, const N_CH: usize> Im<T, N_CH> {
    pub fn new(w: usize, h: usize) -> Self {
        let s = w * N_CH;
        let arr = vec![T::default(); s * h];
        Self { w, h, s, arr }
    }
}

impl<T, const N_CH: usize> Im<T, N_CH> {
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, x: usize, y: usize, ch: usize) -> &T {
        unsafe { self.arr.get_unchecked(y * self.s + x * N_CH + ch) }
    }

    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, x: usize, y: usize, ch: usize) -> &mut T {
        unsafe { self.arr.get_unchecked_mut(y * self.s + x * N_CH + ch) }
    }

    /// The full extent of this image as an ROI.
    pub fn roi(&self) -> ROI {
        ROI {
            l: 0,
            t: 0,
            r: self.w,
            b: self.h,
        }
    }
}

// Region copy
// -----------------------------------------------------------------------------
impl<T: Copy + Default, const N_CH: usize> Im<T, N_CH> {
    /// Copy the pixels inside `roi` into a new, tightly packed image of exactly
    /// `roi.w() x roi.h()` pixels. The ROI must lie inside this image.
    pub fn crop(&self, roi: &ROI) -> Self {
        assert!(
            roi.l <= roi.r && roi.t <= roi.b,
            "inverted roi {roi:?}"
        );
        assert!(
            roi.r <= self.w && roi.b <= self.h,
            "roi {roi:?} escapes {}x{} image",
            self.w,
            self.h
        );

        let mut out = Self::new(roi.w(), roi.h());
        let row_len = roi.w() * N_CH;
        for y in 0..roi.h() {
            let src_start = (roi.t + y) * self.s + roi.l * N_CH;
            let dst_start = y * out.s;
            out.arr[dst_start..dst_start + row_len]
                .copy_from_slice(&self.arr[src_start..src_start + row_len]);
        }
        out
    }
}

pub type RGBAIm = Im<u8, 4>;
