use crate::config::{EdgeClamp, SliceConfig};
use crate::error::{Error, Result};
use crate::im::ROI;

/// One planned slice: its clamped source region and its emission index.
///
/// `index` is the only slice numbering there is; output files are named after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceRect {
    pub index: usize,
    pub roi: ROI,
}

impl SliceRect {
    /// `(x0, y0, x1, y1)` with exclusive far edges.
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        (self.roi.l, self.roi.t, self.roi.r, self.roi.b)
    }
}

/// A planned grid. Rectangles are computed on demand from the two axes, so a
/// plan costs the same whatever the slice count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPlan {
    pub columns: usize,
    pub rows: usize,
    h_axis: Axis,
    v_axis: Axis,
    row_major: bool,
    clamp: EdgeClamp,
}

impl GridPlan {
    pub fn len(&self) -> usize {
        self.columns * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The rect emitted at position `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<SliceRect> {
        if index >= self.len() {
            return None;
        }
        let (col, row) = if self.row_major {
            (index % self.columns, index / self.columns)
        } else {
            (index / self.rows, index % self.rows)
        };
        let (l, r) = self.h_axis.span(col, self.clamp);
        let (t, b) = self.v_axis.span(row, self.clamp);
        Some(SliceRect {
            index,
            roi: ROI { l, t, r, b },
        })
    }

    /// Rects in emission order; the `i`th item has `index == i`.
    pub fn iter(&self) -> SliceRects<'_> {
        SliceRects {
            plan: self,
            next: 0,
        }
    }
}

impl<'a> IntoIterator for &'a GridPlan {
    type Item = SliceRect;
    type IntoIter = SliceRects<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct SliceRects<'a> {
    plan: &'a GridPlan,
    next: usize,
}

impl Iterator for SliceRects<'_> {
    type Item = SliceRect;

    fn next(&mut self) -> Option<SliceRect> {
        let rect = self.plan.get(self.next)?;
        self.next += 1;
        Some(rect)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.plan.len().saturating_sub(self.next);
        (left, Some(left))
    }

    fn nth(&mut self, n: usize) -> Option<SliceRect> {
        self.next = self.next.saturating_add(n);
        self.next()
    }
}

impl ExactSizeIterator for SliceRects<'_> {}

/// Slice origins along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Axis {
    dim: i64,
    size: i64,
    stride: i64,
    start: i64,
    step: i64,
    count: usize,
}

impl Axis {
    fn new(name: &str, dim: u32, size: u32, overlap: u32, forward: bool) -> Result<Self> {
        let dim = i64::from(dim);
        let size = i64::from(size);
        let overlap = i64::from(overlap);

        let stride = size - overlap;
        if stride <= 0 {
            return Err(Error::InvalidConfig(format!(
                "{name} stride {size} - {overlap} is not positive"
            )));
        }

        // Number of origins needed to cover the image once the overlap is taken off the span.
        let span = dim - overlap;
        if span <= 0 {
            return Err(Error::InvalidConfig(format!(
                "image {name} {dim} leaves no slices past a {overlap} pixel overlap"
            )));
        }
        let count = ((span + stride - 1) / stride) as usize;

        let (start, step) = if forward { (0, 1) } else { (dim - size, -1) };

        Ok(Self {
            dim,
            size,
            stride,
            start,
            step,
            count,
        })
    }

    /// Clamped `[lo, hi)` of the `i`th slice along this axis.
    fn span(&self, i: usize, clamp: EdgeClamp) -> (usize, usize) {
        let lo = self.start + i as i64 * self.step * self.stride;
        let hi = lo + self.size;
        (
            clamp_coord(lo, self.dim, clamp, false),
            clamp_coord(hi, self.dim, clamp, true),
        )
    }
}

/// `dim` is at least 1 here, since the axis has a positive span.
fn clamp_coord(v: i64, dim: i64, clamp: EdgeClamp, far_edge: bool) -> usize {
    let v = if v < 0 {
        0
    } else if v >= dim {
        match (clamp, far_edge) {
            (EdgeClamp::Exact, true) => dim,
            _ => dim - 1,
        }
    } else {
        v
    };
    v as usize
}

/// Lay a grid of `slice_width x slice_height` slices over an image.
///
/// Origins step by `slice - overlap` from the left/top edge, or from
/// `dim - slice` backwards when the direction is reversed. Rectangles are
/// clamped to the image, never padded, and numbered in emission order.
pub fn plan(image_w: u32, image_h: u32, config: &SliceConfig) -> Result<GridPlan> {
    let cols = Axis::new(
        "width",
        image_w,
        config.slice_width,
        config.overlap_width,
        config.left_to_right,
    )?;
    let rows = Axis::new(
        "height",
        image_h,
        config.slice_height,
        config.overlap_height,
        config.top_to_bottom,
    )?;

    Ok(GridPlan {
        columns: cols.count,
        rows: rows.count,
        h_axis: cols,
        v_axis: rows,
        row_major: config.row_major,
        clamp: config.edge_clamp,
    })
}
