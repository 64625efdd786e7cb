#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ROI {
    pub l: usize,
    pub t: usize,
    /// Exclusive right bound.
    pub r: usize,
    /// Exclusive bottom bound.
    pub b: usize,
}

impl ROI {
    /// Width of the ROI.
    pub fn w(&self) -> usize {
        self.r.saturating_sub(self.l)
    }

    /// Height of the ROI.
    pub fn h(&self) -> usize {
        self.b.saturating_sub(self.t)
    }

    pub fn is_empty(&self) -> bool {
        self.w() == 0 || self.h() == 0
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.l <= x && x < self.r && self.t <= y && y < self.b
    }
}
