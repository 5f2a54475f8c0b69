/// Draw-order key for sprites and batches.
///
/// Lower values are painted first; higher values appear on top.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ZIndex(pub i32);

impl ZIndex {
    #[inline]
    pub const fn new(v: i32) -> Self {
        Self(v)
    }

    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for ZIndex {
    #[inline]
    fn from(v: i32) -> Self {
        Self(v)
    }
}
