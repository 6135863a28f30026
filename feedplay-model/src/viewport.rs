/// One entry of a viewport report from the virtualization engine.
///
/// The engine may report entries without an index (headers, separators);
/// those never count as visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportEntry {
    pub index: Option<usize>,
    pub is_viewable: bool,
}

impl ViewportEntry {
    pub const fn viewable(index: usize) -> Self {
        Self {
            index: Some(index),
            is_viewable: true,
        }
    }

    pub const fn hidden(index: usize) -> Self {
        Self {
            index: Some(index),
            is_viewable: false,
        }
    }

    /// Index of this entry if it should be treated as visible.
    pub fn visible_index(&self) -> Option<usize> {
        if self.is_viewable { self.index } else { None }
    }
}
