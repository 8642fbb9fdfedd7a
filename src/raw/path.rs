use smallvec::SmallVec;

use super::handle::Handle;

/// One step of a root-to-leaf descent: `node` was left through `children[index]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PathFrame {
    pub(crate) node: Handle,
    pub(crate) index: usize,
}

/// Frames from the root down to (excluding) the target leaf. Deeper than sixteen
/// levels spills to the heap.
pub(crate) type Path = SmallVec<[PathFrame; 16]>;
