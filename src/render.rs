//! Frame composition: per-frame painting on a CPU surface and the caption overlay.

pub(crate) mod compositor;
pub(crate) mod frame;
pub(crate) mod overlay;
