//! Serializable snapshots of frame-set structure.
//!
//! These types are the contract an external persistence layer consumes:
//! the node list, the edge list and the base/current indices, without
//! the engine itself being the serializer.

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Snapshot of one frame node.
pub struct FrameNodeInfo {
    /// 1-based frame index.
    pub index: usize,
    /// Frame identity metadata.
    pub ident: String,
    /// Frame axis count.
    pub n_axes: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Snapshot of one edge between frames.
pub struct FrameEdgeInfo {
    /// 1-based index of the frame the edge mapping transforms from.
    pub from: usize,
    /// 1-based index of the frame the edge mapping transforms to.
    pub to: usize,
    /// Class name of the edge mapping.
    pub class: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Snapshot of a whole frame set.
pub struct FrameSetStructure {
    /// Frames in index order.
    pub frames: Vec<FrameNodeInfo>,
    /// Edges in insertion order of their target frames.
    pub edges: Vec<FrameEdgeInfo>,
    /// 1-based base frame index.
    pub base: usize,
    /// 1-based current frame index.
    pub current: usize,
}

#[cfg(test)]
#[path = "../../tests/unit/frameset/structure.rs"]
mod tests;
