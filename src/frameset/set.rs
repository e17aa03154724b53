use std::sync::Arc;

use crate::foundation::coords::CoordBatch;
use crate::foundation::error::{CoordError, CoordResult};
use crate::frame::frame::Frame;
use crate::frameset::structure::{FrameEdgeInfo, FrameNodeInfo, FrameSetStructure};
use crate::mapping::map::{MapRef, MappingExt, map_ref};
use crate::mapping::perm::{PermMap, validate_axis_perm};
use crate::mapping::unit::UnitMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Addresses a frame inside a [`FrameSet`].
pub enum FrameId {
    /// The distinguished base frame.
    Base,
    /// The distinguished current frame.
    Current,
    /// An explicit 1-based frame index.
    Nth(usize),
}

#[derive(Debug)]
struct Link {
    parent: usize,
    /// Transforms parent-frame coordinates to this frame's coordinates.
    map: MapRef,
}

#[derive(Debug)]
struct FrameNode {
    frame: Frame,
    link: Option<Link>,
}

#[derive(Debug)]
/// A connected graph of frames joined by mappings.
///
/// Every frame after the first attaches to an existing frame through
/// exactly one edge, so the graph is a tree: connected, acyclic, with a
/// unique path between any two frames. The mapping between two frames
/// is synthesized by composing edge mappings along that path, inverting
/// the edges traversed against their stored direction.
///
/// Frames and mappings are copied on insertion and on retrieval, so
/// external handles stay independent of the set.
pub struct FrameSet {
    nodes: Vec<FrameNode>,
    base: usize,
    current: usize,
}

impl FrameSet {
    /// Create a set holding a copy of one frame, which becomes both base
    /// and current.
    pub fn new(frame: &Frame) -> Self {
        Self {
            nodes: vec![FrameNode {
                frame: frame.clone(),
                link: None,
            }],
            base: 0,
            current: 0,
        }
    }

    /// Create a two-frame set: `base` connected to `current` by
    /// `mapping`. All three arguments are copied.
    pub fn connected(base: &Frame, mapping: &MapRef, current: &Frame) -> CoordResult<Self> {
        let mut set = Self::new(base);
        set.add_frame(FrameId::Base, mapping, current)?;
        Ok(set)
    }

    /// Number of frames in the set.
    pub fn n_frames(&self) -> usize {
        self.nodes.len()
    }

    /// 1-based index of the base frame.
    pub fn base(&self) -> usize {
        self.base + 1
    }

    /// 1-based index of the current frame.
    pub fn current(&self) -> usize {
        self.current + 1
    }

    /// Make the addressed frame the base frame.
    pub fn set_base(&mut self, id: FrameId) -> CoordResult<()> {
        self.base = self.resolve(id)?;
        Ok(())
    }

    /// Make the addressed frame the current frame.
    pub fn set_current(&mut self, id: FrameId) -> CoordResult<()> {
        self.current = self.resolve(id)?;
        Ok(())
    }

    fn resolve(&self, id: FrameId) -> CoordResult<usize> {
        match id {
            FrameId::Base => Ok(self.base),
            FrameId::Current => Ok(self.current),
            FrameId::Nth(i) => {
                if i == 0 || i > self.nodes.len() {
                    return Err(CoordError::invalid_index(format!(
                        "frame {i} outside 1..={}",
                        self.nodes.len()
                    )));
                }
                Ok(i - 1)
            }
        }
    }

    /// Attach a copy of `frame` to an existing frame through a copy of
    /// `mapping`, which must transform the existing frame's coordinates
    /// to the new frame's. The new frame becomes current.
    #[tracing::instrument(skip(self, mapping, frame))]
    pub fn add_frame(
        &mut self,
        attach: FrameId,
        mapping: &MapRef,
        frame: &Frame,
    ) -> CoordResult<()> {
        let idx = self.resolve(attach)?;
        let attach_axes = self.nodes[idx].frame.n_axes();
        if mapping.n_in() != attach_axes {
            return Err(CoordError::dimension_mismatch(format!(
                "mapping takes {} axes but frame {} has {attach_axes}",
                mapping.n_in(),
                idx + 1
            )));
        }
        if mapping.n_out() != frame.n_axes() {
            return Err(CoordError::dimension_mismatch(format!(
                "mapping yields {} axes but the new frame has {}",
                mapping.n_out(),
                frame.n_axes()
            )));
        }
        self.nodes.push(FrameNode {
            frame: frame.clone(),
            link: Some(Link {
                parent: idx,
                map: mapping.deep_copy(),
            }),
        });
        self.current = self.nodes.len() - 1;
        Ok(())
    }

    /// Return a copy of the addressed frame.
    pub fn get_frame(&self, id: FrameId) -> CoordResult<Frame> {
        let idx = self.resolve(id)?;
        Ok(self.nodes[idx].frame.clone())
    }

    /// Synthesize the mapping that transforms coordinates of `from` into
    /// coordinates of `to` along the unique connecting path.
    ///
    /// Edges traversed against their stored direction contribute their
    /// inverse; if such an edge has no inverse the routing fails with
    /// [`CoordError::InverseUndefined`]. The result is a fresh mapping,
    /// simplifiable like any other.
    #[tracing::instrument(skip(self))]
    pub fn get_mapping(&self, from: FrameId, to: FrameId) -> CoordResult<MapRef> {
        let a = self.resolve(from)?;
        let b = self.resolve(to)?;
        if a == b {
            return Ok(map_ref(UnitMap::new(self.nodes[a].frame.n_axes())?));
        }

        let path_a = self.path_to_root(a);
        let path_b = self.path_to_root(b);
        let mut ia = path_a.len();
        let mut ib = path_b.len();
        while ia > 0 && ib > 0 && path_a[ia - 1] == path_b[ib - 1] {
            ia -= 1;
            ib -= 1;
        }

        let mut chain: Vec<MapRef> = Vec::with_capacity(ia + ib);
        // Climb from `a` to the meeting node, inverting each edge.
        for &x in &path_a[..ia] {
            let Some(link) = &self.nodes[x].link else {
                return Err(CoordError::invalid_index("frame tree is inconsistent"));
            };
            if !link.map.inverse_defined() {
                return Err(CoordError::inverse_undefined(format!(
                    "edge into frame {} cannot be traversed backwards",
                    x + 1
                )));
            }
            chain.push(link.map.inverted());
        }
        // Descend from the meeting node to `b`.
        for &x in path_b[..ib].iter().rev() {
            let Some(link) = &self.nodes[x].link else {
                return Err(CoordError::invalid_index("frame tree is inconsistent"));
            };
            chain.push(Arc::clone(&link.map));
        }

        let mut iter = chain.into_iter();
        let Some(mut acc) = iter.next() else {
            return Err(CoordError::invalid_index("frame tree is inconsistent"));
        };
        for map in iter {
            acc = acc.then(&map)?;
        }
        Ok(acc)
    }

    /// Replace the edge between the addressed frame and its
    /// parent-of-insertion with a copy of `mapping`.
    #[tracing::instrument(skip(self, mapping))]
    pub fn remap_frame(&mut self, id: FrameId, mapping: &MapRef) -> CoordResult<()> {
        let idx = self.resolve(id)?;
        let Some(link) = &self.nodes[idx].link else {
            return Err(CoordError::invalid_index(
                "the first frame has no connecting edge to replace",
            ));
        };
        let parent_axes = self.nodes[link.parent].frame.n_axes();
        let own_axes = self.nodes[idx].frame.n_axes();
        if mapping.n_in() != parent_axes || mapping.n_out() != own_axes {
            return Err(CoordError::dimension_mismatch(format!(
                "edge mapping must take {parent_axes} axes to {own_axes}, got {} to {}",
                mapping.n_in(),
                mapping.n_out()
            )));
        }
        let copied = mapping.deep_copy();
        if let Some(link) = &mut self.nodes[idx].link {
            link.map = copied;
        }
        Ok(())
    }

    /// Remove the addressed frame, re-routing edges through it so the
    /// remaining frames stay connected. The base and current frames
    /// cannot be removed. Remaining frames renumber downwards.
    #[tracing::instrument(skip(self))]
    pub fn remove_frame(&mut self, id: FrameId) -> CoordResult<()> {
        let idx = self.resolve(id)?;
        if idx == self.base {
            return Err(CoordError::invalid_index("cannot remove the base frame"));
        }
        if idx == self.current {
            return Err(CoordError::invalid_index("cannot remove the current frame"));
        }

        let mut children: Vec<(usize, MapRef)> = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(link) = &node.link
                && link.parent == idx
            {
                children.push((i, Arc::clone(&link.map)));
            }
        }

        // Compute every rewired edge before touching the structure so a
        // failure leaves the set unchanged.
        let mut new_links: Vec<(usize, Option<Link>)> = Vec::new();
        match &self.nodes[idx].link {
            Some(link) => {
                for (child, child_map) in &children {
                    let map = link.map.then(child_map)?;
                    new_links.push((
                        *child,
                        Some(Link {
                            parent: link.parent,
                            map,
                        }),
                    ));
                }
            }
            None => {
                // Removing the root: promote its first child, re-attach
                // the rest through the promoted child.
                let Some((promoted, promoted_map)) = children.first().cloned() else {
                    return Err(CoordError::invalid_index("frame tree is inconsistent"));
                };
                if !promoted_map.inverse_defined() {
                    return Err(CoordError::inverse_undefined(format!(
                        "edge into frame {} cannot be reversed to re-root the set",
                        promoted + 1
                    )));
                }
                let back = promoted_map.inverted();
                new_links.push((promoted, None));
                for (child, child_map) in &children[1..] {
                    let map = back.then(child_map)?;
                    new_links.push((
                        *child,
                        Some(Link {
                            parent: promoted,
                            map,
                        }),
                    ));
                }
            }
        }

        for (child, link) in new_links {
            self.nodes[child].link = link;
        }
        self.nodes.remove(idx);
        for node in &mut self.nodes {
            if let Some(link) = &mut node.link
                && link.parent > idx
            {
                link.parent -= 1;
            }
        }
        if self.base > idx {
            self.base -= 1;
        }
        if self.current > idx {
            self.current -= 1;
        }
        Ok(())
    }

    /// Permute the axes of the current frame in place.
    ///
    /// See [`FrameSet::perm_axes_at`].
    pub fn perm_axes(&mut self, perm: &[usize]) -> CoordResult<()> {
        self.perm_axes_at(FrameId::Current, perm)
    }

    /// Permute the axes of the addressed frame in place.
    ///
    /// Every edge touching the frame is rewritten by composing a
    /// permutation mapping on the frame's side, so mappings synthesized
    /// between any two frames stay numerically consistent with the new
    /// axis order. The permutation is driven by the frame's axis count,
    /// so edges with unequal input/output axis counts are handled.
    #[tracing::instrument(skip(self))]
    pub fn perm_axes_at(&mut self, id: FrameId, perm: &[usize]) -> CoordResult<()> {
        let idx = self.resolve(id)?;
        let n_axes = self.nodes[idx].frame.n_axes();
        validate_axis_perm(n_axes, perm)?;
        let perm_map = map_ref(PermMap::axis_swap(perm)?);
        let perm_back = perm_map.inverted();

        // Rewrite edges before mutating so dimension errors leave the
        // set unchanged.
        let mut new_maps: Vec<(usize, MapRef)> = Vec::new();
        if let Some(link) = &self.nodes[idx].link {
            new_maps.push((idx, link.map.then(&perm_map)?));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(link) = &node.link
                && link.parent == idx
            {
                new_maps.push((i, perm_back.then(&link.map)?));
            }
        }

        for (i, map) in new_maps {
            if let Some(link) = &mut self.nodes[i].link {
                link.map = map;
            }
        }
        self.nodes[idx].frame.permute_axes(perm)
    }

    /// Apply the base-to-current mapping to a batch.
    #[tracing::instrument(skip(self, batch))]
    pub fn apply_forward(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        self.get_mapping(FrameId::Base, FrameId::Current)?
            .apply_forward(batch)
    }

    /// Apply the inverse of the base-to-current mapping to a batch.
    #[tracing::instrument(skip(self, batch))]
    pub fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        self.get_mapping(FrameId::Base, FrameId::Current)?
            .apply_inverse(batch)
    }

    /// Serializable snapshot of the node list, edge list and the
    /// base/current indices.
    pub fn structure(&self) -> FrameSetStructure {
        FrameSetStructure {
            frames: self
                .nodes
                .iter()
                .enumerate()
                .map(|(i, node)| FrameNodeInfo {
                    index: i + 1,
                    ident: node.frame.ident().to_string(),
                    n_axes: node.frame.n_axes(),
                })
                .collect(),
            edges: self
                .nodes
                .iter()
                .enumerate()
                .filter_map(|(i, node)| {
                    node.link.as_ref().map(|link| FrameEdgeInfo {
                        from: link.parent + 1,
                        to: i + 1,
                        class: link.map.class_name().to_string(),
                    })
                })
                .collect(),
            base: self.base + 1,
            current: self.current + 1,
        }
    }

    /// Independent clone of the whole set, including edge mappings.
    pub fn deep_copy(&self) -> Self {
        Self {
            nodes: self
                .nodes
                .iter()
                .map(|node| FrameNode {
                    frame: node.frame.clone(),
                    link: node.link.as_ref().map(|link| Link {
                        parent: link.parent,
                        map: link.map.deep_copy(),
                    }),
                })
                .collect(),
            base: self.base,
            current: self.current,
        }
    }

    fn path_to_root(&self, start: usize) -> Vec<usize> {
        let mut path = vec![start];
        let mut at = start;
        while let Some(link) = &self.nodes[at].link {
            at = link.parent;
            path.push(at);
        }
        path
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frameset/set.rs"]
mod tests;
