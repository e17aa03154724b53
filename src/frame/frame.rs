use std::collections::BTreeMap;

use crate::foundation::error::{CoordError, CoordResult};
use crate::mapping::perm::validate_axis_perm;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One axis of a coordinate system.
pub struct Axis {
    /// Human-readable axis label.
    pub label: String,
    /// Unit string, free-form.
    pub unit: String,
}

impl Axis {
    fn numbered(i: usize) -> Self {
        Self {
            label: format!("axis{}", i + 1),
            unit: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// A named coordinate system descriptor.
///
/// A frame carries an axis count, identity metadata and a free-form
/// string attribute store. It is independent of any particular
/// transform; it becomes a graph node only when inserted into a
/// [`crate::FrameSet`], which copies it.
pub struct Frame {
    axes: Vec<Axis>,
    ident: String,
    domain: String,
    attrs: BTreeMap<String, String>,
}

impl Frame {
    /// Create a frame with `n_axes` default-labeled axes.
    pub fn new(n_axes: usize) -> CoordResult<Self> {
        if n_axes == 0 {
            return Err(CoordError::validation("Frame needs at least one axis"));
        }
        Ok(Self {
            axes: (0..n_axes).map(Axis::numbered).collect(),
            ident: String::new(),
            domain: String::new(),
            attrs: BTreeMap::new(),
        })
    }

    /// Create a frame with an identity string.
    pub fn with_ident(n_axes: usize, ident: impl Into<String>) -> CoordResult<Self> {
        let mut frame = Self::new(n_axes)?;
        frame.ident = ident.into();
        Ok(frame)
    }

    /// Number of axes.
    pub fn n_axes(&self) -> usize {
        self.axes.len()
    }

    /// Axis descriptors in order.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Mutable axis descriptors.
    pub fn axes_mut(&mut self) -> &mut [Axis] {
        &mut self.axes
    }

    /// Identity metadata string.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Replace the identity metadata string.
    pub fn set_ident(&mut self, ident: impl Into<String>) {
        self.ident = ident.into();
    }

    /// Domain metadata string.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Replace the domain metadata string.
    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain = domain.into();
    }

    /// Look up a free-form attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Set a free-form attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Whether a free-form attribute is set.
    pub fn has_attr(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    /// Remove a free-form attribute; returns whether it was set.
    pub fn clear_attr(&mut self, key: &str) -> bool {
        self.attrs.remove(key).is_some()
    }

    /// Reorder axes in place.
    ///
    /// `perm` is 1-based: new axis `i` takes the descriptor of old axis
    /// `perm[i]`.
    pub fn permute_axes(&mut self, perm: &[usize]) -> CoordResult<()> {
        validate_axis_perm(self.axes.len(), perm)?;
        self.axes = perm.iter().map(|&p| self.axes[p - 1].clone()).collect();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/frame.rs"]
mod tests;
