//! Layer operations of the fluent mutation surface.
//!
//! Every operation returns a new [`Layout`]; the receiver is never
//! modified, and a failed operation leaves nothing half-applied.

use crate::layout::Layout;
use zmk_layout_models::{is_c_identifier, LayoutBinding, LayoutDocument, LayoutError};

/// Whole-layer operations (`layout.layers()`).
pub struct LayerOps<'a> {
    layout: &'a Layout,
}

impl<'a> LayerOps<'a> {
    pub(crate) fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    fn doc(&self) -> &LayoutDocument {
        self.layout.document()
    }

    /// Current layer names in order.
    pub fn names(&self) -> &[String] {
        &self.doc().layer_names
    }

    /// Number of layers.
    pub fn count(&self) -> usize {
        self.doc().layer_names.len()
    }

    /// Whether a layer exists.
    pub fn contains(&self, name: &str) -> bool {
        self.doc().layer_index(name).is_some()
    }

    fn require(&self, name: &str) -> Result<usize, LayoutError> {
        self.doc()
            .layer_index(name)
            .ok_or_else(|| LayoutError::LayerNotFound {
                name: name.to_string(),
            })
    }

    fn require_absent(&self, name: &str) -> Result<(), LayoutError> {
        if self.contains(name) {
            return Err(LayoutError::LayerAlreadyExists {
                name: name.to_string(),
            });
        }
        if !is_c_identifier(name) {
            return Err(LayoutError::InvalidIdentifier {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Append a new empty layer.
    pub fn add(&self, name: &str) -> Result<Layout, LayoutError> {
        self.add_at(name, self.count())
    }

    /// Insert a new empty layer at a position.
    pub fn add_at(&self, name: &str, position: usize) -> Result<Layout, LayoutError> {
        self.require_absent(name)?;
        let mut doc = self.doc().clone();
        if position > doc.layer_names.len() {
            return Err(LayoutError::IndexOutOfRange {
                index: position,
                len: doc.layer_names.len(),
            });
        }
        doc.layer_names.insert(position, name.to_string());
        doc.layers.insert(position, Vec::new());
        Ok(Layout::new(doc))
    }

    /// Drop a layer and its name.
    pub fn remove(&self, name: &str) -> Result<Layout, LayoutError> {
        let index = self.require(name)?;
        let mut doc = self.doc().clone();
        doc.layer_names.remove(index);
        doc.layers.remove(index);
        Ok(Layout::new(doc))
    }

    /// Reposition a layer.
    pub fn move_to(&self, name: &str, position: usize) -> Result<Layout, LayoutError> {
        let index = self.require(name)?;
        if position >= self.count() {
            return Err(LayoutError::IndexOutOfRange {
                index: position,
                len: self.count(),
            });
        }
        let mut doc = self.doc().clone();
        let layer_name = doc.layer_names.remove(index);
        let layer = doc.layers.remove(index);
        doc.layer_names.insert(position, layer_name);
        doc.layers.insert(position, layer);
        Ok(Layout::new(doc))
    }

    /// Rename a layer. References by index are unaffected.
    pub fn rename(&self, old: &str, new: &str) -> Result<Layout, LayoutError> {
        let index = self.require(old)?;
        self.require_absent(new)?;
        let mut doc = self.doc().clone();
        doc.layer_names[index] = new.to_string();
        Ok(Layout::new(doc))
    }

    /// Deep-copy a layer's bindings under a new name, appended at the end.
    pub fn copy(&self, source: &str, target: &str) -> Result<Layout, LayoutError> {
        let index = self.require(source)?;
        self.require_absent(target)?;
        let mut doc = self.doc().clone();
        let bindings = doc.layers[index].clone();
        doc.layer_names.push(target.to_string());
        doc.layers.push(bindings);
        Ok(Layout::new(doc))
    }

    /// Empty a layer's bindings.
    pub fn clear(&self, name: &str) -> Result<Layout, LayoutError> {
        let index = self.require(name)?;
        let mut doc = self.doc().clone();
        doc.layers[index].clear();
        Ok(Layout::new(doc))
    }

    /// Apply a permutation of the current layer names.
    pub fn reorder(&self, order: &[&str]) -> Result<Layout, LayoutError> {
        let doc = self.doc();
        if order.len() != doc.layer_names.len() {
            return Err(LayoutError::ReorderMismatch);
        }
        let mut indices = Vec::with_capacity(order.len());
        for name in order {
            match doc.layer_index(name) {
                Some(index) if !indices.contains(&index) => indices.push(index),
                _ => return Err(LayoutError::ReorderMismatch),
            }
        }
        let mut new_doc = doc.clone();
        new_doc.layer_names = indices
            .iter()
            .map(|&i| doc.layer_names[i].clone())
            .collect();
        new_doc.layers = indices.iter().map(|&i| doc.layers[i].clone()).collect();
        Ok(Layout::new(new_doc))
    }
}

/// Per-layer binding editor (`layout.layer(name)`).
///
/// The editor owns a working copy of the document; nothing is observable
/// until [`LayerEditor::finish`] returns the new layout.
#[derive(Debug)]
pub struct LayerEditor {
    document: LayoutDocument,
    index: usize,
}

impl LayerEditor {
    pub(crate) fn new(document: LayoutDocument, index: usize) -> Self {
        Self { document, index }
    }

    fn bindings(&self) -> &Vec<LayoutBinding> {
        &self.document.layers[self.index]
    }

    fn bindings_mut(&mut self) -> &mut Vec<LayoutBinding> {
        &mut self.document.layers[self.index]
    }

    /// Number of bindings in the layer.
    pub fn len(&self) -> usize {
        self.bindings().len()
    }

    /// Whether the layer has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings().is_empty()
    }

    /// The binding at a position.
    pub fn get(&self, index: usize) -> Result<&LayoutBinding, LayoutError> {
        self.bindings()
            .get(index)
            .ok_or(LayoutError::IndexOutOfRange {
                index,
                len: self.document.layers[self.index].len(),
            })
    }

    /// Set the binding at a position, padding intermediate positions with
    /// `&trans` when the position is past the end.
    pub fn set(mut self, index: usize, binding: LayoutBinding) -> Self {
        let bindings = self.bindings_mut();
        while bindings.len() <= index {
            bindings.push(LayoutBinding::transparent());
        }
        bindings[index] = binding;
        self
    }

    /// Replace the range `[start, end)`; the replacement length must
    /// equal `end - start`.
    pub fn set_range(
        mut self,
        start: usize,
        end: usize,
        replacements: Vec<LayoutBinding>,
    ) -> Result<Self, LayoutError> {
        let len = self.len();
        if start > end || end > len {
            return Err(LayoutError::IndexOutOfRange { index: end, len });
        }
        if replacements.len() != end - start {
            return Err(LayoutError::Invalid {
                message: format!(
                    "set_range expects {} bindings for [{start}, {end}), got {}",
                    end - start,
                    replacements.len()
                ),
            });
        }
        self.bindings_mut().splice(start..end, replacements);
        Ok(self)
    }

    /// Append a binding.
    pub fn append(mut self, binding: LayoutBinding) -> Self {
        self.bindings_mut().push(binding);
        self
    }

    /// Insert a binding at a position.
    pub fn insert(mut self, index: usize, binding: LayoutBinding) -> Result<Self, LayoutError> {
        let len = self.len();
        if index > len {
            return Err(LayoutError::IndexOutOfRange { index, len });
        }
        self.bindings_mut().insert(index, binding);
        Ok(self)
    }

    /// Remove the binding at a position.
    pub fn remove(mut self, index: usize) -> Result<Self, LayoutError> {
        let len = self.len();
        if index >= len {
            return Err(LayoutError::IndexOutOfRange { index, len });
        }
        self.bindings_mut().remove(index);
        Ok(self)
    }

    /// Remove every binding.
    pub fn clear(mut self) -> Self {
        self.bindings_mut().clear();
        self
    }

    /// Replace the layer with `size` copies of a binding.
    pub fn fill(mut self, binding: LayoutBinding, size: usize) -> Self {
        *self.bindings_mut() = vec![binding; size];
        self
    }

    /// Extend the layer to `size` positions with `&trans`.
    pub fn pad_to(self, size: usize) -> Self {
        self.pad_to_with(size, LayoutBinding::transparent())
    }

    /// Extend the layer to `size` positions with a given binding.
    pub fn pad_to_with(mut self, size: usize, binding: LayoutBinding) -> Self {
        let bindings = self.bindings_mut();
        while bindings.len() < size {
            bindings.push(binding.clone());
        }
        self
    }

    /// Replace this layer's bindings with a copy of another layer's.
    pub fn copy_from(mut self, source: &str) -> Result<Self, LayoutError> {
        let source_index =
            self.document
                .layer_index(source)
                .ok_or_else(|| LayoutError::LayerNotFound {
                    name: source.to_string(),
                })?;
        self.document.layers[self.index] = self.document.layers[source_index].clone();
        Ok(self)
    }

    /// Produce the new layout with this layer's edits applied.
    pub fn finish(self) -> Layout {
        Layout::new(self.document)
    }
}
