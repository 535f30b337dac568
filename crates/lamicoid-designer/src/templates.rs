//! Label templates: a canvas and the elements placed on it.
//!
//! All placement goes through [`Canvas::resolve`], so an element's rectangle is
//! always inside the content area with its top-left corner on the grid.

use serde::Serialize;

use crate::canvas::{Canvas, Rect};
use crate::model::{Element, ElementId, ElementKind, VariableTextElement, VariableValues};

/// A reusable label design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LamicoidTemplate {
    pub name: String,
    canvas: Canvas,
    elements: Vec<Element>,
}

impl LamicoidTemplate {
    pub fn new(name: impl Into<String>, canvas: Canvas) -> Self {
        Self {
            name: name.into(),
            canvas,
            elements: Vec::new(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Replaces the canvas and re-resolves every element against it.
    pub fn set_canvas(
        &mut self,
        width_mm: f64,
        height_mm: f64,
        corner_radius_mm: f64,
        margin_mm: f64,
        grid_spacing_mm: f64,
    ) -> &Canvas {
        self.canvas = Canvas::new(
            width_mm,
            height_mm,
            corner_radius_mm,
            margin_mm,
            grid_spacing_mm,
        );

        let canvas = self.canvas;
        let mut moved = 0usize;
        for element in &mut self.elements {
            let resolved = canvas.resolve(element.rect());
            if resolved != element.rect() {
                moved += 1;
            }
            element.set_rect(resolved);
        }
        tracing::debug!(
            "Canvas set to {}x{}mm, {} of {} elements re-clamped",
            canvas.width_mm(),
            canvas.height_mm(),
            moved,
            self.elements.len()
        );
        &self.canvas
    }

    /// Adds an element at the requested rectangle and returns its identifier.
    /// The stored rectangle is the resolved one.
    pub fn add_element(&mut self, kind: ElementKind, requested: Rect) -> ElementId {
        let rect = self.canvas.resolve(requested);
        let element = Element::new(kind, rect, 0);
        let id = element.id();
        tracing::debug!("Added {} element {} at {:?}", element.kind.name(), id, rect);
        self.elements.push(element);
        id
    }

    /// Moves an element's top-left corner, keeping its size.
    ///
    /// Returns the accepted rectangle, or `None` if no such element exists.
    pub fn place_element(&mut self, id: ElementId, x_mm: f64, y_mm: f64) -> Option<Rect> {
        let canvas = self.canvas;
        let element = self.element_mut(id)?;
        let current = element.rect();
        let rect = canvas.resolve(Rect::new(x_mm, y_mm, current.width, current.height));
        element.set_rect(rect);
        Some(rect)
    }

    /// Resizes an element, keeping its top-left corner where it fits.
    ///
    /// Returns the accepted rectangle, or `None` if no such element exists.
    pub fn resize_element(
        &mut self,
        id: ElementId,
        width_mm: f64,
        height_mm: f64,
    ) -> Option<Rect> {
        let canvas = self.canvas;
        let element = self.element_mut(id)?;
        let current = element.rect();
        let rect = canvas.resolve(Rect::new(current.x, current.y, width_mm, height_mm));
        element.set_rect(rect);
        Some(rect)
    }

    pub fn set_z_order(&mut self, id: ElementId, z_order: i32) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.set_z_order(z_order);
                true
            }
            None => false,
        }
    }

    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id() == id)?;
        Some(self.elements.remove(index))
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Mutable access to an element's kind. Geometry stays under the
    /// template's control.
    pub fn element_kind_mut(&mut self, id: ElementId) -> Option<&mut ElementKind> {
        self.element_mut(id).map(|e| &mut e.kind)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id() == id)
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements by ascending z-order, ties in insertion order.
    ///
    /// Each call starts a fresh pass over the current elements.
    pub fn list_elements_ordered(&self) -> impl Iterator<Item = &Element> + Clone + '_ {
        let mut order: Vec<usize> = (0..self.elements.len()).collect();
        order.sort_by_key(|&i| self.elements[i].z_order());
        order.into_iter().map(move |i| &self.elements[i])
    }

    /// Variable elements a label instance may fill in, in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = &VariableTextElement> + '_ {
        self.elements.iter().filter_map(|e| match &e.kind {
            ElementKind::VariableText(var) => Some(var),
            _ => None,
        })
    }

    /// Names of variables that `values` leaves unset and that have no default.
    pub fn missing_variables(&self, values: &VariableValues) -> Vec<&str> {
        self.variables()
            .filter(|var| !values.contains_key(&var.variable_name) && var.default_value.is_empty())
            .map(|var| var.variable_name.as_str())
            .collect()
    }
}

impl Default for LamicoidTemplate {
    fn default() -> Self {
        Self::new("Lamicoid", Canvas::default())
    }
}
