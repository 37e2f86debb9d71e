//! Reversible overlay edits and an undo/redo history over them.
//!
//! [`OverlayEdit`] values carry whatever state they need to reverse
//! themselves. Adds remember the ID they were given on first apply, so a
//! redo re-inserts the primitive at the same ID and any outstanding handle
//! stays valid. Removes remember the removed primitive so undo can put it
//! back where it was.

use std::collections::VecDeque;
use std::fmt;

use crate::component::OverlayComponent;
use crate::error::{OverlayError, Result};
use crate::listener::OverlayListener;
use crate::primitives::{Color, Line, LineId, Point, PointId, Triangle, TriangleId};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// The primitive an edit operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditTarget {
    Line(LineId),
    Point(PointId),
    Triangle(TriangleId),
}

/// A reversible change to an [`OverlayComponent`].
///
/// Build edits with the constructor functions and run them through
/// [`OverlayEditHistory::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEdit {
    AddLine {
        line: Line,
        id: Option<LineId>,
    },
    RemoveLine {
        id: LineId,
        removed: Option<Line>,
    },
    SetLineColor {
        id: LineId,
        color: Color,
        previous: Option<Color>,
    },
    SetLineThickness {
        id: LineId,
        thickness: f32,
        previous: Option<f32>,
    },
    AddPoint {
        point: Point,
        id: Option<PointId>,
    },
    RemovePoint {
        id: PointId,
        removed: Option<Point>,
    },
    SetPointColor {
        id: PointId,
        color: Color,
        previous: Option<Color>,
    },
    SetPointSize {
        id: PointId,
        size: f32,
        previous: Option<f32>,
    },
    AddTriangle {
        triangle: Triangle,
        id: Option<TriangleId>,
    },
    RemoveTriangle {
        id: TriangleId,
        removed: Option<Triangle>,
    },
}

impl OverlayEdit {
    pub fn add_line(line: Line) -> Self {
        Self::AddLine { line, id: None }
    }

    pub fn remove_line(id: LineId) -> Self {
        Self::RemoveLine { id, removed: None }
    }

    pub fn set_line_color(id: LineId, color: Color) -> Self {
        Self::SetLineColor {
            id,
            color,
            previous: None,
        }
    }

    pub fn set_line_thickness(id: LineId, thickness: f32) -> Self {
        Self::SetLineThickness {
            id,
            thickness,
            previous: None,
        }
    }

    pub fn add_point(point: Point) -> Self {
        Self::AddPoint { point, id: None }
    }

    pub fn remove_point(id: PointId) -> Self {
        Self::RemovePoint { id, removed: None }
    }

    pub fn set_point_color(id: PointId, color: Color) -> Self {
        Self::SetPointColor {
            id,
            color,
            previous: None,
        }
    }

    pub fn set_point_size(id: PointId, size: f32) -> Self {
        Self::SetPointSize {
            id,
            size,
            previous: None,
        }
    }

    pub fn add_triangle(triangle: Triangle) -> Self {
        Self::AddTriangle { triangle, id: None }
    }

    pub fn remove_triangle(id: TriangleId) -> Self {
        Self::RemoveTriangle { id, removed: None }
    }

    /// Human-readable name for menus and logs.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AddLine { .. } => "Add line",
            Self::RemoveLine { .. } => "Remove line",
            Self::SetLineColor { .. } => "Set line color",
            Self::SetLineThickness { .. } => "Set line thickness",
            Self::AddPoint { .. } => "Add point",
            Self::RemovePoint { .. } => "Remove point",
            Self::SetPointColor { .. } => "Set point color",
            Self::SetPointSize { .. } => "Set point size",
            Self::AddTriangle { .. } => "Add triangle",
            Self::RemoveTriangle { .. } => "Remove triangle",
        }
    }

    /// The primitive this edit touches. `None` for an add that has not run yet.
    pub fn target(&self) -> Option<EditTarget> {
        match *self {
            Self::AddLine { id, .. } => id.map(EditTarget::Line),
            Self::RemoveLine { id, .. }
            | Self::SetLineColor { id, .. }
            | Self::SetLineThickness { id, .. } => Some(EditTarget::Line(id)),
            Self::AddPoint { id, .. } => id.map(EditTarget::Point),
            Self::RemovePoint { id, .. }
            | Self::SetPointColor { id, .. }
            | Self::SetPointSize { id, .. } => Some(EditTarget::Point(id)),
            Self::AddTriangle { id, .. } => id.map(EditTarget::Triangle),
            Self::RemoveTriangle { id, .. } => Some(EditTarget::Triangle(id)),
        }
    }

    /// Applies (or re-applies) the edit.
    ///
    /// # Errors
    ///
    /// Propagates handle errors from the overlay. A failed apply leaves the
    /// overlay unchanged.
    pub fn apply<L: OverlayListener>(&mut self, overlay: &mut OverlayComponent<L>) -> Result<()> {
        match self {
            Self::AddLine { line, id } => match *id {
                Some(existing) => overlay.insert_line(existing, *line)?,
                None => *id = Some(overlay.add_line(*line)),
            },
            Self::RemoveLine { id, removed } => *removed = Some(overlay.remove_line(*id)?),
            Self::SetLineColor {
                id,
                color,
                previous,
            } => {
                let old = overlay.line(*id).map(|l| l.color);
                overlay.set_line_color(*id, *color)?;
                *previous = old;
            }
            Self::SetLineThickness {
                id,
                thickness,
                previous,
            } => {
                let old = overlay.line(*id).map(|l| l.thickness);
                overlay.set_line_thickness(*id, *thickness)?;
                *previous = old;
            }
            Self::AddPoint { point, id } => match *id {
                Some(existing) => overlay.insert_point(existing, *point)?,
                None => *id = Some(overlay.add_point(*point)),
            },
            Self::RemovePoint { id, removed } => *removed = Some(overlay.remove_point(*id)?),
            Self::SetPointColor {
                id,
                color,
                previous,
            } => {
                let old = overlay.point(*id).map(|p| p.color);
                overlay.set_point_color(*id, *color)?;
                *previous = old;
            }
            Self::SetPointSize { id, size, previous } => {
                let old = overlay.point(*id).map(|p| p.size);
                overlay.set_point_size(*id, *size)?;
                *previous = old;
            }
            Self::AddTriangle { triangle, id } => match *id {
                Some(existing) => overlay.insert_triangle(existing, *triangle)?,
                None => *id = Some(overlay.add_triangle(*triangle)),
            },
            Self::RemoveTriangle { id, removed } => {
                *removed = Some(overlay.remove_triangle(*id)?);
            }
        }
        Ok(())
    }

    /// Reverses a previously applied edit. Does nothing if the edit never ran.
    ///
    /// # Errors
    ///
    /// Propagates handle errors, e.g. when the primitive was removed outside
    /// the history.
    pub fn undo<L: OverlayListener>(&mut self, overlay: &mut OverlayComponent<L>) -> Result<()> {
        match *self {
            Self::AddLine { id: Some(id), .. } => {
                overlay.remove_line(id)?;
            }
            Self::RemoveLine {
                id,
                removed: Some(line),
            } => overlay.insert_line(id, line)?,
            Self::SetLineColor {
                id,
                previous: Some(color),
                ..
            } => overlay.set_line_color(id, color)?,
            Self::SetLineThickness {
                id,
                previous: Some(thickness),
                ..
            } => overlay.set_line_thickness(id, thickness)?,
            Self::AddPoint { id: Some(id), .. } => {
                overlay.remove_point(id)?;
            }
            Self::RemovePoint {
                id,
                removed: Some(point),
            } => overlay.insert_point(id, point)?,
            Self::SetPointColor {
                id,
                previous: Some(color),
                ..
            } => overlay.set_point_color(id, color)?,
            Self::SetPointSize {
                id,
                previous: Some(size),
                ..
            } => overlay.set_point_size(id, size)?,
            Self::AddTriangle { id: Some(id), .. } => {
                overlay.remove_triangle(id)?;
            }
            Self::RemoveTriangle {
                id,
                removed: Some(triangle),
            } => overlay.insert_triangle(id, triangle)?,
            _ => {}
        }
        Ok(())
    }

    /// Folds `next` into `self` if both set the same property of the same
    /// primitive. Keeps this edit's `previous` value so one undo restores
    /// the state before the whole run.
    pub fn merge(&mut self, next: &OverlayEdit) -> bool {
        match (self, next) {
            (
                Self::SetLineColor { id, color, .. },
                Self::SetLineColor {
                    id: next_id,
                    color: next_color,
                    ..
                },
            ) if *id == *next_id => *color = *next_color,
            (
                Self::SetLineThickness { id, thickness, .. },
                Self::SetLineThickness {
                    id: next_id,
                    thickness: next_thickness,
                    ..
                },
            ) if *id == *next_id => *thickness = *next_thickness,
            (
                Self::SetPointColor { id, color, .. },
                Self::SetPointColor {
                    id: next_id,
                    color: next_color,
                    ..
                },
            ) if *id == *next_id => *color = *next_color,
            (
                Self::SetPointSize { id, size, .. },
                Self::SetPointSize {
                    id: next_id,
                    size: next_size,
                    ..
                },
            ) if *id == *next_id => *size = *next_size,
            _ => return false,
        }
        true
    }
}

/// Linear undo/redo stack of [`OverlayEdit`]s.
///
/// The undo stack is a bounded [`VecDeque`]; when it exceeds `max_undo`,
/// the oldest edit is dropped from the front. Executing a new edit clears
/// the redo stack.
///
/// # Example
///
/// ```
/// use redlilium_overlay::math::Vec3;
/// use redlilium_overlay::{
///     Color, Line, MaterialHandle, OverlayComponent, OverlayDescriptor, OverlayEdit,
///     OverlayEditHistory,
/// };
///
/// let mut overlay =
///     OverlayComponent::new(OverlayDescriptor::new(MaterialHandle(1), MaterialHandle(2)));
/// let mut history = OverlayEditHistory::default();
///
/// let line = Line::new(Vec3::zeros(), Vec3::x(), Color::WHITE, 1.0);
/// history.execute(OverlayEdit::add_line(line), &mut overlay).unwrap();
/// assert_eq!(overlay.line_count(), 1);
///
/// history.undo(&mut overlay).unwrap();
/// assert_eq!(overlay.line_count(), 0);
/// ```
pub struct OverlayEditHistory {
    undo_stack: VecDeque<OverlayEdit>,
    redo_stack: Vec<OverlayEdit>,
    max_undo: usize,
    merge_broken: bool,
}

impl OverlayEditHistory {
    /// Creates an empty history with the given maximum undo depth.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo,
            merge_broken: false,
        }
    }

    /// Applies `edit` and records it.
    ///
    /// Returns the primitive the edit touched, which for an add is the
    /// newly issued ID. If the edit fails, nothing is recorded.
    pub fn execute<L: OverlayListener>(
        &mut self,
        mut edit: OverlayEdit,
        overlay: &mut OverlayComponent<L>,
    ) -> Result<Option<EditTarget>> {
        edit.apply(overlay)?;
        let target = edit.target();

        self.redo_stack.clear();

        if !self.merge_broken
            && let Some(last) = self.undo_stack.back_mut()
            && last.merge(&edit)
        {
            return Ok(target);
        }
        self.merge_broken = false;

        self.undo_stack.push_back(edit);
        if self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
        Ok(target)
    }

    /// Prevents the next executed edit from merging with the current top.
    ///
    /// Call at the end of an interactive drag so the next drag becomes its
    /// own undo step.
    pub fn break_merge(&mut self) {
        self.merge_broken = true;
    }

    /// Undoes the most recent edit.
    pub fn undo<L: OverlayListener>(&mut self, overlay: &mut OverlayComponent<L>) -> Result<()> {
        let mut edit = self.undo_stack.pop_back().ok_or(OverlayError::NothingToUndo)?;
        edit.undo(overlay)?;
        self.redo_stack.push(edit);
        Ok(())
    }

    /// Redoes the most recently undone edit.
    pub fn redo<L: OverlayListener>(&mut self, overlay: &mut OverlayComponent<L>) -> Result<()> {
        let mut edit = self.redo_stack.pop().ok_or(OverlayError::NothingToRedo)?;
        edit.apply(overlay)?;
        self.undo_stack.push_back(edit);
        if self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|e| e.description())
    }

    /// Redo descriptions, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|e| e.description())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Clears both stacks and resets the merge-broken flag.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.merge_broken = false;
    }
}

impl Default for OverlayEditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl fmt::Debug for OverlayEditHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayEditHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("merge_broken", &self.merge_broken)
            .finish()
    }
}
