//! Assignment of members to the planar views.
//!
//! A member appears in a planar view only when both of its endpoints lie on
//! the corresponding outer plane of the model's bounding box.

use crate::geometry::Point;
use crate::model::{StructuralModel, ViewSet, ViewTag};

/// Axis-aligned bounds of every member endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingExtremes {
    /// Smallest coordinates found on each axis.
    pub min: Point,
    /// Largest coordinates found on each axis.
    pub max: Point,
}

impl BoundingExtremes {
    /// Bounds of a single point.
    fn around(p: Point) -> Self {
        Self { min: p, max: p }
    }

    /// Grow the bounds to include `p`.
    fn include(&mut self, p: Point) {
        self.min = Point::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Bounds of the endpoints of all members.
    ///
    /// Nodes that no member uses do not widen the bounds. Returns `None` for a
    /// model without members.
    #[must_use]
    pub fn of_members(model: &StructuralModel) -> Option<Self> {
        let mut endpoints = model
            .member_endpoints()
            .flat_map(|(_, start, end)| [start, end]);
        let mut bounds = Self::around(endpoints.next()?);
        for p in endpoints {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// Planar views a member from `start` to `end` lies in, plus 3D.
    ///
    /// Coordinates are compared for exact equality with the extremes.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn views_of(&self, start: Point, end: Point) -> ViewSet {
        let mut views = ViewSet::default();
        if start.y == self.max.y && end.y == self.max.y {
            views.insert(ViewTag::Top);
        }
        if start.y == self.min.y && end.y == self.min.y {
            views.insert(ViewTag::Bottom);
        }
        if start.z == self.min.z && end.z == self.min.z {
            views.insert(ViewTag::Side1);
        }
        if start.z == self.max.z && end.z == self.max.z {
            views.insert(ViewTag::Side2);
        }
        views
    }
}

/// Tag every member with the views it belongs to.
///
/// Every member keeps the 3D view. Tags are recomputed from scratch, so calling
/// this again on an unchanged model gives the same sets.
///
/// # Examples
/// ```
/// use trussmesh::{classify_views, point, Member, Node, StructuralModel, ViewTag};
///
/// let mut model = StructuralModel::from_parts(
///     [
///         Node::new("N1", point(0.0, 0.0, 0.0)),
///         Node::new("N2", point(5.0, 0.0, 0.0)),
///         Node::new("N3", point(0.0, 2.0, 0.0)),
///     ],
///     [Member::new("floor", 1, 2), Member::new("post", 1, 3)],
/// )
/// .expect("valid model");
/// classify_views(&mut model);
///
/// let floor = model.members().next().expect("floor");
/// assert!(floor.views().contains(ViewTag::Bottom));
/// assert!(!floor.views().contains(ViewTag::Top));
/// ```
pub fn classify_views(model: &mut StructuralModel) {
    let Some(bounds) = BoundingExtremes::of_members(model) else {
        return;
    };
    let views: Vec<ViewSet> = model
        .member_endpoints()
        .map(|(_, start, end)| bounds.views_of(start, end))
        .collect();
    model.assign_views(&views);
}
