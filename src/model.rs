//! Core data structures describing a structural model.

use std::fmt;
use std::str::FromStr;

use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, UnknownViewError};
use crate::geometry::Point;
use crate::section::CrossSection;

/// A labelled point of the structure (a joint).
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Label from the source file.
    pub label: String,
    /// Position in model length units.
    pub position: Point,
}

impl Node {
    /// Create a node.
    #[must_use]
    pub fn new(label: impl Into<String>, position: Point) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }
}

/// A projection a member can be drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewTag {
    /// The full model.
    #[serde(rename = "3D")]
    ThreeD,
    /// Members lying on the maximum-Y plane.
    Top,
    /// Members lying on the minimum-Y plane.
    Bottom,
    /// Members lying on the minimum-Z plane.
    Side1,
    /// Members lying on the maximum-Z plane.
    Side2,
}

impl ViewTag {
    /// Every view, in output order.
    pub const ALL: [Self; 5] = [Self::ThreeD, Self::Top, Self::Bottom, Self::Side1, Self::Side2];

    /// Name used in messages and output file names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ThreeD => "3D",
            Self::Top => "Top",
            Self::Bottom => "Bottom",
            Self::Side1 => "Side1",
            Self::Side2 => "Side2",
        }
    }

    /// Bit of this view inside a [`ViewSet`].
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for ViewTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for ViewTag {
    type Err = UnknownViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|view| view.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownViewError(s.to_owned()))
    }
}

/// Set of views a member belongs to.
///
/// Stored as a bit mask so inserting a view twice is a no-op.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewSet(u8);

impl ViewSet {
    /// A set containing no view at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Add `view` to the set.
    pub fn insert(&mut self, view: ViewTag) {
        self.0 |= view.bit();
    }

    /// Returns true when `view` is in the set.
    #[must_use]
    pub const fn contains(self, view: ViewTag) -> bool {
        self.0 & view.bit() != 0
    }

    /// Number of views in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns true when the set holds no view.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the views in [`ViewTag::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = ViewTag> {
        ViewTag::ALL.into_iter().filter(move |view| self.contains(*view))
    }
}

/// A fresh member only appears in the 3D view.
impl Default for ViewSet {
    fn default() -> Self {
        let mut set = Self::empty();
        set.insert(ViewTag::ThreeD);
        set
    }
}

impl FromIterator<ViewTag> for ViewSet {
    fn from_iter<I: IntoIterator<Item = ViewTag>>(iter: I) -> Self {
        let mut set = Self::empty();
        for view in iter {
            set.insert(view);
        }
        set
    }
}

impl fmt::Debug for ViewSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A beam, column or brace connecting two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    /// Label from the source file.
    pub label: String,
    /// Shape name the section was resolved from.
    pub shape_label: String,
    /// 1-based index of the start node.
    pub start_node: usize,
    /// 1-based index of the end node.
    pub end_node: usize,
    /// Roll about the member's own axis, in degrees.
    pub rotation: f64,
    /// Resolved cross-section.
    pub section: CrossSection,
    /// Views the member is drawn in, set by [`classify_views`](crate::classify_views).
    views: ViewSet,
}

impl Member {
    /// Create an unrotated member with an empty section.
    #[must_use]
    pub fn new(label: impl Into<String>, start_node: usize, end_node: usize) -> Self {
        Self {
            label: label.into(),
            shape_label: String::new(),
            start_node,
            end_node,
            rotation: 0.0,
            section: CrossSection::EMPTY,
            views: ViewSet::default(),
        }
    }

    /// Set the roll angle in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the section.
    #[must_use]
    pub fn with_section(mut self, section: CrossSection) -> Self {
        self.section = section;
        self
    }

    /// Set the shape label the section came from.
    #[must_use]
    pub fn with_shape_label(mut self, shape_label: impl Into<String>) -> Self {
        self.shape_label = shape_label.into();
        self
    }

    /// Views the member belongs to.
    #[must_use]
    pub fn views(&self) -> ViewSet {
        self.views
    }

    /// Returns true when the member is drawn in `view`.
    #[must_use]
    pub fn in_view(&self, view: ViewTag) -> bool {
        view == ViewTag::ThreeD || self.views.contains(view)
    }

    /// Replace the view set.
    pub(crate) fn set_views(&mut self, views: ViewSet) {
        self.views = views;
    }
}

/// Capability shared by every model reader.
///
/// The geometry core only needs nodes and fully resolved members, so synthetic
/// models can be fed in without any file.
pub trait ModelSource {
    /// Nodes in file order; members refer to them by 1-based position.
    fn nodes(&self) -> &[Node];
    /// Members with their sections resolved.
    fn members(&self) -> &[Member];
}

/// Container for a parsed frame model.
///
/// Nodes and members are stored as a graph; graph node `i` is the model's
/// 1-based node `i + 1`.
#[derive(Clone, Debug, Default)]
pub struct StructuralModel {
    /// Underlying graph storage for nodes and members.
    graph: Graph<Node, Member>,
    /// Indicates whether the member view tags are current.
    classified: bool,
}

impl StructuralModel {
    /// Create an empty model.
    ///
    /// # Examples
    /// ```
    /// use trussmesh::StructuralModel;
    ///
    /// let model = StructuralModel::new();
    /// assert_eq!(model.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from nodes and members in one step.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownNode`] when a member references a node
    /// outside `1..=node_count`.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = Node>,
        members: impl IntoIterator<Item = Member>,
    ) -> Result<Self, ModelError> {
        let mut model = Self::new();
        for node in nodes {
            model.add_node(node);
        }
        for member in members {
            model.add_member(member)?;
        }
        Ok(model)
    }

    /// Build a model from any reader output.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownNode`] when a member references a node that
    /// the source does not provide.
    pub fn from_source<S: ModelSource + ?Sized>(source: &S) -> Result<Self, ModelError> {
        Self::from_parts(
            source.nodes().iter().cloned(),
            source.members().iter().cloned(),
        )
    }

    /// Return the number of nodes in the model.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members in the model.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true when the view tags reflect the current geometry.
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.classified
    }

    /// Add a node and return its 1-based index.
    ///
    /// # Examples
    /// ```
    /// use trussmesh::{point, Node, StructuralModel};
    ///
    /// let mut model = StructuralModel::new();
    /// let index = model.add_node(Node::new("N1", point(0.0, 0.0, 0.0)));
    /// assert_eq!(index, 1);
    /// ```
    pub fn add_node(&mut self, node: Node) -> usize {
        self.invalidate();
        self.graph.add_node(node).index() + 1
    }

    /// Connect the member's two nodes.
    ///
    /// The member starts out in the 3D view only. Coincident endpoints are
    /// accepted here and skipped when geometry is generated.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownNode`] when either endpoint index is not in
    /// `1..=node_count`.
    pub fn add_member(&mut self, mut member: Member) -> Result<EdgeIndex, ModelError> {
        let start = self.node_index(&member, member.start_node)?;
        let end = self.node_index(&member, member.end_node)?;
        self.invalidate();
        member.set_views(ViewSet::default());
        Ok(self.graph.add_edge(start, end, member))
    }

    /// Look up a node by its 1-based index.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        let position = index.checked_sub(1)?;
        self.graph.node_weight(NodeIndex::new(position))
    }

    /// Iterate nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Iterate members in file order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.graph.edge_weights()
    }

    /// Iterate members together with their start and end positions.
    pub fn member_endpoints(&self) -> impl Iterator<Item = (&Member, Point, Point)> {
        self.graph.edge_references().map(move |edge| {
            (
                edge.weight(),
                self.graph[edge.source()].position,
                self.graph[edge.target()].position,
            )
        })
    }

    /// Overwrite the view tags of every member, in file order.
    pub(crate) fn assign_views(&mut self, views: &[ViewSet]) {
        for (member, set) in self.graph.edge_weights_mut().zip(views) {
            member.set_views(*set);
        }
        self.classified = true;
    }

    /// Resolve a 1-based node reference into a graph index.
    fn node_index(&self, member: &Member, index: usize) -> Result<NodeIndex, ModelError> {
        if index == 0 || index > self.graph.node_count() {
            return Err(ModelError::UnknownNode {
                member: member.label.clone(),
                index,
                node_count: self.graph.node_count(),
            });
        }
        Ok(NodeIndex::new(index - 1))
    }

    /// Reset view tags after a change to the model.
    fn invalidate(&mut self) {
        if self.classified {
            self.classified = false;
            for member in self.graph.edge_weights_mut() {
                member.set_views(ViewSet::default());
            }
        }
    }
}
