//! Absolute positions and extremes of document elements.
//!
//! The position of an element is the top-left corner of its extremes mapped
//! through its own transform. A `use` element is positioned at its target's
//! position shifted by its `x`/`y` and then mapped through its own transform.
//!
//! Extremes are memoized per node by a [`Resolver`]. The cache belongs to one
//! document and is dropped whenever that document's revision changes, so a
//! resolver may be kept across edits of its document but must never be
//! shared between documents.

use std::collections::HashMap;

use log::trace;

use deckstyle_core::{
    geometry::{Extremes, Point, Size},
    identifier::Id,
    path::path_extremes,
    transform::{Transform, apply_optional},
};
use deckstyle_parser::{ParseError, parse_path, parse_transform};

use crate::{
    document::{Document, ElementKind, NodeId},
    error::DeckstyleError,
};

/// Path data assumed for a `path` without a `d` attribute.
const DEFAULT_PATH_DATA: &str = "M0,0";

/// Parses the `transform` attribute of `node`.
///
/// An absent or blank attribute is no transform.
pub fn element_transform(
    document: &Document,
    node: NodeId,
) -> Result<Option<Transform>, DeckstyleError> {
    let Some(source) = document.attribute(node, "transform") else {
        return Ok(None);
    };
    if source.trim().is_empty() {
        return Ok(None);
    }
    parse_transform(source)
        .map(Some)
        .map_err(|err| DeckstyleError::MalformedTransform {
            element: document.label(node),
            err,
            src: source.to_string(),
        })
}

/// Finds the element a `use` points at.
pub fn reference_target(document: &Document, node: NodeId) -> Result<NodeId, DeckstyleError> {
    let href = document.href(node).map(str::trim).unwrap_or_default();
    let target = href.strip_prefix('#').unwrap_or(href);
    if target.is_empty() {
        return Err(DeckstyleError::UnresolvedReference {
            element: document.label(node),
            target: href.to_string(),
        });
    }
    document
        .lookup(Id::new(target))
        .ok_or_else(|| DeckstyleError::UnresolvedReference {
            element: document.label(node),
            target: target.to_string(),
        })
}

/// Reads a numeric geometry attribute; absent attributes are 0.
pub fn number_attribute(
    document: &Document,
    node: NodeId,
    attribute: &str,
) -> Result<f64, DeckstyleError> {
    let Some(value) = document.attribute(node, attribute) else {
        return Ok(0.0);
    };
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| DeckstyleError::InvalidAttribute {
            element: document.label(node),
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
}

/// The `x`/`y` offset of a reference.
pub fn reference_offset(document: &Document, node: NodeId) -> Result<Point, DeckstyleError> {
    Ok(Point::new(
        number_attribute(document, node, "x")?,
        number_attribute(document, node, "y")?,
    ))
}

fn unsupported(document: &Document, node: NodeId) -> DeckstyleError {
    DeckstyleError::UnsupportedElement {
        element: document.label(node),
        tag: document
            .element(node)
            .map(|element| element.name().to_string())
            .unwrap_or_default(),
    }
}

/// Memoizing position resolver for one document.
///
/// # Examples
///
/// ```
/// # use deckstyle::{document::Document, resolve::Resolver};
/// # use deckstyle_core::{geometry::Point, identifier::Id};
/// let doc = Document::parse(
///     r##"<svg><path id="p" d="M10,20 l5,5" transform="translate(1,1)"/>
///        <use id="u" href="#p" x="100"/></svg>"##,
/// ).unwrap();
///
/// let mut resolver = Resolver::new(32);
/// assert_eq!(resolver.position_of(&doc, Id::new("p")).unwrap(), Point::new(11.0, 21.0));
/// assert_eq!(resolver.position_of(&doc, Id::new("u")).unwrap(), Point::new(111.0, 21.0));
/// ```
#[derive(Debug)]
pub struct Resolver {
    /// Instance and revision of the document the cache was filled from.
    snapshot: Option<(u64, u64)>,
    extremes: HashMap<NodeId, Extremes>,
    visiting: Vec<NodeId>,
    max_depth: usize,
}

impl Resolver {
    /// Creates a resolver that follows at most `max_depth` nested references.
    pub fn new(max_depth: usize) -> Self {
        Self {
            snapshot: None,
            extremes: HashMap::new(),
            visiting: Vec::new(),
            max_depth,
        }
    }

    /// Resolves the absolute position of the element with id `id`.
    pub fn position_of(&mut self, document: &Document, id: Id) -> Result<Point, DeckstyleError> {
        let node = document
            .lookup(id)
            .ok_or_else(|| DeckstyleError::UnknownElement { id: id.to_string() })?;
        self.position(document, node)
    }

    /// Resolves the absolute position of `node`.
    pub fn position(&mut self, document: &Document, node: NodeId) -> Result<Point, DeckstyleError> {
        self.sync(document);

        let position = match document.kind(node) {
            ElementKind::Reference => self.guarded(document, node, |resolver| {
                let target = reference_target(document, node)?;
                let origin = resolver
                    .position(document, target)?
                    .add_point(reference_offset(document, node)?);
                let transform = element_transform(document, node)?;
                Ok(apply_optional(transform.as_ref(), origin))
            })?,
            ElementKind::Path | ElementKind::Rect | ElementKind::Group => {
                let top_left = self.extremes(document, node)?.top_left();
                let transform = element_transform(document, node)?;
                apply_optional(transform.as_ref(), top_left)
            }
            ElementKind::Other => return Err(unsupported(document, node)),
        };

        trace!(element:% = document.label(node), x = position.x(), y = position.y(); "Resolved position");
        Ok(position)
    }

    /// Resolves the extremes of `node` in its local space, before its own
    /// transform.
    pub fn extremes(
        &mut self,
        document: &Document,
        node: NodeId,
    ) -> Result<Extremes, DeckstyleError> {
        self.sync(document);
        if let Some(extremes) = self.extremes.get(&node) {
            return Ok(*extremes);
        }

        let extremes = self.guarded(document, node, |resolver| {
            resolver.compute_extremes(document, node)
        })?;
        self.extremes.insert(node, extremes);
        Ok(extremes)
    }

    /// Resolves the size of `node` as used by scaled copies.
    pub fn size(&mut self, document: &Document, node: NodeId) -> Result<Size, DeckstyleError> {
        self.sync(document);

        match document.kind(node) {
            ElementKind::Path | ElementKind::Rect => Ok(self.extremes(document, node)?.size()),
            ElementKind::Group => {
                let extremes = self.extremes(document, node)?;
                Ok(match element_transform(document, node)? {
                    Some(transform) => transform.apply_extremes(extremes).size(),
                    None => extremes.size(),
                })
            }
            ElementKind::Reference => self.guarded(document, node, |resolver| {
                let target = reference_target(document, node)?;
                resolver.size(document, target)
            }),
            ElementKind::Other => Err(unsupported(document, node)),
        }
    }

    fn compute_extremes(
        &mut self,
        document: &Document,
        node: NodeId,
    ) -> Result<Extremes, DeckstyleError> {
        match document.kind(node) {
            ElementKind::Path => {
                let data = document.attribute(node, "d").unwrap_or(DEFAULT_PATH_DATA);
                path_extremes(parse_path(data)).map_err(|diagnostic| {
                    DeckstyleError::MalformedPath {
                        element: document.label(node),
                        err: ParseError::from(diagnostic),
                        src: data.to_string(),
                    }
                })
            }
            ElementKind::Rect => {
                let x = number_attribute(document, node, "x")?;
                let y = number_attribute(document, node, "y")?;
                let width = number_attribute(document, node, "width")?;
                let height = number_attribute(document, node, "height")?;
                Ok(Extremes::from_top_left(Point::new(x, y), Size::new(width, height)))
            }
            ElementKind::Group => {
                let mut union: Option<Extremes> = None;
                for child in document.child_elements(node) {
                    if document.kind(child) == ElementKind::Other {
                        continue;
                    }
                    let extremes = self.extremes(document, child)?;
                    let extremes = match element_transform(document, child)? {
                        Some(transform) => transform.apply_extremes(extremes),
                        None => extremes,
                    };
                    union = Some(match union {
                        Some(union) => union.merge(&extremes),
                        None => extremes,
                    });
                }
                Ok(union.unwrap_or_default())
            }
            ElementKind::Reference => {
                let target = reference_target(document, node)?;
                let extremes = self.extremes(document, target)?;
                let extremes = match element_transform(document, target)? {
                    Some(transform) => transform.apply_extremes(extremes),
                    None => extremes,
                };
                Ok(extremes.translate(reference_offset(document, node)?))
            }
            ElementKind::Other => Err(unsupported(document, node)),
        }
    }

    /// Runs `compute` with `node` on the visiting chain, failing when the
    /// chain would revisit a node or nest too many references.
    fn guarded<T>(
        &mut self,
        document: &Document,
        node: NodeId,
        compute: impl FnOnce(&mut Self) -> Result<T, DeckstyleError>,
    ) -> Result<T, DeckstyleError> {
        let references = self
            .visiting
            .iter()
            .filter(|&&visited| document.kind(visited) == ElementKind::Reference)
            .count();
        let too_deep =
            document.kind(node) == ElementKind::Reference && references >= self.max_depth;

        if too_deep || self.visiting.contains(&node) {
            let chain = self
                .visiting
                .iter()
                .chain(std::iter::once(&node))
                .map(|&visited| document.label(visited))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(DeckstyleError::CyclicReference { chain });
        }

        self.visiting.push(node);
        let result = compute(self);
        self.visiting.pop();
        result
    }

    fn sync(&mut self, document: &Document) {
        let snapshot = (document.instance(), document.revision());
        if self.snapshot != Some(snapshot) {
            self.extremes.clear();
            self.snapshot = Some(snapshot);
        }
    }
}
