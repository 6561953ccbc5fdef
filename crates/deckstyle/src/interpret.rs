//! The action interpreter.
//!
//! [`apply`] walks each card of an [`ActionPlan`] in the working document and
//! applies the listed actions element by element. Positions are always
//! checked against the pristine document, which is never modified: a move
//! first measures how far earlier edits have already shifted the element and
//! folds that drift into the new transform, then verifies the result.
//!
//! Copies are collected while a card is walked and inserted once all of the
//! card's other actions ran, so a copy sees the final state of its source.

use std::collections::{HashMap, HashSet};

use log::{debug, info, trace, warn};

use deckstyle_core::{
    action::{Action, ActionKind, ActionPlan, AdjustValue, CardActions, CopyParams, MissingTargetPolicy},
    format,
    geometry::Point,
    identifier::Id,
    style::{Style, StyleError},
    transform::{Matrix, Transform},
};

use crate::{
    config::EditConfig,
    document::{Document, ElementKind, NodeId, split_name},
    error::DeckstyleError,
    resolve::{Resolver, element_transform, reference_offset, reference_target},
};

/// Largest position error, per axis, a move or isolate may leave behind.
pub const POSITION_TOLERANCE: f64 = 1e-3;

/// Reference attributes that describe geometry or identity rather than
/// presentation, and so are never carried onto an isolated clone.
const REFERENCE_ONLY_ATTRIBUTES: [&str; 7] =
    ["id", "href", "transform", "x", "y", "width", "height"];

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditReport {
    applied: usize,
    copies: usize,
    skipped: usize,
}

impl EditReport {
    /// Actions applied, copies included.
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// `use` elements inserted by copy actions.
    pub fn copies(&self) -> usize {
        self.copies
    }

    /// Actions skipped under the missing-target policy.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Applies `plan` to `working`, using `pristine` as the positional ground
/// truth.
///
/// `pristine` must be an unmodified parse of the same input as `working`.
///
/// # Errors
///
/// The first failing action aborts the run; `working` is then left partially
/// edited and should be discarded.
pub fn apply(
    working: &mut Document,
    pristine: &Document,
    plan: &ActionPlan,
    config: &EditConfig,
) -> Result<EditReport, DeckstyleError> {
    let mut interpreter = Interpreter {
        working,
        pristine,
        working_resolver: Resolver::new(config.max_reference_depth()),
        pristine_resolver: Resolver::new(config.max_reference_depth()),
        config,
        intended: HashMap::new(),
        report: EditReport::default(),
    };

    for (card, actions) in plan.cards() {
        interpreter.apply_card(card, actions)?;
    }
    Ok(interpreter.report)
}

struct PendingCopy<'p> {
    element: Id,
    action: &'p Action,
    params: CopyParams,
}

struct Interpreter<'a> {
    working: &'a mut Document,
    pristine: &'a Document,
    working_resolver: Resolver,
    pristine_resolver: Resolver,
    config: &'a EditConfig,
    /// Sum of the offsets already requested for each element in this run.
    intended: HashMap<Id, Point>,
    report: EditReport,
}

impl Interpreter<'_> {
    fn apply_card(&mut self, card: Id, actions: &CardActions) -> Result<(), DeckstyleError> {
        let Some(card_node) = self.working.lookup(card) else {
            for (&element, list) in actions {
                for action in list {
                    self.missing(card, element, action)?;
                }
            }
            return Ok(());
        };
        info!(card:%, elements = actions.len(); "Applying card actions");

        let mut handled = HashSet::new();
        let mut copies = Vec::new();

        for node in self.working.descendants(card_node) {
            // Earlier deletes and isolates may have removed this subtree.
            if !self.working.is_ancestor(card_node, node) {
                continue;
            }
            let Some(element) = self.working.element_id(node) else {
                continue;
            };
            let Some(list) = actions.get(&element) else {
                continue;
            };
            if !handled.insert(element) {
                continue;
            }

            let mut current = Some(node);
            for action in list {
                match current {
                    Some(node) if self.working.is_ancestor(card_node, node) => {
                        current = self.apply_action(card, element, node, action, &mut copies)?;
                    }
                    _ => self.missing(card, element, action)?,
                }
            }
        }

        for (&element, list) in actions {
            if handled.contains(&element) {
                continue;
            }
            for action in list {
                self.missing(card, element, action)?;
            }
        }

        let mut last_copies = HashMap::new();
        for copy in copies {
            self.copy(copy, &mut last_copies)?;
        }
        Ok(())
    }

    /// Applies one action and returns the node that carries `element`
    /// afterwards, if any.
    fn apply_action<'p>(
        &mut self,
        card: Id,
        element: Id,
        node: NodeId,
        action: &'p Action,
        copies: &mut Vec<PendingCopy<'p>>,
    ) -> Result<Option<NodeId>, DeckstyleError> {
        debug!(card:%, element:%, action:%, kind:% = action.kind().code(); "Applying action");

        let node = match action.kind() {
            ActionKind::Delete => {
                self.working.detach(node);
                None
            }
            ActionKind::Copy(params) => {
                copies.push(PendingCopy {
                    element,
                    action,
                    params: *params,
                });
                return Ok(Some(node));
            }
            ActionKind::Move { dx, dy } => {
                self.move_element(node, element, action, Point::new(*dx, *dy))?;
                Some(node)
            }
            ActionKind::Substitute { attribute, value } => {
                self.working.set_attribute(node, attribute, value);
                Some(node)
            }
            ActionKind::Adjust { property, value } => {
                self.edit_style(node, |style| match value {
                    AdjustValue::Literal(value) => style.replace(property, value),
                    AdjustValue::Multiply(factor) => style.multiply(property, *factor).map(|_| ()),
                })?;
                Some(node)
            }
            ActionKind::Isolate { classes } => Some(self.isolate(node, element, action, classes)?),
            ActionKind::SetClasses { classes } => {
                self.working.set_attribute(node, "class", classes);
                Some(node)
            }
            ActionKind::SetStyle { property, value } => {
                self.edit_style(node, |style| {
                    style.set(property, value);
                    Ok(())
                })?;
                Some(node)
            }
        };

        self.report.applied += 1;
        Ok(node)
    }

    /// Moves `node` by `offset` on top of the element's earlier moves,
    /// cancelling any drift left by edits of other elements.
    fn move_element(
        &mut self,
        node: NodeId,
        element: Id,
        action: &Action,
        offset: Point,
    ) -> Result<(), DeckstyleError> {
        let pristine_node = self
            .pristine
            .lookup(element)
            .ok_or_else(|| DeckstyleError::UnknownElement {
                id: element.to_string(),
            })?;
        let origin = self.pristine_resolver.position(self.pristine, pristine_node)?;
        let earlier = self.intended.get(&element).copied().unwrap_or_default();
        let current = self.working_resolver.position(self.working, node)?;
        let drift = current.sub_point(origin.add_point(earlier));
        let shift = offset.sub_point(drift);

        let transform = match element_transform(self.working, node)? {
            Some(Transform::Translate { dx, dy }) => Some(Transform::Translate {
                dx: dx + shift.x(),
                dy: dy + shift.y(),
            }),
            Some(Transform::Matrix(matrix)) => Some(Transform::Matrix(
                matrix.with_translation(matrix.e() + shift.x(), matrix.f() + shift.y()),
            )),
            Some(Transform::Scale { sx, sy }) => Some(Transform::Matrix(Matrix::new(
                sx,
                0.0,
                0.0,
                sy,
                shift.x(),
                shift.y(),
            ))),
            None if !offset.is_zero() || !drift.is_zero() => Some(Transform::Translate {
                dx: shift.x(),
                dy: shift.y(),
            }),
            None => None,
        };
        trace!(element:%, drift:?, transform:?; "Move transform");

        if let Some(transform) = transform {
            self.working
                .set_attribute(node, "transform", &transform.to_string());
        }

        let expected = earlier.add_point(offset);
        let moved = self
            .working_resolver
            .position(self.working, node)?
            .sub_point(origin);
        verify(element, action, moved, expected)?;
        self.intended.insert(element, expected);
        Ok(())
    }

    /// Replaces the reference `node` by a copy of the element it ultimately
    /// points at, carrying the whole chain's placement in one matrix.
    fn isolate(
        &mut self,
        node: NodeId,
        element: Id,
        action: &Action,
        classes: &str,
    ) -> Result<NodeId, DeckstyleError> {
        if self.working.kind(node) != ElementKind::Reference {
            return Err(DeckstyleError::UnsupportedElement {
                element: element.to_string(),
                tag: self
                    .working
                    .element(node)
                    .map(|found| found.name().to_string())
                    .unwrap_or_default(),
            });
        }
        // Also rejects broken and cyclic chains before anything is edited.
        let before = self.working_resolver.position(self.working, node)?;

        let mut placement = Matrix::IDENTITY;
        let mut inherited: Vec<(String, String)> = Vec::new();
        let mut current = node;
        while self.working.kind(current) == ElementKind::Reference {
            if let Some(transform) = element_transform(self.working, current)? {
                placement = placement.multiply(&transform.to_matrix());
            }
            let offset = reference_offset(self.working, current)?;
            placement = placement.multiply(&Matrix::from_translation(offset.x(), offset.y()));

            if let Some(reference) = self.working.element(current) {
                for (name, value) in reference.attributes() {
                    let carried = !REFERENCE_ONLY_ATTRIBUTES.contains(&split_name(name).1)
                        && !name.starts_with("xmlns");
                    if carried && !inherited.iter().any(|(known, _)| known == name) {
                        inherited.push((name.to_string(), value.to_string()));
                    }
                }
            }
            current = reference_target(self.working, current)?;
        }
        if let Some(transform) = element_transform(self.working, current)? {
            placement = placement.multiply(&transform.to_matrix());
        }

        let clone = self.working.deep_clone(current);
        for descendant in self.working.descendants(clone) {
            if let Some(old) = self.working.element_id(descendant) {
                let renamed = old.with_prefix(element).to_string();
                self.working.set_attribute(descendant, "id", &renamed);
            }
        }
        self.working
            .set_attribute(clone, "id", &element.to_string());
        self.working
            .set_attribute(clone, "transform", &Transform::Matrix(placement).to_string());
        for (name, value) in &inherited {
            if self.working.attribute(clone, name).is_none() {
                self.working.set_attribute(clone, name, value);
            }
        }
        if !classes.trim().is_empty() {
            self.working.set_attribute(clone, "class", classes);
            if self.working.kind(clone) == ElementKind::Group {
                let children: Vec<_> = self.working.child_elements(clone).collect();
                for child in children {
                    self.working.set_attribute(child, "class", classes);
                }
            }
        }

        self.working.replace(node, clone);
        debug!(element:%, source:% = self.working.label(current); "Isolated reference");

        let moved = self
            .working_resolver
            .position(self.working, clone)?
            .sub_point(before);
        verify(element, action, moved, Point::default())?;
        Ok(clone)
    }

    /// Inserts the `use` element for a queued copy.
    fn copy(
        &mut self,
        copy: PendingCopy<'_>,
        last_copies: &mut HashMap<NodeId, NodeId>,
    ) -> Result<(), DeckstyleError> {
        let PendingCopy {
            element,
            action,
            params,
        } = copy;

        // The source is found by id, so a copy follows an isolated clone.
        let Some(source) = self.working.lookup(element) else {
            return Err(DeckstyleError::UnresolvedReference {
                element: action.to_string(),
                target: element.to_string(),
            });
        };

        let transform = match params {
            CopyParams::Translate { dx, dy } => Transform::Translate { dx, dy }.to_string(),
            CopyParams::Scaled { dx, dy, sx, sy } => {
                let position = self.working_resolver.position(self.working, source)?;
                let size = self.working_resolver.size(self.working, source)?;
                let (x, y) = (position.x(), position.y());
                let (w, h) = (size.width(), size.height());
                let e = sx * -x + x - (sx * w - w) / 2.0 + dx;
                let f = sy * -y + y - (sy * h - h) / 2.0 + dy;
                format!(
                    "matrix({},0,0,{},{},{})",
                    format::fixed(sx),
                    format::fixed(sy),
                    format::fixed(e),
                    format::fixed(f)
                )
            }
        };

        let name = match self
            .working
            .element(source)
            .and_then(|source| split_name(source.name()).0)
        {
            Some(prefix) => format!("{prefix}:use"),
            None => "use".to_string(),
        };
        let href_name = self.working.href_name();
        let href = format!("#{element}");
        let node = self.working.create_element(
            &name,
            [(href_name.as_str(), href.as_str()), ("transform", transform.as_str())],
        );

        let anchor = last_copies.get(&source).copied().unwrap_or(source);
        self.working.insert_after(anchor, node);
        last_copies.insert(source, node);

        debug!(element:%, action:%, transform:%; "Inserted copy");
        self.report.copies += 1;
        self.report.applied += 1;
        Ok(())
    }

    /// Rewrites the `style` attribute of `node` through `edit`.
    fn edit_style(
        &mut self,
        node: NodeId,
        edit: impl FnOnce(&mut Style) -> Result<(), StyleError>,
    ) -> Result<(), DeckstyleError> {
        let mut style = Style::parse(self.working.attribute(node, "style").unwrap_or_default());
        edit(&mut style).map_err(|err| match err {
            StyleError::MissingProperty(property) => DeckstyleError::MissingStyleProperty {
                element: self.working.label(node),
                property,
            },
            StyleError::NotNumeric { property, value } => DeckstyleError::InvalidStyleValue {
                element: self.working.label(node),
                property,
                value,
            },
        })?;
        self.working
            .set_attribute(node, "style", &style.to_string());
        Ok(())
    }

    /// Applies the missing-target policy to an action that has no element to
    /// act on.
    fn missing(&mut self, card: Id, element: Id, action: &Action) -> Result<(), DeckstyleError> {
        match self.config.missing_target() {
            MissingTargetPolicy::Ignore => {
                debug!(card:%, element:%, action:%; "Skipping action without target");
            }
            MissingTargetPolicy::Warn => {
                warn!(card:%, element:%, action:%; "Skipping action: element is not part of the card");
            }
            MissingTargetPolicy::Error => {
                return Err(DeckstyleError::MissingTarget {
                    card: card.to_string(),
                    element: element.to_string(),
                    action: action.to_string(),
                });
            }
        }
        self.report.skipped += 1;
        Ok(())
    }
}

/// Checks that an element moved by `expected`, within
/// [`POSITION_TOLERANCE`] on each axis.
fn verify(element: Id, action: &Action, moved: Point, expected: Point) -> Result<(), DeckstyleError> {
    if moved.approx_eq(expected, POSITION_TOLERANCE) {
        return Ok(());
    }
    let (axis, moved, expected) = if (moved.x() - expected.x()).abs() < POSITION_TOLERANCE {
        ('y', moved.y(), expected.y())
    } else {
        ('x', moved.x(), expected.x())
    };
    Err(DeckstyleError::PositionDriftDetected {
        element: element.to_string(),
        action: action.to_string(),
        axis,
        moved,
        expected,
    })
}
