//! The typed edit-action model.
//!
//! An action file names, per card, the child elements to edit and the
//! actions to apply to each of them. After elaboration every action reference
//! is resolved to an [`ActionKind`] with typed parameters, and the whole file
//! becomes an [`ActionPlan`].
//!
//! # Action codes
//!
//! The leading letter of an action reference selects its kind:
//!
//! | Letter | Kind                       |
//! |--------|----------------------------|
//! | `D`    | [`ActionKind::Delete`]     |
//! | `C`    | [`ActionKind::Copy`]       |
//! | `M`    | [`ActionKind::Move`]       |
//! | `S`    | [`ActionKind::Substitute`] |
//! | `A`    | [`ActionKind::Adjust`]     |
//! | `I`    | [`ActionKind::Isolate`]    |
//! | `L`    | [`ActionKind::SetClasses`] |
//! | `T`    | [`ActionKind::SetStyle`]   |

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::identifier::Id;

/// The kind of an action, as selected by the leading letter of its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCode {
    Delete,
    Copy,
    Move,
    Substitute,
    Adjust,
    Isolate,
    SetClasses,
    SetStyle,
}

impl ActionCode {
    /// All codes in letter-table order.
    pub const ALL: [ActionCode; 8] = [
        ActionCode::Delete,
        ActionCode::Copy,
        ActionCode::Move,
        ActionCode::Substitute,
        ActionCode::Adjust,
        ActionCode::Isolate,
        ActionCode::SetClasses,
        ActionCode::SetStyle,
    ];

    /// Looks up the code for a reference's leading letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.letter() == letter)
    }

    pub fn letter(self) -> char {
        match self {
            ActionCode::Delete => 'D',
            ActionCode::Copy => 'C',
            ActionCode::Move => 'M',
            ActionCode::Substitute => 'S',
            ActionCode::Adjust => 'A',
            ActionCode::Isolate => 'I',
            ActionCode::SetClasses => 'L',
            ActionCode::SetStyle => 'T',
        }
    }

    /// Whether the action needs an entry in the parameter table.
    pub fn takes_parameters(self) -> bool {
        self != ActionCode::Delete
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionCode::Delete => "delete",
            ActionCode::Copy => "copy",
            ActionCode::Move => "move",
            ActionCode::Substitute => "substitute",
            ActionCode::Adjust => "adjust",
            ActionCode::Isolate => "isolate",
            ActionCode::SetClasses => "set-classes",
            ActionCode::SetStyle => "set-style",
        };
        write!(f, "{name}")
    }
}

/// Where a copy is placed relative to its source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CopyParams {
    /// Shift the copy by `(dx, dy)`.
    Translate { dx: f64, dy: f64 },
    /// Scale the copy by `(sx, sy)` about the source's centre, then shift it
    /// by `(dx, dy)`.
    Scaled { dx: f64, dy: f64, sx: f64, sy: f64 },
}

/// The new value of an adjusted style property.
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustValue {
    Literal(String),
    /// Multiply the current numeric value; written as `*k` in the action file.
    Multiply(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Delete,
    Copy(CopyParams),
    Move { dx: f64, dy: f64 },
    Substitute { attribute: String, value: String },
    Adjust { property: String, value: AdjustValue },
    Isolate { classes: String },
    SetClasses { classes: String },
    SetStyle { property: String, value: String },
}

impl ActionKind {
    pub fn code(&self) -> ActionCode {
        match self {
            ActionKind::Delete => ActionCode::Delete,
            ActionKind::Copy(_) => ActionCode::Copy,
            ActionKind::Move { .. } => ActionCode::Move,
            ActionKind::Substitute { .. } => ActionCode::Substitute,
            ActionKind::Adjust { .. } => ActionCode::Adjust,
            ActionKind::Isolate { .. } => ActionCode::Isolate,
            ActionKind::SetClasses { .. } => ActionCode::SetClasses,
            ActionKind::SetStyle { .. } => ActionCode::SetStyle,
        }
    }
}

/// An elaborated action together with the reference it was declared under.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    reference: Id,
    kind: ActionKind,
}

impl Action {
    pub fn new(reference: Id, kind: ActionKind) -> Self {
        Self { reference, kind }
    }

    /// The action reference as written in the action file, e.g. `M12`.
    pub fn reference(&self) -> Id {
        self.reference
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)
    }
}

/// Actions for the elements of one card, keyed by element id in file order.
pub type CardActions = IndexMap<Id, Vec<Action>>;

/// Every card's actions, in file order.
///
/// # Examples
///
/// ```
/// # use deckstyle_core::{action::{Action, ActionKind, ActionPlan, CardActions}, identifier::Id};
/// let mut card = CardActions::new();
/// card.insert(Id::new("pip"), vec![Action::new(Id::new("D"), ActionKind::Delete)]);
///
/// let mut plan = ActionPlan::new();
/// plan.insert_card(Id::new("ace_club"), card);
///
/// assert_eq!(plan.action_count(), 1);
/// assert!(plan.card(Id::new("ace_club")).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionPlan {
    cards: IndexMap<Id, CardActions>,
}

impl ActionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a card's actions, merging with earlier entries for the same card.
    pub fn insert_card(&mut self, card: Id, actions: CardActions) {
        let entry = self.cards.entry(card).or_default();
        for (element, list) in actions {
            entry.entry(element).or_default().extend(list);
        }
    }

    pub fn card(&self, card: Id) -> Option<&CardActions> {
        self.cards.get(&card)
    }

    /// Iterates cards in file order.
    pub fn cards(&self) -> impl Iterator<Item = (Id, &CardActions)> {
        self.cards.iter().map(|(id, actions)| (*id, actions))
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Total number of actions across all cards.
    pub fn action_count(&self) -> usize {
        self.cards
            .values()
            .flat_map(|card| card.values())
            .map(Vec::len)
            .sum()
    }
}

/// What to do when an action's element is not (or no longer) under its card.
///
/// The names match external configuration strings (snake_case).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTargetPolicy {
    /// Skip the action silently.
    Ignore,
    /// Skip the action and log a warning (default)
    #[default]
    Warn,
    /// Abort the run.
    Error,
}

impl FromStr for MissingTargetPolicy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err("Unsupported missing target policy"),
        }
    }
}

impl From<MissingTargetPolicy> for &'static str {
    fn from(val: MissingTargetPolicy) -> Self {
        match val {
            MissingTargetPolicy::Ignore => "ignore",
            MissingTargetPolicy::Warn => "warn",
            MissingTargetPolicy::Error => "error",
        }
    }
}

impl fmt::Display for MissingTargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_code_letters_round_trip() {
        for code in ActionCode::ALL {
            assert_eq!(ActionCode::from_letter(code.letter()), Some(code));
        }
        assert_eq!(ActionCode::from_letter('X'), None);
        assert_eq!(ActionCode::from_letter('m'), None);
    }

    #[test]
    fn test_only_delete_takes_no_parameters() {
        let without: Vec<_> = ActionCode::ALL
            .into_iter()
            .filter(|code| !code.takes_parameters())
            .collect();
        assert_eq!(without, vec![ActionCode::Delete]);
    }

    #[test]
    fn test_kind_code() {
        let kind = ActionKind::Move { dx: 1.0, dy: 2.0 };
        assert_eq!(kind.code(), ActionCode::Move);
        assert_eq!(
            ActionKind::Copy(CopyParams::Translate { dx: 0.0, dy: 0.0 }).code(),
            ActionCode::Copy
        );
    }

    #[test]
    fn test_action_display_is_reference() {
        let action = Action::new(Id::new("M7"), ActionKind::Move { dx: 0.0, dy: 0.0 });
        assert_eq!(action.to_string(), "M7");
    }

    #[test]
    fn test_plan_merges_repeated_cards() {
        let mut plan = ActionPlan::new();

        let mut first = CardActions::new();
        first.insert(Id::new("a"), vec![Action::new(Id::new("D"), ActionKind::Delete)]);
        plan.insert_card(Id::new("card"), first);

        let mut second = CardActions::new();
        second.insert(
            Id::new("a"),
            vec![Action::new(
                Id::new("L1"),
                ActionKind::SetClasses {
                    classes: "x".to_string(),
                },
            )],
        );
        second.insert(Id::new("b"), vec![Action::new(Id::new("D"), ActionKind::Delete)]);
        plan.insert_card(Id::new("card"), second);

        let card = plan.card(Id::new("card")).unwrap();
        assert_eq!(card.len(), 2);
        assert_eq!(card[&Id::new("a")].len(), 2);
        assert_eq!(plan.action_count(), 3);
    }

    #[test]
    fn test_plan_preserves_card_order() {
        let mut plan = ActionPlan::new();
        for name in ["z", "a", "m"] {
            plan.insert_card(Id::new(name), CardActions::new());
        }
        let order: Vec<String> = plan.cards().map(|(id, _)| id.to_string()).collect();
        assert_eq!(order, ["z", "a", "m"]);
    }

    #[test]
    fn test_missing_target_policy() {
        assert_eq!(MissingTargetPolicy::default(), MissingTargetPolicy::Warn);
        assert_eq!("error".parse::<MissingTargetPolicy>(), Ok(MissingTargetPolicy::Error));
        assert!("loud".parse::<MissingTargetPolicy>().is_err());
        assert_eq!(MissingTargetPolicy::Ignore.to_string(), "ignore");
    }
}
