//! Deckstyle - position-preserving edits of SVG card artwork.
//!
//! An action file lists, per card, which child elements to delete, copy,
//! move, restyle or flatten out of `use` references. The engine applies those
//! edits to a sheet of card artwork while keeping every untouched element,
//! and every moved element's intended offset, where it was to within `1e-3`.

pub mod config;
pub mod document;
pub mod interpret;
pub mod resolve;

mod error;

pub use deckstyle_core::{action, geometry, identifier, style, transform};

pub use error::DeckstyleError;
pub use interpret::EditReport;

use log::{debug, info, trace};

use deckstyle_core::action::ActionPlan;

use config::AppConfig;
use document::Document;

/// Builder for parsing action files and applying them to artwork.
///
/// # Examples
///
/// ```rust
/// use deckstyle::{StyleConverter, config::AppConfig};
///
/// let actions = r#"{ "ace": { "pip": ["M1"] }, "M1": [5, -3] }"#;
/// let svg = r#"<svg><g id="ace"><path id="pip" d="M10,20 h4 v4"/></g></svg>"#;
///
/// let converter = StyleConverter::new(AppConfig::default());
/// let plan = converter.parse_actions(actions).expect("Failed to parse actions");
/// let output = converter.convert(&plan, svg).expect("Failed to convert");
///
/// assert!(output.contains(r#"transform="translate(5.0000,-3.0000)""#));
///
/// // Or use default config
/// let converter = StyleConverter::default();
/// ```
#[derive(Default)]
pub struct StyleConverter {
    config: AppConfig,
}

impl StyleConverter {
    /// Create a new converter with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse an action file into a typed plan.
    ///
    /// # Arguments
    ///
    /// * `source` - Action file text (JSON)
    ///
    /// # Errors
    ///
    /// Returns [`DeckstyleError::Json`] for invalid JSON and
    /// [`DeckstyleError::Actions`] with every elaboration diagnostic for
    /// unknown action codes, wrong arities and bad parameters.
    pub fn parse_actions(&self, source: &str) -> Result<ActionPlan, DeckstyleError> {
        info!("Parsing action file");

        let value: serde_json::Value = serde_json::from_str(source)?;
        let plan = deckstyle_parser::elaborate_actions(&value, source)
            .map_err(|err| DeckstyleError::new_actions_error(err, source))?;

        debug!(cards = plan.cards().count(), actions = plan.action_count(); "Action file parsed");
        trace!(plan:?; "Parsed plan");
        Ok(plan)
    }

    /// Apply a plan to an SVG document and return the edited document.
    ///
    /// The input is parsed twice: one copy is edited, the other stays
    /// untouched as the positional reference.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while parsing the document, resolving
    /// positions or applying actions.
    pub fn convert(&self, plan: &ActionPlan, svg: &str) -> Result<String, DeckstyleError> {
        let (output, _) = self.convert_with_report(plan, svg)?;
        Ok(output)
    }

    /// Like [`convert`](Self::convert), also returning what the run did.
    pub fn convert_with_report(
        &self,
        plan: &ActionPlan,
        svg: &str,
    ) -> Result<(String, EditReport), DeckstyleError> {
        info!("Loading document");
        let mut working = Document::parse(svg)?;
        let pristine = Document::parse(svg)?;

        info!(cards = plan.cards().count(); "Applying actions");
        let report = interpret::apply(&mut working, &pristine, plan, self.config.edit())?;
        info!(
            applied = report.applied(),
            copies = report.copies(),
            skipped = report.skipped();
            "Actions applied"
        );

        let output = working.to_xml()?;
        debug!(bytes = output.len(); "Document serialized");
        Ok((output, report))
    }
}
