//! Deckstyle Core Types and Definitions
//!
//! This crate provides the foundational types shared by the deckstyle parser,
//! the document engine and the CLI. It includes:
//!
//! - **Identifiers**: Efficient string-interned element ids ([`identifier::Id`])
//! - **Geometry**: Points, sizes and axis-aligned extremes ([`geometry`] module)
//! - **Transforms**: The three accepted `transform` forms and the affine composer ([`transform`] module)
//! - **Paths**: Typed path commands and the cursor walk that bounds them ([`path`] module)
//! - **Style**: Ordered `key:value` style declarations ([`style::Style`])
//! - **Actions**: The typed edit-action model ([`action`] module)
//! - **Formatting**: Number formatting used for emitted attributes ([`format`] module)

pub mod action;
pub mod format;
pub mod geometry;
pub mod identifier;
pub mod path;
pub mod style;
pub mod transform;
