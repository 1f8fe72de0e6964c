//! sds-console: terminal client for a remote chemistry-data service.
//!
//! Submits a SMILES string for validation and Safety Data Sheet generation,
//! renders the returned loosely-typed report as collapsible sections, and
//! exports it as a DOCX or JSON payload. All domain computation lives in the
//! backend; this crate is orchestration and rendering.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod legacy;
pub mod render;
pub mod report;
pub mod sections;
pub mod ui;

pub use error::{Result, SdsConsoleError};
