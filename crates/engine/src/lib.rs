//! Dashboard data quality evaluation.
//!
//! This crate provides:
//! - `Engine`: runs the rule engine and anomaly detector over every metric
//!   of a dashboard (in parallel) and scores the result
//! - `Annotator` trait for optional issue explanations, with a template
//!   default and an OpenAI-compatible LLM implementation
//! - `ReportBuilder` / `Report`: the finalized per-dashboard bundle

pub mod annotate;
pub mod engine;
pub mod report;

pub use annotate::{AnnotateError, Annotator, LlmAnnotator, TemplateAnnotator};
pub use engine::{DashboardFailure, Engine, EvaluationError, RunOutcome};
pub use report::{Evaluation, NoteLevel, Report, ReportBuilder, ReportIssue, ReportNote};
