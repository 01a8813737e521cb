//! Budget crate
//!
//! Domain logic of the dossier intake: totals, normalization of stored
//! documents, name filtering for the advisor dashboard, the form wizard
//! state machine and the layout of PDF reports.
//!
//! Types live in `shared-types`; nothing here does I/O.

pub mod filter;
pub mod format;
pub mod normalize;
pub mod report;
pub mod totals;
pub mod wizard;

pub use filter::{filter_summaries, matches_name};
pub use format::format_euros;
pub use normalize::normalize;
pub use report::{dossier_report, snapshot_report, Report, ReportLine, ReportSection};
pub use totals::{compute_totals, resolve_totals, submission_totals};
pub use wizard::{validate_submission, FormWizard, WizardError, WizardStep, MAX_ATTACHMENT_BYTES};
