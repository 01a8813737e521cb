use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod amount;
pub mod auth;
pub mod dossier;
pub mod snapshot;
pub mod upload;

pub use amount::{parse_amount, Amount};
pub use auth::{LoginRequest, LoginResponse};
pub use dossier::{
    AmountGroup, Attachment, BudgetTotals, ChargeGroups, ChildrenCharges, Consents, Contact,
    Credit, CreditGroups, CreditKind, DeleteDossierResponse, Dossier, DossierDetail,
    DossierDocument, DossierListResponse, DossierSubmission, DossierSummary, HousingCharges,
    IncomeAmounts, Insurance, NestedCharges, NestedCredits, OtherCharges, StoredTotals,
    SubmitDossierResponse, Taxes,
};
pub use snapshot::{ReportSnapshot, SnapshotBudget, SnapshotCredit};
pub use upload::{FileUploadProgress, FileUploadStatus, UploadProgress};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ErrorResponse {
    pub error: String,
}
