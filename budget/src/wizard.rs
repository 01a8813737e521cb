use crate::totals::submission_totals;
use shared_types::{BudgetTotals, Credit, CreditKind, DossierSubmission};
use thiserror::Error;

/// Largest accepted supporting document (10 MiB)
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error("the data processing consent must be accepted before continuing")]
    ConsentRequired,
    #[error("no {kind:?} row at index {index}")]
    NoSuchRow { kind: CreditKind, index: usize },
    #[error("file \"{name}\" is larger than {limit} bytes")]
    AttachmentTooLarge { name: String, limit: u64 },
    #[error("file name must not be empty")]
    EmptyFileName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Consents,
    Contact,
    Income,
    HousingCharges,
    FamilyAndOtherCharges,
    InsuranceAndTaxes,
    Debts,
    Attachments,
}

impl WizardStep {
    pub const ALL: [WizardStep; 8] = [
        WizardStep::Consents,
        WizardStep::Contact,
        WizardStep::Income,
        WizardStep::HousingCharges,
        WizardStep::FamilyAndOtherCharges,
        WizardStep::InsuranceAndTaxes,
        WizardStep::Debts,
        WizardStep::Attachments,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Consents => "Consentements",
            WizardStep::Contact => "Fiche contact",
            WizardStep::Income => "Revenus",
            WizardStep::HousingCharges => "Charges du logement",
            WizardStep::FamilyAndOtherCharges => "Enfants et autres charges",
            WizardStep::InsuranceAndTaxes => "Assurances et impôts",
            WizardStep::Debts => "Crédits et dettes",
            WizardStep::Attachments => "Justificatifs et récapitulatif",
        }
    }
}

/// File picked on the last step, not uploaded yet
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAttachment {
    pub name: String,
    pub size: u64,
}

/// Stepped form state: the draft dossier plus the current page.
#[derive(Debug, Clone)]
pub struct FormWizard {
    step: WizardStep,
    draft: DossierSubmission,
    attachments: Vec<PendingAttachment>,
}

impl Default for FormWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl FormWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Consents,
            draft: DossierSubmission::default(),
            attachments: Vec::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// (current step, 1-based; number of steps)
    pub fn progress(&self) -> (usize, usize) {
        (self.step.index() + 1, WizardStep::ALL.len())
    }

    pub fn draft(&self) -> &DossierSubmission {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut DossierSubmission {
        &mut self.draft
    }

    pub fn attachments(&self) -> &[PendingAttachment] {
        &self.attachments
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == WizardStep::Consents && !self.draft.consents.processing {
            return Err(WizardError::ConsentRequired);
        }
        let idx = (self.step.index() + 1).min(WizardStep::ALL.len() - 1);
        self.step = WizardStep::ALL[idx];
        Ok(self.step)
    }

    pub fn prev(&mut self) -> WizardStep {
        let idx = self.step.index().saturating_sub(1);
        self.step = WizardStep::ALL[idx];
        self.step
    }

    /// Running totals of the draft
    pub fn totals(&self) -> BudgetTotals {
        submission_totals(&self.draft)
    }

    pub fn add_credit(&mut self, kind: CreditKind) -> usize {
        let rows = self.draft.credits.rows_mut(kind);
        rows.push(Credit::default());
        rows.len() - 1
    }

    pub fn remove_credit(&mut self, kind: CreditKind, index: usize) -> Result<Credit, WizardError> {
        let rows = self.draft.credits.rows_mut(kind);
        if index >= rows.len() {
            return Err(WizardError::NoSuchRow { kind, index });
        }
        Ok(rows.remove(index))
    }

    pub fn attach(&mut self, name: &str, size: u64) -> Result<(), WizardError> {
        if name.trim().is_empty() {
            return Err(WizardError::EmptyFileName);
        }
        if size > MAX_ATTACHMENT_BYTES {
            return Err(WizardError::AttachmentTooLarge {
                name: name.to_string(),
                limit: MAX_ATTACHMENT_BYTES,
            });
        }
        self.attachments.push(PendingAttachment {
            name: name.to_string(),
            size,
        });
        Ok(())
    }

    pub fn detach(&mut self, index: usize) -> Option<PendingAttachment> {
        if index < self.attachments.len() {
            Some(self.attachments.remove(index))
        } else {
            None
        }
    }

    /// Hand the draft over for submission.
    pub fn into_submission(self) -> Result<(DossierSubmission, Vec<PendingAttachment>), WizardError> {
        validate_submission(&self.draft)?;
        Ok((self.draft, self.attachments))
    }
}

/// Server-side check of a posted form
pub fn validate_submission(submission: &DossierSubmission) -> Result<(), WizardError> {
    if !submission.consents.processing {
        return Err(WizardError::ConsentRequired);
    }
    Ok(())
}
