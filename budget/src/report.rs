//! Page-independent layout of the PDF reports.
//!
//! The API crate turns a [`Report`] into PDF pages; keeping the content here
//! lets it be tested without a renderer.

use crate::format::{format_date, format_euros};
use shared_types::snapshot::{SNAPSHOT_CONSUMER_CREDITS, SNAPSHOT_MORTGAGE_CREDITS};
use shared_types::{AmountGroup, Credit, CreditKind, DossierDetail, ReportSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum ReportLine {
    Text(String),
    Subheading(String),
    Field { label: String, value: String },
    Bullet(String),
    Blank,
}

impl ReportLine {
    fn field(label: &str, value: impl Into<String>) -> Self {
        ReportLine::Field {
            label: label.to_string(),
            value: value.into(),
        }
    }

    /// Single-line rendering used by the PDF writer
    pub fn render(&self) -> String {
        match self {
            ReportLine::Text(text) | ReportLine::Subheading(text) => text.clone(),
            ReportLine::Field { label, value } => format!("{label} : {value}"),
            ReportLine::Bullet(text) => format!("- {text}"),
            ReportLine::Blank => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub heading: String,
    pub lines: Vec<ReportLine>,
}

impl ReportSection {
    fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: ReportLine) {
        self.lines.push(line);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub subtitle: Option<String>,
    pub sections: Vec<ReportSection>,
    pub footer: String,
}

impl Report {
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len() + 1).sum()
    }
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Oui"
    } else {
        "Non"
    }
}

fn push_group(section: &mut ReportSection, group: &dyn AmountGroup) {
    for (label, amount) in group.entries() {
        section.push(ReportLine::field(label, format_euros(amount.value())));
    }
    section.push(ReportLine::field(
        "Sous-total",
        format_euros(group.total().value()),
    ));
}

fn push_credits(section: &mut ReportSection, kind: CreditKind, rows: &[Credit]) {
    section.push(ReportLine::Subheading(kind.label().to_string()));
    if rows.is_empty() {
        section.push(ReportLine::Text("Aucun".to_string()));
        return;
    }
    for credit in rows {
        section.push(ReportLine::Bullet(format!(
            "{} : mensualité {}, capital restant dû {}, impayés {}",
            or_dash(&credit.creditor),
            format_euros(credit.monthly_payment.value()),
            format_euros(credit.remaining_principal.value()),
            format_euros(credit.arrears.value()),
        )));
    }
}

/// Full budget breakdown of a stored dossier
pub fn dossier_report(detail: &DossierDetail) -> Report {
    let dossier = &detail.dossier;
    let contact = &dossier.contact;

    let mut identity = ReportSection::new("1. Identité du bénéficiaire");
    identity.push(ReportLine::field("Civilité", or_dash(&contact.civility)));
    identity.push(ReportLine::field("Nom", or_dash(&contact.last_name)));
    identity.push(ReportLine::field("Prénom", or_dash(&contact.first_name)));
    identity.push(ReportLine::field("Date de naissance", or_dash(&contact.birth_date)));
    identity.push(ReportLine::field("Lieu de naissance", or_dash(&contact.birth_place)));
    identity.push(ReportLine::field("Nationalité", or_dash(&contact.nationality)));
    identity.push(ReportLine::field(
        "Téléphone",
        or_dash(contact.best_phone().unwrap_or_default()),
    ));
    identity.push(ReportLine::field("Email", or_dash(&contact.email)));
    identity.push(ReportLine::field(
        "Adresse",
        or_dash(
            format!("{} {} {}", contact.address, contact.postal_code, contact.city).trim(),
        ),
    ));
    identity.push(ReportLine::field("Métier", or_dash(&contact.occupation)));
    identity.push(ReportLine::field("Situation familiale", or_dash(&contact.family_situation)));
    identity.push(ReportLine::field(
        "Situation professionnelle",
        or_dash(&contact.professional_situation),
    ));
    identity.push(ReportLine::field("Logement", or_dash(&contact.housing)));
    identity.push(ReportLine::field("Enfants à charge", or_dash(&contact.children)));
    if !contact.spouse_name.trim().is_empty() {
        identity.push(ReportLine::Subheading("Conjoint".to_string()));
        identity.push(ReportLine::field("Nom", contact.spouse_name.clone()));
        identity.push(ReportLine::field("Date de naissance", or_dash(&contact.spouse_birth_date)));
        identity.push(ReportLine::field("Lieu de naissance", or_dash(&contact.spouse_birth_place)));
        identity.push(ReportLine::field("Nationalité", or_dash(&contact.spouse_nationality)));
        identity.push(ReportLine::field("Métier", or_dash(&contact.spouse_occupation)));
    }

    let consents = &dossier.consents;
    let mut consent_section = ReportSection::new("2. Consentements");
    consent_section.push(ReportLine::field(
        "Traitement des données",
        yes_no(consents.processing),
    ));
    consent_section.push(ReportLine::field(
        "Information du prescripteur",
        yes_no(consents.referrer),
    ));
    consent_section.push(ReportLine::field(
        "Transfert au réseau",
        yes_no(consents.network_transfer),
    ));
    consent_section.push(ReportLine::field(
        "Autorisation de communiquer",
        or_dash(&consents.creditor_authorization),
    ));

    let mut income = ReportSection::new("3. Revenus mensuels");
    push_group(&mut income, &dossier.income);

    let mut charges = ReportSection::new("4. Charges mensuelles");
    charges.push(ReportLine::Subheading("4.1 Logement".to_string()));
    push_group(&mut charges, &dossier.charges.housing);
    charges.push(ReportLine::Subheading("4.2 Enfants".to_string()));
    push_group(&mut charges, &dossier.charges.children);
    charges.push(ReportLine::Subheading("4.3 Autres charges".to_string()));
    push_group(&mut charges, &dossier.charges.other);

    let mut insurance_taxes = ReportSection::new("5. Assurances et impôts");
    insurance_taxes.push(ReportLine::Subheading("5.1 Assurances".to_string()));
    push_group(&mut insurance_taxes, &dossier.insurance);
    insurance_taxes.push(ReportLine::Subheading("5.2 Impôts et taxes".to_string()));
    push_group(&mut insurance_taxes, &dossier.taxes);

    let mut debts = ReportSection::new("6. Crédits et dettes");
    for kind in [CreditKind::Mortgage, CreditKind::Consumer, CreditKind::OtherDebt] {
        push_credits(&mut debts, kind, dossier.credits.rows(kind));
    }

    let mut attachments = ReportSection::new("7. Justificatifs");
    if dossier.attachments.is_empty() {
        attachments.push(ReportLine::Text("Aucun justificatif".to_string()));
    }
    for attachment in &dossier.attachments {
        attachments.push(ReportLine::Bullet(attachment.name.clone()));
    }

    let totals = &dossier.totals;
    let mut summary = ReportSection::new("8. Synthèse");
    summary.push(ReportLine::field("Revenus", format_euros(totals.total_income)));
    summary.push(ReportLine::field(
        "Charges hors crédits",
        format_euros(totals.total_expenses),
    ));
    summary.push(ReportLine::field(
        "Mensualités crédits",
        format_euros(totals.total_credits),
    ));
    summary.push(ReportLine::field("Reste pour vivre", format_euros(totals.residual)));

    Report {
        title: "DOSSIER CRÉSUS".to_string(),
        subtitle: Some(format!(
            "{} - envoyé le {}",
            or_dash(&contact.full_name()),
            format_date(dossier.created_at)
        )),
        sections: vec![
            identity,
            consent_section,
            income,
            charges,
            insurance_taxes,
            debts,
            attachments,
            summary,
        ],
        footer: format!("Dossier {}", detail.id),
    }
}

/// Fixed template used for JSON snapshots
pub fn snapshot_report(snapshot: &ReportSnapshot) -> Report {
    let identity = &snapshot.identity;
    let mut identity_section = ReportSection::new("1. Identité et coordonnées");
    identity_section.push(ReportLine::field("Nom", identity.nom.clone()));
    identity_section.push(ReportLine::field("Prénom", identity.prenom.clone()));
    identity_section.push(ReportLine::field("Civilité", identity.civilite.clone()));
    identity_section.push(ReportLine::field("Date de naissance", identity.date_naissance.clone()));
    identity_section.push(ReportLine::field("Téléphone", identity.telephone.clone()));
    identity_section.push(ReportLine::field("Email", identity.email.clone()));
    identity_section.push(ReportLine::field("Adresse", identity.adresse.clone()));

    let mut situation = ReportSection::new("2. Situation familiale et professionnelle");
    situation.push(ReportLine::field("Profession", snapshot.situation.profession.clone()));
    situation.push(ReportLine::field(
        "Situation familiale",
        snapshot.situation.familiale.clone(),
    ));

    let b = &snapshot.budget;
    let mut budget = ReportSection::new("3. Budget mensuel");
    budget.push(ReportLine::Subheading("Revenus mensuels".to_string()));
    budget.push(ReportLine::field("Salaires", format_euros(b.salaires.value())));
    budget.push(ReportLine::field("Allocations", format_euros(b.allocations.value())));
    budget.push(ReportLine::field("Pensions", format_euros(b.pensions.value())));
    budget.push(ReportLine::field("Autres revenus", format_euros(b.autres_revenus.value())));
    budget.push(ReportLine::Blank);

    budget.push(ReportLine::Subheading("Charges mensuelles".to_string()));
    budget.push(ReportLine::field("Loyer / Crédit immo", format_euros(b.loyer.value())));
    budget.push(ReportLine::field("Énergie", format_euros(b.energie.value())));
    budget.push(ReportLine::field("Télécom", format_euros(b.telecom.value())));
    budget.push(ReportLine::field("Alimentation", format_euros(b.alimentation.value())));
    budget.push(ReportLine::field("Santé", format_euros(b.sante.value())));
    budget.push(ReportLine::field("Autres charges", format_euros(b.autres_charges.value())));
    budget.push(ReportLine::Blank);

    budget.push(ReportLine::Subheading("Crédits à la consommation".to_string()));
    for credit in (0..SNAPSHOT_CONSUMER_CREDITS).filter_map(|i| b.consumer_credit(i)) {
        budget.push(ReportLine::Bullet(format!(
            "{} : {}/mois, CRD : {}",
            credit.creditor,
            format_euros(credit.monthly_payment.value()),
            format_euros(credit.remaining_principal.value()),
        )));
    }
    budget.push(ReportLine::Blank);

    budget.push(ReportLine::Subheading("Crédits immobiliers".to_string()));
    for credit in (0..SNAPSHOT_MORTGAGE_CREDITS).filter_map(|i| b.mortgage_credit(i)) {
        budget.push(ReportLine::Bullet(format!(
            "{} : {}/mois, CRD : {}",
            credit.creditor,
            format_euros(credit.monthly_payment.value()),
            format_euros(credit.remaining_principal.value()),
        )));
    }

    Report {
        title: "DOSSIER CRÉSUS".to_string(),
        subtitle: None,
        sections: vec![identity_section, situation, budget],
        footer: "Document généré automatiquement - CRÉSUS".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn detail(json: &str) -> DossierDetail {
        normalize("abc", serde_json::from_str(json).unwrap())
    }

    fn all_lines(report: &Report) -> Vec<String> {
        report
            .sections
            .iter()
            .flat_map(|s| s.lines.iter().map(|l| l.render()))
            .collect()
    }

    #[test]
    fn test_dossier_report_sections() {
        let report = dossier_report(&detail(
            r#"{
                "contact": { "first_name": "Léa", "last_name": "Martin", "mobile": "0600000000" },
                "consents": { "processing": true },
                "income": { "salaries": 1500 },
                "credits": { "consumer": [{ "creditor": "Cetelem", "monthly_payment": 120.5 }] },
                "attachments": [{ "name": "avis.pdf", "url": "u", "path": "p" }]
            }"#,
        ));
        assert_eq!(report.sections.len(), 8);
        assert_eq!(report.footer, "Dossier abc");

        let lines = all_lines(&report);
        assert!(lines.contains(&"Téléphone : 0600000000".to_string()));
        assert!(lines.contains(&"Traitement des données : Oui".to_string()));
        assert!(lines.contains(&"Salaires / Retraites : 1 500,00 EUR".to_string()));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("- Cetelem : mensualité 120,50 EUR")));
        assert!(lines.contains(&"- avis.pdf".to_string()));
        assert!(lines.contains(&"Reste pour vivre : 1 379,50 EUR".to_string()));
    }

    #[test]
    fn test_dossier_report_without_spouse_or_files() {
        let report = dossier_report(&detail("{}"));
        let lines = all_lines(&report);
        assert!(!lines.contains(&"Conjoint".to_string()));
        assert!(lines.contains(&"Aucun justificatif".to_string()));
        assert_eq!(lines.iter().filter(|l| *l == "Aucun").count(), 3);
    }

    #[test]
    fn test_snapshot_report_template() {
        let snapshot: ReportSnapshot = serde_json::from_str(
            r#"{
                "identity": { "nom": "Durand", "prenom": "Paul" },
                "situation": { "profession": "Cariste" },
                "budget": {
                    "salaires": 1700,
                    "loyer": "550",
                    "creditConsoNom0": "Sofinco",
                    "creditConsoMens0": 80,
                    "creditConsoNom2": "Floa",
                    "creditImmoNom0": ""
                }
            }"#,
        )
        .unwrap();
        let report = snapshot_report(&snapshot);
        assert_eq!(report.sections.len(), 3);
        assert!(report.footer.starts_with("Document généré automatiquement"));

        let lines = all_lines(&report);
        assert!(lines.contains(&"Nom : Durand".to_string()));
        assert!(lines.contains(&"Profession : Cariste".to_string()));
        assert!(lines.contains(&"Loyer / Crédit immo : 550,00 EUR".to_string()));
        let bullets: Vec<_> = lines.iter().filter(|l| l.starts_with("- ")).collect();
        assert_eq!(bullets.len(), 2);
        assert_eq!(bullets[0], "- Sofinco : 80,00 EUR/mois, CRD : 0,00 EUR");
    }
}
