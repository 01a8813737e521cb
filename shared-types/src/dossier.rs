use crate::amount::Amount;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A group of labelled monthly amounts (one form page section).
pub trait AmountGroup {
    /// Display label and value of every field, in form order.
    fn entries(&self) -> Vec<(&'static str, Amount)>;

    fn total(&self) -> Amount {
        self.entries().into_iter().map(|(_, amount)| amount).sum()
    }
}

/// Beneficiary identity and household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Contact {
    #[serde(alias = "civilite")]
    pub civility: String,
    #[serde(alias = "nom")]
    pub last_name: String,
    #[serde(alias = "prenom")]
    pub first_name: String,
    #[serde(alias = "adresse")]
    pub address: String,
    #[serde(alias = "cp")]
    pub postal_code: String,
    #[serde(alias = "ville")]
    pub city: String,
    #[serde(alias = "naissance")]
    pub birth_date: String,
    #[serde(alias = "lieuNaissance")]
    pub birth_place: String,
    #[serde(alias = "nationalite")]
    pub nationality: String,
    #[serde(alias = "tel")]
    pub phone: String,
    pub mobile: String,
    pub email: String,
    #[serde(alias = "metier")]
    pub occupation: String,

    // Spouse / partner
    #[serde(alias = "conjointNom")]
    pub spouse_name: String,
    #[serde(alias = "conjointNaissance")]
    pub spouse_birth_date: String,
    #[serde(alias = "conjointLieu")]
    pub spouse_birth_place: String,
    #[serde(alias = "conjointNationalite")]
    pub spouse_nationality: String,
    #[serde(alias = "conjointMetier")]
    pub spouse_occupation: String,

    #[serde(alias = "enfants")]
    pub children: String,
    #[serde(alias = "logement")]
    pub housing: String,
    #[serde(alias = "situationPro")]
    pub professional_situation: String,
    #[serde(alias = "situationFam")]
    pub family_situation: String,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            civility: "Monsieur".to_string(),
            last_name: String::new(),
            first_name: String::new(),
            address: String::new(),
            postal_code: String::new(),
            city: String::new(),
            birth_date: String::new(),
            birth_place: String::new(),
            nationality: String::new(),
            phone: String::new(),
            mobile: String::new(),
            email: String::new(),
            occupation: String::new(),
            spouse_name: String::new(),
            spouse_birth_date: String::new(),
            spouse_birth_place: String::new(),
            spouse_nationality: String::new(),
            spouse_occupation: String::new(),
            children: String::new(),
            housing: "Locataire".to_string(),
            professional_situation: "Employé(e)".to_string(),
            family_situation: "Célibataire".to_string(),
        }
    }
}

impl Contact {
    /// Mobile first, landline otherwise.
    pub fn best_phone(&self) -> Option<&str> {
        [self.mobile.as_str(), self.phone.as_str()]
            .into_iter()
            .find(|p| !p.trim().is_empty())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// GDPR consents given on the first form step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Consents {
    /// Processing of personal data for the support process. Mandatory.
    #[serde(alias = "traitement")]
    pub processing: bool,
    /// Progress may be shared with the referring organisation.
    #[serde(alias = "prescripteur")]
    pub referrer: bool,
    /// Data may be transferred to partner associations of the network.
    #[serde(alias = "transfertReseau")]
    pub network_transfer: bool,
    /// Free text: creditors the advisor is allowed to contact.
    #[serde(alias = "autorisationCommunication")]
    pub creditor_authorization: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct IncomeAmounts {
    #[serde(alias = "salaires")]
    pub salaries: Amount,
    #[serde(alias = "allocations")]
    pub allowances: Amount,
    #[serde(alias = "prestations")]
    pub benefits: Amount,
    #[serde(alias = "pensionAlimentaireRecue")]
    pub alimony_received: Amount,
    #[serde(alias = "aidesFamiliales")]
    pub family_support: Amount,
    #[serde(alias = "revenusLocatifs")]
    pub rental_income: Amount,
    #[serde(alias = "revenusAutres")]
    pub other_income: Amount,
}

impl AmountGroup for IncomeAmounts {
    fn entries(&self) -> Vec<(&'static str, Amount)> {
        vec![
            ("Salaires / Retraites", self.salaries),
            ("Allocations (chômage, RSA...)", self.allowances),
            ("Pensions / prestations familiales / bourses / aides", self.benefits),
            ("Pension alimentaire reçue", self.alimony_received),
            ("Aides familiales", self.family_support),
            ("Revenus locatifs", self.rental_income),
            ("Autres revenus", self.other_income),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct HousingCharges {
    #[serde(alias = "loyer")]
    pub rent: Amount,
    #[serde(alias = "chargesLocatives")]
    pub rental_charges: Amount,
    #[serde(alias = "energie")]
    pub energy: Amount,
    #[serde(alias = "fioulBois")]
    pub heating_fuel: Amount,
    #[serde(alias = "eau")]
    pub water: Amount,
    pub telecom: Amount,
}

impl AmountGroup for HousingCharges {
    fn entries(&self) -> Vec<(&'static str, Amount)> {
        vec![
            ("Loyer", self.rent),
            ("Charges locatives / copropriété", self.rental_charges),
            ("Gaz / Électricité", self.energy),
            ("Fioul / Bois", self.heating_fuel),
            ("Eau", self.water),
            ("Téléphone / Internet", self.telecom),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct ChildrenCharges {
    #[serde(alias = "scolarite")]
    pub schooling: Amount,
    #[serde(alias = "pensionAlimentaireVersee")]
    pub alimony_paid: Amount,
    #[serde(alias = "enfantsAutres")]
    pub other: Amount,
}

impl AmountGroup for ChildrenCharges {
    fn entries(&self) -> Vec<(&'static str, Amount)> {
        vec![
            ("Frais de scolarité / cantine / garde", self.schooling),
            ("Pension alimentaire versée", self.alimony_paid),
            ("Autres charges liées aux enfants", self.other),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct OtherCharges {
    #[serde(alias = "transports")]
    pub transport: Amount,
    #[serde(alias = "abonnements")]
    pub subscriptions: Amount,
    #[serde(alias = "fraisDivers")]
    pub miscellaneous: Amount,
    #[serde(alias = "autres")]
    pub other: Amount,
}

impl AmountGroup for OtherCharges {
    fn entries(&self) -> Vec<(&'static str, Amount)> {
        vec![
            ("Transports (essence, abonnements...)", self.transport),
            ("Abonnements divers", self.subscriptions),
            ("Frais divers (santé...)", self.miscellaneous),
            ("Autres charges", self.other),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Insurance {
    #[serde(alias = "habitation")]
    pub home: Amount,
    #[serde(alias = "auto")]
    pub car: Amount,
    #[serde(alias = "mutuelle")]
    pub health: Amount,
    #[serde(alias = "assurancesAutres")]
    pub other: Amount,
}

impl AmountGroup for Insurance {
    fn entries(&self) -> Vec<(&'static str, Amount)> {
        vec![
            ("Assurance habitation", self.home),
            ("Assurance voiture", self.car),
            ("Mutuelle", self.health),
            ("Autres assurances (prévoyance, PJ, obsèques...)", self.other),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Taxes {
    #[serde(alias = "impotRevenu")]
    pub income_tax: Amount,
    #[serde(alias = "taxeHabitation")]
    pub housing_tax: Amount,
    #[serde(alias = "taxeFonciere")]
    pub property_tax: Amount,
    #[serde(alias = "taxeOrdures")]
    pub waste_tax: Amount,
    #[serde(alias = "assainissement")]
    pub sanitation: Amount,
}

impl AmountGroup for Taxes {
    fn entries(&self) -> Vec<(&'static str, Amount)> {
        vec![
            ("Impôt sur le revenu", self.income_tax),
            ("Taxe d'habitation", self.housing_tax),
            ("Taxe foncière", self.property_tax),
            ("Taxe ordures ménagères", self.waste_tax),
            ("Assainissement", self.sanitation),
        ]
    }
}

/// Non-credit expenses, split the way the form pages split them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct ChargeGroups {
    pub housing: HousingCharges,
    pub children: ChildrenCharges,
    pub other: OtherCharges,
}

/// One loan or debt line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Credit {
    #[serde(alias = "etabl")]
    pub creditor: String,
    #[serde(alias = "mensualite")]
    pub monthly_payment: Amount,
    #[serde(alias = "capital")]
    pub remaining_principal: Amount,
    #[serde(alias = "impayes")]
    pub arrears: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
pub enum CreditKind {
    Mortgage,
    Consumer,
    OtherDebt,
}

impl CreditKind {
    pub fn label(&self) -> &'static str {
        match self {
            CreditKind::Mortgage => "Crédits immobiliers",
            CreditKind::Consumer => "Crédits à la consommation / renouvelables",
            CreditKind::OtherDebt => "Autres dettes (retards, découverts, charges, amis...)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct CreditGroups {
    pub mortgage: Vec<Credit>,
    pub consumer: Vec<Credit>,
    pub other_debts: Vec<Credit>,
}

impl CreditGroups {
    pub fn rows(&self, kind: CreditKind) -> &[Credit] {
        match kind {
            CreditKind::Mortgage => &self.mortgage,
            CreditKind::Consumer => &self.consumer,
            CreditKind::OtherDebt => &self.other_debts,
        }
    }

    pub fn rows_mut(&mut self, kind: CreditKind) -> &mut Vec<Credit> {
        match kind {
            CreditKind::Mortgage => &mut self.mortgage,
            CreditKind::Consumer => &mut self.consumer,
            CreditKind::OtherDebt => &mut self.other_debts,
        }
    }
}

/// Supporting document stored in the object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    pub path: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct BudgetTotals {
    pub total_income: f64,
    /// Expenses excluding credit repayments
    pub total_expenses: f64,
    pub total_credits: f64,
    /// "Reste pour vivre"
    pub residual: f64,
}

/// Totals as found in storage; older documents may miss some of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredTotals {
    #[serde(alias = "totalRevenus")]
    pub total_income: Option<f64>,
    #[serde(alias = "totalCharges")]
    pub total_expenses: Option<f64>,
    #[serde(alias = "totalCredits")]
    pub total_credits: Option<f64>,
    #[serde(alias = "reste")]
    pub residual: Option<f64>,
}

/// What the intake form posts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct DossierSubmission {
    pub contact: Contact,
    pub consents: Consents,
    pub income: IncomeAmounts,
    pub charges: ChargeGroups,
    pub insurance: Insurance,
    pub taxes: Taxes,
    pub credits: CreditGroups,
}

/// Composite document written once per submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Dossier {
    pub contact: Contact,
    pub consents: Consents,
    pub income: IncomeAmounts,
    pub charges: ChargeGroups,
    pub insurance: Insurance,
    pub taxes: Taxes,
    pub credits: CreditGroups,
    pub attachments: Vec<Attachment>,
    pub created_at: i64,
    pub totals: BudgetTotals,
}

/// Storage shape accepted on read.
///
/// Two layouts exist for charges and credits: flat top-level keys
/// (`charges_housing`, `credits_mortgage`, `other_debts`, ...) and nested
/// groups (`charges.housing`, `credits.mortgage`, ...). Flat keys win when
/// both are present. Documents written by the previous form use French keys
/// (`chargesMaison`, `credits.immo`, `revenus`, `files`, ...), accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DossierDocument {
    pub contact: Option<Contact>,
    pub consents: Option<Consents>,
    #[serde(alias = "revenus")]
    pub income: Option<IncomeAmounts>,

    pub charges: Option<NestedCharges>,
    #[serde(alias = "chargesMaison")]
    pub charges_housing: Option<HousingCharges>,
    #[serde(alias = "chargesEnfants")]
    pub charges_children: Option<ChildrenCharges>,
    #[serde(alias = "chargesAutres")]
    pub charges_other: Option<OtherCharges>,

    #[serde(alias = "assurances")]
    pub insurance: Option<Insurance>,
    #[serde(alias = "impots")]
    pub taxes: Option<Taxes>,

    pub credits: Option<NestedCredits>,
    #[serde(alias = "creditsImmo")]
    pub credits_mortgage: Option<Vec<Credit>>,
    #[serde(alias = "creditsConso")]
    pub credits_consumer: Option<Vec<Credit>>,
    #[serde(alias = "autresDettes")]
    pub other_debts: Option<Vec<Credit>>,

    #[serde(alias = "files")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(alias = "createdAt", deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<i64>,
    pub totals: Option<StoredTotals>,
}

/// Stored creation time: unix seconds, or a `{ seconds, nanoseconds }` object
/// as exported by the previous document database.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Seconds(i64),
    Fractional(f64),
    Object {
        #[serde(alias = "_seconds")]
        seconds: i64,
    },
    Other(serde::de::IgnoredAny),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(RawTimestamp::Seconds(seconds)) | Some(RawTimestamp::Object { seconds }) => {
            Some(seconds)
        }
        Some(RawTimestamp::Fractional(seconds)) if seconds.is_finite() => Some(seconds as i64),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NestedCharges {
    #[serde(alias = "maison")]
    pub housing: Option<HousingCharges>,
    #[serde(alias = "enfants")]
    pub children: Option<ChildrenCharges>,
    #[serde(alias = "autres")]
    pub other: Option<OtherCharges>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NestedCredits {
    #[serde(alias = "immo")]
    pub mortgage: Option<Vec<Credit>>,
    #[serde(alias = "conso")]
    pub consumer: Option<Vec<Credit>>,
    #[serde(alias = "autresDettes")]
    pub other_debts: Option<Vec<Credit>>,
}

/// Dashboard list row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DossierSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DossierListResponse {
    pub dossiers: Vec<DossierSummary>,
    pub total: usize,
}

/// Normalized dossier as shown on the advisor detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DossierDetail {
    pub id: String,
    #[serde(flatten)]
    pub dossier: Dossier,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SubmitDossierResponse {
    pub id: String,
    pub attachments: Vec<Attachment>,
    /// Files whose upload failed; the dossier was saved without them.
    pub failed_files: Vec<String>,
    /// Files refused before upload (over the size limit).
    pub rejected_files: Vec<String>,
    pub totals: BudgetTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DeleteDossierResponse {
    pub id: String,
    pub deleted_attachments: usize,
    pub failed_attachments: Vec<String>,
}
