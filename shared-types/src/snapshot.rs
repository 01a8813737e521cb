//! JSON snapshot accepted by the fixed-template PDF endpoint.
//!
//! Keys keep the French camelCase spelling of the form export.

use crate::amount::Amount;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of consumer credit slots in the template
pub const SNAPSHOT_CONSUMER_CREDITS: usize = 3;
/// Number of mortgage slots in the template
pub const SNAPSHOT_MORTGAGE_CREDITS: usize = 2;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSnapshot {
    pub identity: SnapshotIdentity,
    pub situation: SnapshotSituation,
    pub budget: SnapshotBudget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotIdentity {
    pub nom: String,
    pub prenom: String,
    pub civilite: String,
    pub date_naissance: String,
    pub telephone: String,
    pub email: String,
    pub adresse: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSituation {
    pub profession: String,
    pub familiale: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotBudget {
    pub salaires: Amount,
    pub allocations: Amount,
    pub pensions: Amount,
    pub autres_revenus: Amount,
    pub loyer: Amount,
    pub energie: Amount,
    pub telecom: Amount,
    pub alimentation: Amount,
    pub sante: Amount,
    pub autres_charges: Amount,

    /// Indexed credit slots (`creditConsoNom0`, `creditImmoMens1`, ...)
    #[serde(flatten)]
    pub slots: HashMap<String, serde_json::Value>,
}

/// One filled credit slot of the snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotCredit {
    pub creditor: String,
    pub monthly_payment: Amount,
    pub remaining_principal: Amount,
}

impl SnapshotBudget {
    pub fn consumer_credit(&self, index: usize) -> Option<SnapshotCredit> {
        self.credit_slot("creditConso", index)
    }

    pub fn mortgage_credit(&self, index: usize) -> Option<SnapshotCredit> {
        self.credit_slot("creditImmo", index)
    }

    fn credit_slot(&self, prefix: &str, index: usize) -> Option<SnapshotCredit> {
        let creditor = match self.slots.get(&format!("{prefix}Nom{index}")) {
            Some(serde_json::Value::String(name)) if !name.trim().is_empty() => name.clone(),
            _ => return None,
        };
        Some(SnapshotCredit {
            creditor,
            monthly_payment: self.slot_amount(&format!("{prefix}Mens{index}")),
            remaining_principal: self.slot_amount(&format!("{prefix}CRD{index}")),
        })
    }

    fn slot_amount(&self, key: &str) -> Amount {
        self.slots
            .get(key)
            .and_then(|v| serde_json::from_value::<Amount>(v.clone()).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reads_credit_slots() {
        let json = r#"{
            "identity": { "nom": "Durand", "dateNaissance": "1980-02-01" },
            "budget": {
                "salaires": "1800",
                "creditConsoNom0": "Sofinco",
                "creditConsoMens0": "95,5",
                "creditConsoCRD0": 2300,
                "creditConsoNom1": "",
                "creditImmoNom1": "Crédit Agricole",
                "creditImmoMens1": 640
            }
        }"#;
        let snapshot: ReportSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.identity.nom, "Durand");
        assert_eq!(snapshot.identity.date_naissance, "1980-02-01");
        assert_eq!(snapshot.budget.salaires, Amount(1800.0));

        let conso = snapshot.budget.consumer_credit(0).unwrap();
        assert_eq!(conso.creditor, "Sofinco");
        assert_eq!(conso.monthly_payment, Amount(95.5));
        assert_eq!(conso.remaining_principal, Amount(2300.0));

        assert!(snapshot.budget.consumer_credit(1).is_none());
        assert!(snapshot.budget.mortgage_credit(0).is_none());

        let immo = snapshot.budget.mortgage_credit(1).unwrap();
        assert_eq!(immo.monthly_payment, Amount(640.0));
        assert_eq!(immo.remaining_principal, Amount::ZERO);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot: ReportSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.identity.nom.is_empty());
        assert_eq!(snapshot.budget.loyer, Amount::ZERO);
    }
}
