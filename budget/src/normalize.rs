use crate::totals::{compute_totals, resolve_totals};
use shared_types::{ChargeGroups, CreditGroups, Dossier, DossierDetail, DossierDocument};

/// Turn a stored document, in either historical layout, into a complete
/// dossier. Missing sections become empty and missing totals are recomputed.
pub fn normalize(id: &str, doc: DossierDocument) -> DossierDetail {
    let nested_charges = doc.charges.unwrap_or_default();
    let charges = ChargeGroups {
        housing: doc
            .charges_housing
            .or(nested_charges.housing)
            .unwrap_or_default(),
        children: doc
            .charges_children
            .or(nested_charges.children)
            .unwrap_or_default(),
        other: doc
            .charges_other
            .or(nested_charges.other)
            .unwrap_or_default(),
    };

    let nested_credits = doc.credits.unwrap_or_default();
    let credits = CreditGroups {
        mortgage: doc
            .credits_mortgage
            .or(nested_credits.mortgage)
            .unwrap_or_default(),
        consumer: doc
            .credits_consumer
            .or(nested_credits.consumer)
            .unwrap_or_default(),
        other_debts: doc
            .other_debts
            .or(nested_credits.other_debts)
            .unwrap_or_default(),
    };

    let income = doc.income.unwrap_or_default();
    let insurance = doc.insurance.unwrap_or_default();
    let taxes = doc.taxes.unwrap_or_default();

    let computed = compute_totals(&income, &charges, &insurance, &taxes, &credits);
    let totals = resolve_totals(&doc.totals.unwrap_or_default(), &computed);

    DossierDetail {
        id: id.to_string(),
        dossier: Dossier {
            contact: doc.contact.unwrap_or_default(),
            consents: doc.consents.unwrap_or_default(),
            income,
            charges,
            insurance,
            taxes,
            credits,
            attachments: doc.attachments.unwrap_or_default(),
            created_at: doc.created_at.unwrap_or(0),
            totals,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Amount;

    fn parse(json: &str) -> DossierDocument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_nested_layout() {
        let doc = parse(
            r#"{
                "contact": { "last_name": "Petit" },
                "income": { "salaries": 1500 },
                "charges": { "housing": { "rent": 400 }, "other": { "transport": 50 } },
                "credits": { "consumer": [{ "creditor": "Oney", "monthly_payment": 100 }] },
                "created_at": 1700000000
            }"#,
        );
        let detail = normalize("d1", doc);
        let dossier = &detail.dossier;
        assert_eq!(detail.id, "d1");
        assert_eq!(dossier.contact.last_name, "Petit");
        assert_eq!(dossier.charges.housing.rent, Amount(400.0));
        assert_eq!(dossier.credits.consumer.len(), 1);
        assert_eq!(dossier.totals.total_income, 1500.0);
        assert_eq!(dossier.totals.total_expenses, 450.0);
        assert_eq!(dossier.totals.total_credits, 100.0);
        assert_eq!(dossier.totals.residual, 950.0);
        assert_eq!(dossier.created_at, 1_700_000_000);
    }

    #[test]
    fn test_flat_layout() {
        let doc = parse(
            r#"{
                "charges_housing": { "rent": 300 },
                "charges_children": { "schooling": 80 },
                "credits_mortgage": [{ "creditor": "BNP", "monthly_payment": "450" }],
                "other_debts": [{ "creditor": "Ami", "arrears": 200 }]
            }"#,
        );
        let dossier = normalize("d2", doc).dossier;
        assert_eq!(dossier.charges.housing.rent, Amount(300.0));
        assert_eq!(dossier.charges.children.schooling, Amount(80.0));
        assert_eq!(dossier.credits.mortgage[0].creditor, "BNP");
        assert_eq!(dossier.credits.other_debts.len(), 1);
        assert_eq!(dossier.totals.total_credits, 450.0);
        assert_eq!(dossier.totals.residual, -(380.0 + 450.0));
    }

    #[test]
    fn test_flat_wins_over_nested() {
        let doc = parse(
            r#"{
                "charges_housing": { "rent": 300 },
                "charges": { "housing": { "rent": 999 }, "children": { "schooling": 10 } }
            }"#,
        );
        let dossier = normalize("d3", doc).dossier;
        assert_eq!(dossier.charges.housing.rent, Amount(300.0));
        assert_eq!(dossier.charges.children.schooling, Amount(10.0));
    }

    #[test]
    fn test_stored_totals_are_kept() {
        let doc = parse(
            r#"{
                "income": { "salaries": 1000 },
                "totals": { "total_income": 1200, "total_expenses": 0, "total_credits": 0, "residual": 1200 }
            }"#,
        );
        let totals = normalize("d4", doc).dossier.totals;
        assert_eq!(totals.total_income, 1200.0);
        assert_eq!(totals.residual, 1200.0);
    }

    #[test]
    fn test_empty_document() {
        let dossier = normalize("d5", parse("{}")).dossier;
        assert!(dossier.attachments.is_empty());
        assert_eq!(dossier.totals.residual, 0.0);
        assert_eq!(dossier.contact.civility, "Monsieur");
    }
}
