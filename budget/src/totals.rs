use shared_types::{
    AmountGroup, BudgetTotals, ChargeGroups, Credit, CreditGroups, DossierSubmission,
    IncomeAmounts, Insurance, StoredTotals, Taxes,
};

/// Monthly totals of a budget.
///
/// Only mortgage and consumer credits count as monthly credit payments;
/// other debts are listed for the advisor but stay out of the residual.
pub fn compute_totals(
    income: &IncomeAmounts,
    charges: &ChargeGroups,
    insurance: &Insurance,
    taxes: &Taxes,
    credits: &CreditGroups,
) -> BudgetTotals {
    let total_income = income.total().value();
    let total_expenses = (charges.housing.total()
        + charges.children.total()
        + charges.other.total()
        + insurance.total()
        + taxes.total())
    .value();
    let total_credits = monthly_payments(&credits.mortgage) + monthly_payments(&credits.consumer);

    BudgetTotals {
        total_income,
        total_expenses,
        total_credits,
        residual: total_income - (total_expenses + total_credits),
    }
}

pub fn submission_totals(submission: &DossierSubmission) -> BudgetTotals {
    compute_totals(
        &submission.income,
        &submission.charges,
        &submission.insurance,
        &submission.taxes,
        &submission.credits,
    )
}

/// Use stored totals where present, recomputed values otherwise.
pub fn resolve_totals(stored: &StoredTotals, computed: &BudgetTotals) -> BudgetTotals {
    let total_income = stored.total_income.unwrap_or(computed.total_income);
    let total_expenses = stored.total_expenses.unwrap_or(computed.total_expenses);
    let total_credits = stored.total_credits.unwrap_or(computed.total_credits);
    let residual = stored
        .residual
        .unwrap_or(total_income - (total_expenses + total_credits));

    BudgetTotals {
        total_income,
        total_expenses,
        total_credits,
        residual,
    }
}

fn monthly_payments(rows: &[Credit]) -> f64 {
    rows.iter().map(|c| c.monthly_payment.value()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Amount, ChildrenCharges, HousingCharges, OtherCharges};

    fn credit(payment: &str) -> Credit {
        Credit {
            creditor: "Banque".to_string(),
            monthly_payment: Amount::from(payment),
            ..Credit::default()
        }
    }

    fn sample() -> DossierSubmission {
        let mut s = DossierSubmission::default();
        s.income = IncomeAmounts {
            salaries: Amount::from("1000"),
            allowances: Amount::from("500"),
            rental_income: Amount::from("250"),
            other_income: Amount::from("250"),
            ..IncomeAmounts::default()
        };
        s.charges = ChargeGroups {
            housing: HousingCharges {
                rent: Amount(600.0),
                rental_charges: Amount(100.0),
                energy: Amount(100.0),
                heating_fuel: Amount(0.0),
                water: Amount(30.0),
                telecom: Amount(20.0),
            },
            children: ChildrenCharges::default(),
            other: OtherCharges {
                transport: Amount(150.0),
                subscriptions: Amount(50.0),
                miscellaneous: Amount(50.0),
                other: Amount(20.0),
            },
        };
        s.insurance = Insurance {
            home: Amount(20.0),
            car: Amount(40.0),
            health: Amount(60.0),
            other: Amount::ZERO,
        };
        s.taxes = Taxes {
            income_tax: Amount(50.0),
            waste_tax: Amount(5.0),
            ..Taxes::default()
        };
        s.credits.mortgage = vec![credit("200")];
        s.credits.consumer = vec![credit("100")];
        s
    }

    #[test]
    fn test_income_total() {
        let totals = submission_totals(&sample());
        assert_eq!(totals.total_income, 2000.0);
    }

    #[test]
    fn test_residual() {
        let totals = submission_totals(&sample());
        let expenses = (600.0 + 100.0 + 100.0 + 0.0 + 30.0 + 20.0)
            + (150.0 + 50.0 + 50.0 + 20.0)
            + (20.0 + 40.0 + 60.0 + 0.0)
            + (50.0 + 0.0 + 0.0 + 5.0 + 0.0);
        assert_eq!(totals.total_expenses, expenses);
        assert_eq!(totals.total_credits, 300.0);
        assert!((totals.residual - (2000.0 - (expenses + 300.0))).abs() < 1e-9);
    }

    #[test]
    fn test_other_debts_not_in_credit_total() {
        let mut s = sample();
        s.credits.other_debts = vec![credit("999")];
        assert_eq!(submission_totals(&s).total_credits, 300.0);
    }

    #[test]
    fn test_negative_residual() {
        let mut s = DossierSubmission::default();
        s.income.salaries = Amount(800.0);
        s.charges.housing.rent = Amount(700.0);
        s.credits.consumer = vec![credit("250,50")];
        let totals = submission_totals(&s);
        assert!((totals.residual - (-150.5)).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_prefers_stored_fields() {
        let computed = submission_totals(&sample());
        let stored = StoredTotals {
            total_income: Some(3000.0),
            ..StoredTotals::default()
        };
        let resolved = resolve_totals(&stored, &computed);
        assert_eq!(resolved.total_income, 3000.0);
        assert_eq!(resolved.total_expenses, computed.total_expenses);
        assert_eq!(
            resolved.residual,
            3000.0 - (computed.total_expenses + computed.total_credits)
        );
    }

    #[test]
    fn test_resolve_keeps_stored_residual() {
        let computed = submission_totals(&sample());
        let stored = StoredTotals {
            residual: Some(12.0),
            ..StoredTotals::default()
        };
        assert_eq!(resolve_totals(&stored, &computed).residual, 12.0);
    }
}
