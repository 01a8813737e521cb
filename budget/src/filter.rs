use shared_types::DossierSummary;

/// Case-insensitive substring match on first or last name.
/// A blank query matches every dossier.
pub fn matches_name(first_name: &str, last_name: &str, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    first_name.to_lowercase().contains(&needle) || last_name.to_lowercase().contains(&needle)
}

pub fn filter_summaries(items: Vec<DossierSummary>, query: Option<&str>) -> Vec<DossierSummary> {
    match query {
        Some(q) => items
            .into_iter()
            .filter(|d| matches_name(&d.first_name, &d.last_name, q))
            .collect(),
        None => items,
    }
}
