use foundation::{CountryId, fold_name};
use reconcile::ReconciledCountry;

/// Countries whose boundary or common name contains `query`.
///
/// Comparison uses folded names, so case and accents are ignored. An empty
/// query returns every country. Results keep input order.
pub fn search_countries(countries: &[ReconciledCountry], query: &str) -> Vec<CountryId> {
    let needle = fold_name(query);
    countries
        .iter()
        .filter(|c| {
            needle.is_empty()
                || fold_name(&c.boundary_name).contains(&needle)
                || fold_name(c.common_name()).contains(&needle)
        })
        .map(|c| c.id)
        .collect()
}
