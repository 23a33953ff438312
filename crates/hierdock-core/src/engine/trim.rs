use crate::core::models::body::{ResidueRange, TrimDirection};

/// Accepts a trial trimmed range only if it lies inside the body, removes at most `max_trim`
/// residues and trims only from termini allowed by `direction`.
pub fn validate_trim(
    range: Option<ResidueRange>,
    nres: usize,
    max_trim: usize,
    direction: TrimDirection,
) -> Option<ResidueRange> {
    let range = range?;
    if range.is_empty() || range.ub >= nres {
        return None;
    }
    let trims_n = range.lb > 0;
    let trims_c = range.ub + 1 < nres;
    if (trims_n && !direction.allows_n()) || (trims_c && !direction.allows_c()) {
        return None;
    }
    (range.ntrimmed(nres) <= max_trim).then_some(range)
}
