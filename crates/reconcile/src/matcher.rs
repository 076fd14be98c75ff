use std::collections::{BTreeMap, HashMap};

use foundation::{CountryId, exact_key, fold_name};
use formats::{BoundaryFeature, CountryAttributes};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alias::AliasTable;
use crate::special::special_attributes;

/// Names shorter than this (after folding) never substring-match.
pub const MIN_SUBSTRING_CHARS: usize = 4;

/// How a boundary found its attributes, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    ExactCommon,
    ExactOfficial,
    Alias,
    Substring,
    Special,
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Exact,
    Alias,
    Fuzzy,
    Synthetic,
    Unmatched,
}

impl MatchTier {
    pub fn confidence(self) -> Confidence {
        match self {
            MatchTier::ExactCommon | MatchTier::ExactOfficial => Confidence::Exact,
            MatchTier::Alias => Confidence::Alias,
            MatchTier::Substring => Confidence::Fuzzy,
            MatchTier::Special => Confidence::Synthetic,
            MatchTier::Placeholder => Confidence::Unmatched,
        }
    }
}

/// One boundary joined to its attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledCountry {
    /// Position of the boundary in the input list.
    pub id: CountryId,
    pub boundary_name: String,
    pub attributes: CountryAttributes,
    pub tier: MatchTier,
    /// Index of the matched record in the attributes list.
    pub source_index: Option<usize>,
    /// Other substring candidates that lost the tie-break.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
}

impl ReconciledCountry {
    pub fn confidence(&self) -> Confidence {
        self.tier.confidence()
    }

    pub fn is_placeholder(&self) -> bool {
        self.tier == MatchTier::Placeholder
    }

    pub fn common_name(&self) -> &str {
        self.attributes.common_name()
    }
}

/// Joins every boundary to at most one attributes record.
///
/// Ordering contract:
/// - Output has one entry per boundary, same order; `id` is the input index.
/// - Tiers run across all boundaries before the next tier starts: exact
///   common name, exact official name, alias, substring.
/// - Exact tiers ignore only case and whitespace. Names equal after full
///   folding (punctuation, accents, articles, the ISO comma form) or sharing
///   an alias group match in the alias tier.
/// - Within a tier, boundaries claim records in input order, and among
///   several records the first in response order wins.
/// - A claimed record is only shared with boundaries whose folded name equals
///   the claimant's (one country split into several features).
/// - Special entities bypass matching; everything left over gets a placeholder.
pub fn reconcile(
    boundaries: &[BoundaryFeature],
    attributes: &[CountryAttributes],
) -> Vec<ReconciledCountry> {
    let mut state = MatchState::new(boundaries, attributes);

    state.assign_special(boundaries);
    state.run_exact(MatchTier::ExactCommon);
    state.run_exact(MatchTier::ExactOfficial);
    state.run_alias();
    state.run_substring(attributes);

    let out = state.finish(boundaries, attributes);
    let counts = tier_counts(&out);
    info!(
        boundaries = out.len(),
        records = attributes.len(),
        ?counts,
        "reconciled countries"
    );
    out
}

/// Number of results per tier, for load summaries and reports.
pub fn tier_counts(countries: &[ReconciledCountry]) -> BTreeMap<MatchTier, usize> {
    let mut counts = BTreeMap::new();
    for c in countries {
        *counts.entry(c.tier).or_insert(0) += 1;
    }
    counts
}

struct Assignment {
    tier: MatchTier,
    record: Option<usize>,
    special: Option<CountryAttributes>,
    alternatives: Vec<String>,
}

struct MatchState {
    /// Folded boundary names.
    boundary_keys: Vec<String>,
    boundary_exact: Vec<String>,
    common_keys: Vec<String>,
    official_keys: Vec<String>,
    by_common: HashMap<String, Vec<usize>>,
    by_official: HashMap<String, Vec<usize>>,
    /// Folded common and official names, each record listed once per key.
    by_folded: HashMap<String, Vec<usize>>,
    by_alias_group: HashMap<usize, Vec<usize>>,
    /// Folded name of the boundary that claimed each record.
    claims: Vec<Option<String>>,
    slots: Vec<Option<Assignment>>,
}

impl MatchState {
    fn new(boundaries: &[BoundaryFeature], attributes: &[CountryAttributes]) -> Self {
        let aliases = AliasTable::global();
        let common_keys: Vec<String> = attributes
            .iter()
            .map(|a| fold_name(a.common_name()))
            .collect();
        let official_keys: Vec<String> = attributes
            .iter()
            .map(|a| fold_name(a.official_name()))
            .collect();

        let mut by_common: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_official: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_folded: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_alias_group: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, a) in attributes.iter().enumerate() {
            by_common
                .entry(exact_key(a.common_name()))
                .or_default()
                .push(i);
            let official_exact = exact_key(a.official_name());
            if !official_exact.is_empty() {
                by_official.entry(official_exact).or_default().push(i);
            }
        }
        for (i, (common, official)) in common_keys.iter().zip(&official_keys).enumerate() {
            by_folded.entry(common.clone()).or_default().push(i);
            if !official.is_empty() && official != common {
                by_folded.entry(official.clone()).or_default().push(i);
            }
            if let Some(group) = aliases
                .group_of(common)
                .or_else(|| aliases.group_of(official))
            {
                by_alias_group.entry(group).or_default().push(i);
            }
        }

        Self {
            boundary_keys: boundaries.iter().map(|b| fold_name(&b.name)).collect(),
            boundary_exact: boundaries.iter().map(|b| exact_key(&b.name)).collect(),
            common_keys,
            official_keys,
            by_common,
            by_official,
            by_folded,
            by_alias_group,
            claims: vec![None; attributes.len()],
            slots: (0..boundaries.len()).map(|_| None).collect(),
        }
    }

    fn claimable(&self, record: usize, key: &str) -> bool {
        match &self.claims[record] {
            None => true,
            Some(owner) => owner == key,
        }
    }

    fn first_claimable(&self, candidates: Option<&Vec<usize>>, key: &str) -> Option<usize> {
        candidates?
            .iter()
            .copied()
            .find(|&r| self.claimable(r, key))
    }

    fn assign(
        &mut self,
        boundary: usize,
        record: usize,
        tier: MatchTier,
        alternatives: Vec<String>,
    ) {
        self.claims[record] = Some(self.boundary_keys[boundary].clone());
        self.slots[boundary] = Some(Assignment {
            tier,
            record: Some(record),
            special: None,
            alternatives,
        });
    }

    fn open_boundaries(&self) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&i| self.slots[i].is_none())
            .collect()
    }

    fn assign_special(&mut self, boundaries: &[BoundaryFeature]) {
        for (i, b) in boundaries.iter().enumerate() {
            if let Some(attrs) = special_attributes(&b.name) {
                debug!(boundary = %b.name, "special-cased boundary");
                self.slots[i] = Some(Assignment {
                    tier: MatchTier::Special,
                    record: None,
                    special: Some(attrs),
                    alternatives: Vec::new(),
                });
            }
        }
    }

    fn run_exact(&mut self, tier: MatchTier) {
        for i in self.open_boundaries() {
            let index = match tier {
                MatchTier::ExactOfficial => &self.by_official,
                _ => &self.by_common,
            };
            let candidates = index.get(&self.boundary_exact[i]);
            if let Some(record) = self.first_claimable(candidates, &self.boundary_keys[i]) {
                self.assign(i, record, tier, Vec::new());
            }
        }
    }

    fn run_alias(&mut self) {
        let aliases = AliasTable::global();
        for i in self.open_boundaries() {
            let key = &self.boundary_keys[i];
            let folded = self.first_claimable(self.by_folded.get(key), key);
            let record = folded.or_else(|| {
                let group = aliases.group_of(key)?;
                self.first_claimable(self.by_alias_group.get(&group), key)
            });
            if let Some(record) = record {
                self.assign(i, record, MatchTier::Alias, Vec::new());
            }
        }
    }

    fn run_substring(&mut self, attributes: &[CountryAttributes]) {
        for i in self.open_boundaries() {
            let key = self.boundary_keys[i].clone();
            let key_len = key.chars().count();
            if key_len < MIN_SUBSTRING_CHARS {
                continue;
            }

            // (distance in chars, record index)
            let mut candidates: Vec<(usize, usize)> = Vec::new();
            for r in 0..attributes.len() {
                if !self.claimable(r, &key) {
                    continue;
                }
                let distance = [&self.common_keys[r], &self.official_keys[r]]
                    .into_iter()
                    .filter(|name| substring_related(&key, name))
                    .map(|name| key_len.abs_diff(name.chars().count()))
                    .min();
                if let Some(d) = distance {
                    candidates.push((d, r));
                }
            }
            candidates.sort();

            let Some(&(_, winner)) = candidates.first() else {
                continue;
            };
            let alternatives: Vec<String> = candidates[1..]
                .iter()
                .map(|&(_, r)| attributes[r].common_name().to_string())
                .collect();

            if alternatives.is_empty() {
                debug!(
                    boundary = %key,
                    matched = attributes[winner].common_name(),
                    "substring match"
                );
            } else {
                warn!(
                    boundary = %key,
                    matched = attributes[winner].common_name(),
                    ?alternatives,
                    "ambiguous substring match"
                );
            }
            self.assign(i, winner, MatchTier::Substring, alternatives);
        }
    }

    fn finish(
        self,
        boundaries: &[BoundaryFeature],
        attributes: &[CountryAttributes],
    ) -> Vec<ReconciledCountry> {
        boundaries
            .iter()
            .zip(self.slots)
            .enumerate()
            .map(|(i, (b, slot))| {
                let id = CountryId::from_usize(i);
                match slot {
                    Some(Assignment {
                        tier,
                        record: Some(r),
                        alternatives,
                        ..
                    }) => ReconciledCountry {
                        id,
                        boundary_name: b.name.clone(),
                        attributes: attributes[r].clone(),
                        tier,
                        source_index: Some(r),
                        alternatives,
                    },
                    Some(Assignment {
                        tier,
                        special: Some(attrs),
                        ..
                    }) => ReconciledCountry {
                        id,
                        boundary_name: b.name.clone(),
                        attributes: attrs,
                        tier,
                        source_index: None,
                        alternatives: Vec::new(),
                    },
                    _ => {
                        debug!(boundary = %b.name, "no attributes match, using placeholder");
                        ReconciledCountry {
                            id,
                            boundary_name: b.name.clone(),
                            attributes: CountryAttributes::placeholder(&b.name),
                            tier: MatchTier::Placeholder,
                            source_index: None,
                            alternatives: Vec::new(),
                        }
                    }
                }
            })
            .collect()
    }
}

fn substring_related(key: &str, name: &str) -> bool {
    name.chars().count() >= MIN_SUBSTRING_CHARS && (key.contains(name) || name.contains(key))
}
