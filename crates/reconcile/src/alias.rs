//! The one alias table for country names.
//!
//! Each group lists spellings of the same country; the first entry is the
//! REST Countries common name. Lookups go through [`fold_name`], so groups
//! only need entries that fold differently.

use std::collections::HashMap;
use std::sync::OnceLock;

use foundation::fold_name;

#[rustfmt::skip]
pub const ALIAS_GROUPS: &[&[&str]] = &[
    &["United States", "United States of America", "USA", "US"],
    &["United Kingdom", "UK", "Great Britain", "Britain", "England"],
    &["South Korea", "Republic of Korea", "Korea, Republic of"],
    &["North Korea", "Democratic People's Republic of Korea", "Dem. Rep. Korea", "DPRK"],
    &["DR Congo", "Democratic Republic of the Congo", "Dem. Rep. Congo", "Congo, Democratic Republic of the", "DRC", "Congo-Kinshasa", "Zaire"],
    &["Republic of the Congo", "Congo", "Congo-Brazzaville", "Congo Republic"],
    &["Ivory Coast", "Côte d'Ivoire"],
    &["Czechia", "Czech Republic", "Czech Rep."],
    &["Eswatini", "Swaziland"],
    &["North Macedonia", "Macedonia", "Former Yugoslav Republic of Macedonia"],
    &["Timor-Leste", "East Timor"],
    &["Russia", "Russian Federation"],
    &["Iran", "Islamic Republic of Iran", "Iran, Islamic Republic of"],
    &["Syria", "Syrian Arab Republic"],
    &["Laos", "Lao PDR", "Lao People's Democratic Republic"],
    &["Vietnam", "Viet Nam"],
    &["Tanzania", "United Republic of Tanzania", "Tanzania, United Republic of"],
    &["Bolivia", "Plurinational State of Bolivia"],
    &["Venezuela", "Bolivarian Republic of Venezuela"],
    &["Moldova", "Republic of Moldova"],
    &["Brunei", "Brunei Darussalam"],
    &["Myanmar", "Burma"],
    &["Cape Verde", "Cabo Verde"],
    &["Serbia", "Republic of Serbia"],
    &["Turkey", "Türkiye"],
    &["Netherlands", "Holland"],
    &["Vatican City", "Holy See", "Vatican"],
    &["Kyrgyzstan", "Kyrgyz Republic"],
    &["Slovakia", "Slovak Republic"],
    &["Bosnia and Herzegovina", "Bosnia and Herz."],
    &["Central African Republic", "Central African Rep."],
    &["South Sudan", "S. Sudan"],
    &["Dominican Republic", "Dominican Rep."],
    &["Equatorial Guinea", "Eq. Guinea"],
    &["Solomon Islands", "Solomon Is."],
    &["Falkland Islands", "Falkland Is.", "Falkland Islands (Malvinas)"],
    &["French Southern and Antarctic Lands", "Fr. S. Antarctic Lands", "French Southern Territories"],
    &["Western Sahara", "W. Sahara"],
    &["Palestine", "State of Palestine", "Palestinian Territories"],
    &["Taiwan", "Taiwan, Province of China"],
];

/// Folded-name index over [`ALIAS_GROUPS`], built on first use.
pub struct AliasTable {
    group_by_key: HashMap<String, usize>,
}

impl AliasTable {
    pub fn global() -> &'static AliasTable {
        static INSTANCE: OnceLock<AliasTable> = OnceLock::new();
        INSTANCE.get_or_init(|| AliasTable::from_groups(ALIAS_GROUPS))
    }

    fn from_groups(groups: &[&[&str]]) -> Self {
        let mut group_by_key = HashMap::new();
        for (group, names) in groups.iter().enumerate() {
            for name in names.iter() {
                // First group wins if two groups ever claim the same key.
                group_by_key.entry(fold_name(name)).or_insert(group);
            }
        }
        Self { group_by_key }
    }

    /// Group index for a raw or folded name.
    pub fn group_of(&self, name: &str) -> Option<usize> {
        self.group_by_key.get(&fold_name(name)).copied()
    }

    /// `true` when both names are listed in the same group.
    pub fn are_aliases(&self, a: &str, b: &str) -> bool {
        match (self.group_of(a), self.group_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// The canonical (first) spelling of the name's group.
    pub fn canonical(&self, name: &str) -> Option<&'static str> {
        self.group_of(name)
            .and_then(|g| ALIAS_GROUPS.get(g))
            .and_then(|names| names.first().copied())
    }

    /// Every spelling in the name's group, canonical first.
    pub fn aliases_of(&self, name: &str) -> &'static [&'static str] {
        self.group_of(name)
            .and_then(|g| ALIAS_GROUPS.get(g).copied())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.group_by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group_by_key.is_empty()
    }
}
