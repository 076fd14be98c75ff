use serde::{Deserialize, Serialize};

/// Stable index of a country within one reconciled load.
///
/// Ids are positions in the boundary list, so they are only meaningful
/// against the load that produced them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(u32);

impl CountryId {
    pub fn new(index: u32) -> Self {
        CountryId(index)
    }

    pub fn from_usize(index: usize) -> Self {
        CountryId(index as u32)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CountryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::CountryId;

    #[test]
    fn serializes_as_bare_index() {
        let id = CountryId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: CountryId = serde_json::from_str("7").unwrap();
        assert_eq!(back.as_usize(), 7);
    }
}
