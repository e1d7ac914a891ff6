use crate::record::{Platform, Record};

/// Library-strategy predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyFilter {
    Is(String),
    IsNot(String),
}

impl StrategyFilter {
    fn matches(&self, strategy: Option<&str>) -> bool {
        match self {
            StrategyFilter::Is(want) => strategy.is_some_and(|s| s.eq_ignore_ascii_case(want)),
            StrategyFilter::IsNot(want) => !strategy.is_some_and(|s| s.eq_ignore_ascii_case(want)),
        }
    }
}

/// Conjunction of optional record predicates.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleFilter {
    /// Case-insensitive substring of the scientific name.
    pub organism: Option<String>,
    pub platform: Option<Platform>,
    pub library_strategy: Option<StrategyFilter>,
}

impl SampleFilter {
    pub fn organism(mut self, needle: impl Into<String>) -> Self {
        self.organism = Some(needle.into());
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn library_strategy(mut self, strategy: StrategyFilter) -> Self {
        self.library_strategy = Some(strategy);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.organism.is_none() && self.platform.is_none() && self.library_strategy.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        if let Some(ref needle) = self.organism {
            let needle = needle.to_lowercase();
            let hit = record
                .scientific_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(ref platform) = self.platform
            && record.instrument_platform.as_ref() != Some(platform)
        {
            return false;
        }

        if let Some(ref strategy) = self.library_strategy
            && !strategy.matches(record.library_strategy.as_deref())
        {
            return false;
        }

        true
    }

    /// Lazily select the matching records, preserving order.
    pub fn apply<'a, I>(&'a self, records: I) -> impl Iterator<Item = &'a Record> + 'a
    where
        I: IntoIterator<Item = &'a Record>,
        I::IntoIter: 'a,
    {
        records.into_iter().filter(move |r| self.matches(r))
    }
}
