use tracing::debug;

use crate::config::FilterConfig;
use crate::models::RawRecord;

/// Records split by the block list, input order preserved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub kept: Vec<RawRecord>,
    pub removed: usize,
}

pub struct FilterEngine {
    block_substrings: Vec<String>,
}

impl FilterEngine {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            // An empty needle would match every name
            block_substrings: config
                .block_substrings
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Case-sensitive substring match against the record name
    pub fn is_blocked(&self, record: &RawRecord) -> bool {
        self.block_substrings
            .iter()
            .any(|needle| record.name.contains(needle.as_str()))
    }

    pub fn apply(&self, records: Vec<RawRecord>) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        for record in records {
            if self.is_blocked(&record) {
                debug!("Filtered out '{}' ({})", record.name, record.address);
                outcome.removed += 1;
            } else {
                outcome.kept.push(record);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(blocked: &[&str]) -> FilterEngine {
        FilterEngine::new(&FilterConfig {
            block_substrings: blocked.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_blocked_names_are_removed_in_order() {
        let records = vec![
            RawRecord::new("CCTV-1 综合", "239.1.1.1:1"),
            RawRecord::new("CCTV-5 体育 画中画", "239.1.1.2:1"),
            RawRecord::new("湖南卫视", "239.1.1.3:1"),
            RawRecord::new("Sports PIP", "239.1.1.4:1"),
        ];

        let outcome = FilterEngine::new(&FilterConfig::default()).apply(records);
        assert_eq!(outcome.removed, 2);
        let names: Vec<&str> = outcome.kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["CCTV-1 综合", "湖南卫视"]);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let outcome = engine(&["PIP"]).apply(vec![RawRecord::new("Pip Channel", "239.1.1.1:1")]);
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.kept.len(), 1);
    }

    #[test]
    fn test_empty_block_list_keeps_everything() {
        let outcome = engine(&[""]).apply(vec![RawRecord::new("CCTV-1", "239.1.1.1:1")]);
        assert_eq!(outcome.kept.len(), 1);
    }
}
