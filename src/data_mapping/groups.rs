//! Ordered group classification rules

use crate::config::{EnrichmentConfig, GroupRule};

impl GroupRule {
    pub fn matches(&self, name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
            || self
                .contains
                .iter()
                .any(|needle| !needle.is_empty() && name.contains(needle.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct GroupClassifier {
    rules: Vec<GroupRule>,
    default_group: String,
}

impl GroupClassifier {
    pub fn new(config: &EnrichmentConfig) -> Self {
        Self {
            rules: config.groups.clone(),
            default_group: config.default_group.clone(),
        }
    }

    /// Label of the first matching rule, or the default group
    pub fn classify(&self, name: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(name))
            .map(|rule| rule.label.as_str())
            .unwrap_or(self.default_group.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CCTV-1 综合", "央视频道")]
    #[case("CCTV-5 体育", "央视频道")]
    #[case("中央新影", "央视频道")]
    #[case("湖南卫视", "卫视频道")]
    #[case("上海新闻", "地方频道")]
    #[case("电影频道", "影视频道")]
    #[case("金鹰卡通", "其他频道")]
    #[case("CGTN", "其他频道")]
    fn test_default_rules(#[case] name: &str, #[case] expected: &str) {
        let classifier = GroupClassifier::new(&EnrichmentConfig::default());
        assert_eq!(classifier.classify(name), expected);
    }

    #[test]
    fn test_first_matching_rule_wins_and_contains_is_honoured() {
        let config = EnrichmentConfig {
            default_group: "Other".to_string(),
            groups: vec![
                GroupRule {
                    label: "Sports".to_string(),
                    prefixes: Vec::new(),
                    contains: vec!["体育".to_string()],
                },
                GroupRule {
                    label: "CCTV".to_string(),
                    prefixes: vec!["CCTV-".to_string()],
                    contains: Vec::new(),
                },
            ],
            ..EnrichmentConfig::default()
        };
        let classifier = GroupClassifier::new(&config);

        assert_eq!(classifier.classify("CCTV-5 体育"), "Sports");
        assert_eq!(classifier.classify("CCTV-1 综合"), "CCTV");
        assert_eq!(classifier.classify("BBC One"), "Other");
    }
}
