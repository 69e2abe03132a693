use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankThreshold {
    pub label: String,
    pub min_experience: u64,
}

impl RankThreshold {
    pub fn new(label: &str, min_experience: u64) -> Self {
        Self {
            label: label.to_string(),
            min_experience,
        }
    }
}

/// Label of the highest threshold reached. Thresholds must be ascending with
/// the first minimum at zero; an empty table yields an empty label.
pub fn rank_for(total_experience: u64, thresholds: &[RankThreshold]) -> &str {
    thresholds
        .iter()
        .take_while(|t| t.min_experience <= total_experience)
        .last()
        .or(thresholds.first())
        .map(|t| t.label.as_str())
        .unwrap_or("")
}

/// Next rank label and the experience still missing, or None at the top rank.
pub fn next_rank(total_experience: u64, thresholds: &[RankThreshold]) -> Option<(&str, u64)> {
    thresholds
        .iter()
        .find(|t| t.min_experience > total_experience)
        .map(|t| (t.label.as_str(), t.min_experience - total_experience))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<RankThreshold> {
        vec![
            RankThreshold::new("Novice", 0),
            RankThreshold::new("Apprentice", 100),
            RankThreshold::new("Adept", 500),
        ]
    }

    #[test]
    fn test_zero_experience_is_first_rank() {
        assert_eq!(rank_for(0, &table()), "Novice");
    }

    #[test]
    fn test_exact_boundaries() {
        let table = table();
        for t in &table {
            assert_eq!(rank_for(t.min_experience, &table), t.label);
        }
    }

    #[test]
    fn test_between_and_above_boundaries() {
        let table = table();
        assert_eq!(rank_for(99, &table), "Novice");
        assert_eq!(rank_for(499, &table), "Apprentice");
        assert_eq!(rank_for(1_000_000, &table), "Adept");
    }

    #[test]
    fn test_next_rank() {
        let table = table();
        assert_eq!(next_rank(0, &table), Some(("Apprentice", 100)));
        assert_eq!(next_rank(450, &table), Some(("Adept", 50)));
        assert_eq!(next_rank(500, &table), None);
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(rank_for(10, &[]), "");
        assert_eq!(next_rank(10, &[]), None);
    }
}
