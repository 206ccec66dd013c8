use serde::{Deserialize, Serialize};

/// Heuristic tables for column detection and date parsing. Injected into the
/// parser and normalizer so alternate bank formats can be tested without
/// code changes.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub date_keywords: Vec<String>,
    pub description_keywords: Vec<String>,
    pub amount_keywords: Vec<String>,
    pub reference_keywords: Vec<String>,
    pub date_formats: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let strings = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            date_keywords: strings(&["tanggal", "date", "tgl", "posting date"]),
            description_keywords: strings(&[
                "keterangan",
                "description",
                "deskripsi",
                "uraian",
                "berita",
            ]),
            amount_keywords: strings(&["jumlah", "amount", "nominal", "kredit", "debit", "mutasi"]),
            reference_keywords: strings(&["referensi", "reference", "no ref", "ref"]),
            date_formats: strings(&[
                "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d %b %Y", "%d %B %Y", "%d/%m/%y",
            ]),
        }
    }
}

/// Tolerance knobs for auto-matching. The thresholds are empirical business
/// constants, so they are settings rather than hard-coded invariants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "default_tolerance_days")]
    pub tolerance_days: i64,
    #[serde(default = "default_auto_accept_threshold")]
    pub auto_accept_threshold: i64,
}

fn default_tolerance_days() -> i64 {
    1
}

fn default_auto_accept_threshold() -> i64 {
    70
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tolerance_days: default_tolerance_days(),
            auto_accept_threshold: default_auto_accept_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_match_config() {
        let cfg = MatchConfig::default();
        assert_eq!(cfg.tolerance_days, 1);
        assert_eq!(cfg.auto_accept_threshold, 70);
    }

    #[test]
    fn test_match_config_fills_missing_fields() {
        let cfg: MatchConfig = serde_json::from_str("{\"tolerance_days\": 3}").unwrap();
        assert_eq!(cfg.tolerance_days, 3);
        assert_eq!(cfg.auto_accept_threshold, 70);
    }

    #[test]
    fn test_parser_config_has_indonesian_keywords() {
        let cfg = ParserConfig::default();
        assert!(cfg.date_keywords.iter().any(|k| k == "tanggal"));
        assert!(cfg.amount_keywords.iter().any(|k| k == "nominal"));
    }
}
