//! Lab report parsing and out-of-range flagging
//!
//! Lab PDFs are reduced to plain text before they reach this module. Each
//! result line is expected to look like
//!
//! ```text
//! Hemoglobin: 11,2 g/dL (Ref: 12-16)
//! LDL Kolesterol: 165 mg/dL (Ref: <130)
//! ```
//!
//! Lines that do not follow the pattern are ignored, as are entries whose
//! value or range cannot be read as numbers.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::CoreError;

static RESULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<test>[A-Za-zçğıöşüÇĞİÖŞÜ ]+):\s*",
        r"(?P<value>[\d.,]+)\s*",
        r"(?P<unit>[^\s(][^\n]*?)?",
        r"\s*\((?i:ref)[:\-]?\s*",
        r"(?P<range>[<>]?\s*\d+(?:[.,]\d+)?(?:\s*[-–]\s*\d+(?:[.,]\d+)?)?)",
        r"\s*\)?",
    ))
    .expect("lab result pattern must compile")
});

/// Parse a lab number, accepting a decimal comma
pub fn parse_number(raw: &str) -> Result<f64, CoreError> {
    let normalized = raw.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .map_err(|_| CoreError::InvalidNumber(raw.to_string()))
}

/// Reference interval printed next to a lab value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceRange {
    /// `low-high` (hyphen or en dash)
    Between { low: f64, high: f64 },
    /// `<limit`: values at or above the limit are high
    Below(f64),
    /// `>limit`: values at or below the limit are low
    Above(f64),
}

impl FromStr for ReferenceRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || CoreError::InvalidRange(s.to_string());

        if let Some(rest) = trimmed.strip_prefix('<') {
            return parse_number(rest).map(ReferenceRange::Below).map_err(|_| invalid());
        }
        if let Some(rest) = trimmed.strip_prefix('>') {
            return parse_number(rest).map(ReferenceRange::Above).map_err(|_| invalid());
        }

        let (low, high) = trimmed
            .split_once(|c: char| c == '-' || c == '–')
            .ok_or_else(invalid)?;
        let low = parse_number(low).map_err(|_| invalid())?;
        let high = parse_number(high).map_err(|_| invalid())?;
        Ok(ReferenceRange::Between { low, high })
    }
}

impl ReferenceRange {
    /// Classify a value against this range
    pub fn classify(&self, value: f64) -> Option<Flag> {
        match *self {
            ReferenceRange::Between { low, high } => {
                if value < low {
                    Some(Flag::Low)
                } else if value > high {
                    Some(Flag::High)
                } else {
                    None
                }
            }
            ReferenceRange::Below(limit) => (value >= limit).then_some(Flag::High),
            ReferenceRange::Above(limit) => (value <= limit).then_some(Flag::Low),
        }
    }
}

/// Direction of an out-of-range value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Low,
    High,
}

impl Flag {
    /// Turkish label used in user-facing report summaries
    pub fn label(self) -> &'static str {
        match self {
            Flag::Low => "düşük",
            Flag::High => "yüksek",
        }
    }
}

/// A single parsed lab line
#[derive(Debug, Clone, PartialEq)]
pub struct LabResult {
    pub test: String,
    pub value: f64,
    pub unit: String,
    /// Range text as printed in the report, e.g. `12-16`
    pub reference: String,
    pub range: ReferenceRange,
}

impl LabResult {
    pub fn flag(&self) -> Option<Flag> {
        self.range.classify(self.value)
    }
}

/// A result that falls outside its reference range
#[derive(Debug, Clone, PartialEq)]
pub struct LabFinding {
    pub result: LabResult,
    pub flag: Flag,
}

impl fmt::Display for LabFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.result;
        if r.unit.is_empty() {
            write!(
                f,
                "{} {} ({:?}, ref: {})",
                r.test,
                self.flag.label(),
                r.value,
                r.reference
            )
        } else {
            write!(
                f,
                "{} {} ({:?} {}, ref: {})",
                r.test,
                self.flag.label(),
                r.value,
                r.unit,
                r.reference
            )
        }
    }
}

/// Extract every readable result line from report text, in document order
pub fn extract_results(text: &str) -> Vec<LabResult> {
    RESULT_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let test = caps.name("test")?.as_str().trim();
            if test.is_empty() {
                return None;
            }
            let value = parse_number(caps.name("value")?.as_str()).ok()?;
            let reference = caps.name("range")?.as_str().trim().to_string();
            let range = reference.parse::<ReferenceRange>().ok()?;
            let unit = caps
                .name("unit")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            Some(LabResult {
                test: test.to_string(),
                value,
                unit,
                reference,
                range,
            })
        })
        .collect()
}

/// Flag every out-of-range result in the report text
pub fn analyze(text: &str) -> Vec<LabFinding> {
    extract_results(text)
        .into_iter()
        .filter_map(|result| result.flag().map(|flag| LabFinding { result, flag }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_REPORT: &str = "\
HEMOGRAM SONUÇLARI
Hemoglobin: 11,2 g/dL (Ref: 12-16)
Lökosit: 7.4 10^3/uL (Ref: 4-10)
Trombosit: 480 10^3/uL (Ref: 150-400)
LDL Kolesterol: 165 mg/dL (Ref: <130)
HDL Kolesterol: 35 mg/dL (Ref: >40)
Açıklama: numune hemolizli
";

    #[test]
    fn parses_between_below_and_above_ranges() {
        assert_eq!(
            "12-16".parse::<ReferenceRange>(),
            Ok(ReferenceRange::Between { low: 12.0, high: 16.0 })
        );
        assert_eq!(
            "3,5–5,1".parse::<ReferenceRange>(),
            Ok(ReferenceRange::Between { low: 3.5, high: 5.1 })
        );
        assert_eq!("<130".parse::<ReferenceRange>(), Ok(ReferenceRange::Below(130.0)));
        assert_eq!("> 40".parse::<ReferenceRange>(), Ok(ReferenceRange::Above(40.0)));
    }

    #[test]
    fn bare_number_is_not_a_range() {
        assert!(matches!(
            "100".parse::<ReferenceRange>(),
            Err(CoreError::InvalidRange(_))
        ));
    }

    #[test]
    fn boundaries_follow_bound_semantics() {
        let between = ReferenceRange::Between { low: 12.0, high: 16.0 };
        assert_eq!(between.classify(12.0), None);
        assert_eq!(between.classify(16.0), None);
        assert_eq!(between.classify(11.9), Some(Flag::Low));
        assert_eq!(between.classify(16.1), Some(Flag::High));

        // `<130`: reaching the limit is already high
        assert_eq!(ReferenceRange::Below(130.0).classify(130.0), Some(Flag::High));
        assert_eq!(ReferenceRange::Below(130.0).classify(129.0), None);

        // `>40`: touching the limit is already low
        assert_eq!(ReferenceRange::Above(40.0).classify(40.0), Some(Flag::Low));
        assert_eq!(ReferenceRange::Above(40.0).classify(41.0), None);
    }

    #[test]
    fn extracts_all_result_lines() {
        let results = extract_results(SAMPLE_REPORT);
        let names: Vec<&str> = results.iter().map(|r| r.test.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Hemoglobin",
                "Lökosit",
                "Trombosit",
                "LDL Kolesterol",
                "HDL Kolesterol"
            ]
        );

        let hemoglobin = &results[0];
        assert_eq!(hemoglobin.value, 11.2);
        assert_eq!(hemoglobin.unit, "g/dL");
        assert_eq!(hemoglobin.reference, "12-16");
    }

    #[test]
    fn flags_only_out_of_range_values() {
        let findings = analyze(SAMPLE_REPORT);
        let rendered: Vec<String> = findings.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "Hemoglobin düşük (11.2 g/dL, ref: 12-16)",
                "Trombosit yüksek (480.0 10^3/uL, ref: 150-400)",
                "LDL Kolesterol yüksek (165.0 mg/dL, ref: <130)",
                "HDL Kolesterol düşük (35.0 mg/dL, ref: >40)",
            ]
        );
    }

    #[test]
    fn unit_is_optional() {
        let findings = analyze("Glukoz: 130 (Ref: 70-100)");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].result.unit, "");
        assert_eq!(findings[0].to_string(), "Glukoz yüksek (130.0, ref: 70-100)");
    }

    #[test]
    fn qualifier_between_unit_and_range_is_kept_in_unit() {
        let text = "Trombosit: 480 10^3/uL (Ref: 150-400)\nGlukoz: 130 mg/dL (açlık) (Ref: 70-100)";
        let findings = analyze(text);
        let rendered: Vec<String> = findings.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "Trombosit yüksek (480.0 10^3/uL, ref: 150-400)",
                "Glukoz yüksek (130.0 mg/dL (açlık), ref: 70-100)",
            ]
        );
    }

    #[test]
    fn whole_numbers_keep_a_decimal_place() {
        let finding = analyze("Kreatinin: 2 mg/dL (Ref: 0,6-1,2)").remove(0);
        assert_eq!(finding.to_string(), "Kreatinin yüksek (2.0 mg/dL, ref: 0,6-1,2)");
    }

    #[test]
    fn unreadable_values_are_skipped() {
        let text = "Ferritin: 1.2.3 ng/mL (Ref: 10-120)\nKobalamin: 150 pg/mL (Ref: 200-900)";
        let findings = analyze(text);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].result.test, "Kobalamin");
    }

    #[test]
    fn text_without_results_yields_nothing() {
        assert!(analyze("Hasta adı: Ayşe Yılmaz\nTarih: 01.02.2024").is_empty());
    }
}
