//! Manufacturing rulesets and threshold resolution.
//!
//! A ruleset maps a service tier (for example `"2 Layer"`) to raw rule
//! values as a fab publishes them: `"5mil (0.127mm)"`, `"0.3mm"`, `"Any"`.
//! Values resolve to millimetres; the sentinels `any` and `user preference`
//! resolve to `0.0`, which means the rule is not enforced.

use std::io::Read;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::drc::{DrcThresholds, ExtraRules};
use crate::error::RulesError;

/// Trace width used when no tier value applies.
pub const DEFAULT_MIN_TRACE_WIDTH: f64 = 0.15;
/// Pad clearance used when no tier value applies.
pub const DEFAULT_MIN_CLEARANCE: f64 = 0.15;
/// Service tier new boards are checked against.
pub const DEFAULT_SERVICE: &str = "2 Layer";

/// Minimum trace width rule name.
pub const MIN_TRACK_WIDTH: &str = "Minimum track Width";
/// Minimum copper clearance rule name.
pub const MIN_CLEARANCE: &str = "Minimum Clearance";
/// Minimum annular ring rule name.
pub const MIN_ANNULAR_RING: &str = "Minimum Annular Ring";
/// Minimum via pad diameter rule name.
pub const MIN_VIA_DIAMETER: &str = "Minimum Via Diameter";
/// Minimum drill diameter rule name.
pub const MIN_THROUGH_HOLE: &str = "Minimum Through Hole";
/// Minimum drill-to-drill edge clearance rule name.
pub const HOLE_TO_HOLE_CLEARANCE: &str = "Hole to hole clearance";
/// Minimum silkscreen text height rule name.
pub const MIN_TEXT_HEIGHT: &str = "Silkscreen Min Text Height";
/// Minimum silkscreen stroke thickness rule name.
pub const MIN_TEXT_THICKNESS: &str = "Silkscreen Min Text Thickness";

const UNCONSTRAINED: [&str; 2] = ["any", "user preference"];

const BUILTIN_RULES: &[(&str, &[(&str, &str)])] = &[
    (
        "1 Layer",
        &[
            (MIN_TRACK_WIDTH, "5mil (0.127mm)"),
            (MIN_CLEARANCE, "5mil (0.127mm)"),
            (MIN_ANNULAR_RING, "Any"),
            (MIN_VIA_DIAMETER, "Any"),
            (MIN_THROUGH_HOLE, "0.3mm"),
            (HOLE_TO_HOLE_CLEARANCE, "0.5mm"),
            (MIN_TEXT_HEIGHT, "1mm"),
            (MIN_TEXT_THICKNESS, "0.15mm"),
        ],
    ),
    (
        "2 Layer",
        &[
            (MIN_TRACK_WIDTH, "5mil (0.127mm)"),
            (MIN_CLEARANCE, "5mil (0.127mm)"),
            (MIN_ANNULAR_RING, "0.13mm"),
            (MIN_VIA_DIAMETER, "0.45mm"),
            (MIN_THROUGH_HOLE, "0.3mm"),
            (HOLE_TO_HOLE_CLEARANCE, "0.5mm"),
            (MIN_TEXT_HEIGHT, "1mm"),
            (MIN_TEXT_THICKNESS, "0.15mm"),
        ],
    ),
    (
        "4 Layer",
        &[
            (MIN_TRACK_WIDTH, "3.5mil (0.09mm)"),
            (MIN_CLEARANCE, "3.5mil (0.09mm)"),
            (MIN_ANNULAR_RING, "0.13mm"),
            (MIN_VIA_DIAMETER, "0.4mm"),
            (MIN_THROUGH_HOLE, "0.2mm"),
            (HOLE_TO_HOLE_CLEARANCE, "0.5mm"),
            (MIN_TEXT_HEIGHT, "1mm"),
            (MIN_TEXT_THICKNESS, "0.15mm"),
        ],
    ),
    (
        "6 Layer",
        &[
            (MIN_TRACK_WIDTH, "3.5mil (0.09mm)"),
            (MIN_CLEARANCE, "3.5mil (0.09mm)"),
            (MIN_ANNULAR_RING, "0.13mm"),
            (MIN_VIA_DIAMETER, "0.4mm"),
            (MIN_THROUGH_HOLE, "0.2mm"),
            (HOLE_TO_HOLE_CLEARANCE, "0.5mm"),
            (MIN_TEXT_HEIGHT, "User Preference"),
            (MIN_TEXT_THICKNESS, "User Preference"),
        ],
    ),
];

lazy_static! {
    static ref MM_VALUE: Option<Regex> = Regex::new(r"([0-9]*\.?[0-9]+)mm").ok();

    /// The built-in service tier table.
    pub static ref LAYER_SERVICE_RULES: Ruleset = Ruleset::builtin();
}

/// A raw rule value: a bare number or a fab-style string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// Already in millimetres.
    Number(f64),
    /// Text such as `"6mil (0.1524mm)"` or `"Any"`.
    Text(String),
}

impl RuleValue {
    /// Resolves to millimetres; `0.0` means unconstrained.
    pub fn millimetres(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Text(text) => parse_rule_value(text),
        }
    }
}

impl From<&str> for RuleValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<f64> for RuleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Parses a fab rule string into millimetres.
///
/// Sentinels resolve to `0.0`; otherwise the first `<number>mm` occurrence
/// wins; text without one resolves to `0.0`.
pub fn parse_rule_value(raw: &str) -> f64 {
    let lowered = raw.trim().to_lowercase();
    if UNCONSTRAINED.contains(&lowered.as_str()) {
        return 0.0;
    }
    MM_VALUE
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Service tier → rule name → raw value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ruleset {
    tiers: IndexMap<String, IndexMap<String, RuleValue>>,
}

impl Ruleset {
    /// The built-in table.
    pub fn builtin() -> Self {
        let mut rules = Self::default();
        for (tier, entries) in BUILTIN_RULES {
            for (name, value) in *entries {
                rules.insert(*tier, *name, *value);
            }
        }
        rules
    }

    /// Loads a ruleset from a JSON object of objects.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Parse`] when the document is not a
    /// tier → rule → number-or-string mapping.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a ruleset from a JSON reader.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Parse`] on I/O or format errors.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RulesError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Sets one rule, creating the tier if needed.
    pub fn insert(
        &mut self,
        tier: impl Into<String>,
        rule: impl Into<String>,
        value: impl Into<RuleValue>,
    ) {
        self.tiers
            .entry(tier.into())
            .or_default()
            .insert(rule.into(), value.into());
    }

    /// `true` when the tier is defined.
    pub fn has_tier(&self, tier: &str) -> bool {
        self.tiers.contains_key(tier)
    }

    /// Tier names in definition order.
    pub fn tiers(&self) -> impl Iterator<Item = &str> {
        self.tiers.keys().map(String::as_str)
    }

    /// Raw value of one rule.
    pub fn rule(&self, tier: &str, rule: &str) -> Option<&RuleValue> {
        self.tiers.get(tier).and_then(|rules| rules.get(rule))
    }

    /// Resolves one rule to millimetres.
    ///
    /// An unknown tier yields `default`; a known tier without the rule
    /// yields `0.0`.
    pub fn resolve(&self, tier: &str, rule: &str, default: f64) -> f64 {
        self.tiers.get(tier).map_or(default, |rules| {
            rules.get(rule).map_or(0.0, RuleValue::millimetres)
        })
    }

    /// Resolves the DRC thresholds for `tier`.
    ///
    /// Explicit arguments win over tier values. Extra rules are only taken
    /// from known tiers and only when non-zero.
    pub fn thresholds(
        &self,
        tier: &str,
        min_trace_width: Option<f64>,
        min_clearance: Option<f64>,
    ) -> DrcThresholds {
        let known = self.has_tier(tier);
        if !known {
            log::warn!("unknown service tier `{tier}`; using default thresholds");
        }

        let min_trace_width = min_trace_width
            .unwrap_or_else(|| self.resolve(tier, MIN_TRACK_WIDTH, DEFAULT_MIN_TRACE_WIDTH));
        let min_clearance = min_clearance
            .unwrap_or_else(|| self.resolve(tier, MIN_CLEARANCE, DEFAULT_MIN_CLEARANCE));

        let extra = if known {
            ExtraRules {
                min_annular_ring: active(self.resolve(tier, MIN_ANNULAR_RING, 0.0)),
                min_via_diameter: active(self.resolve(tier, MIN_VIA_DIAMETER, 0.0)),
                min_through_hole: active(self.resolve(tier, MIN_THROUGH_HOLE, 0.0)),
                hole_to_hole_clearance: active(self.resolve(tier, HOLE_TO_HOLE_CLEARANCE, 0.0)),
                min_text_height: active(self.resolve(tier, MIN_TEXT_HEIGHT, 0.0)),
                min_text_thickness: active(self.resolve(tier, MIN_TEXT_THICKNESS, 0.0)),
            }
        } else {
            ExtraRules::default()
        };

        DrcThresholds {
            min_trace_width,
            min_clearance,
            extra,
        }
    }
}

fn active(value: f64) -> Option<f64> {
    (value.is_finite() && value != 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn mil_string_resolves_to_millimetre_part() {
        assert_close(parse_rule_value("6mil (0.1524mm)"), 0.1524);
        assert_close(parse_rule_value("0.3mm"), 0.3);
        assert_close(parse_rule_value("1mm"), 1.0);
    }

    #[test]
    fn sentinels_resolve_to_zero() {
        assert_close(parse_rule_value("user preference"), 0.0);
        assert_close(parse_rule_value("User Preference"), 0.0);
        assert_close(parse_rule_value("ANY"), 0.0);
    }

    #[test]
    fn spaced_unit_is_not_a_millimetre_value() {
        assert_close(parse_rule_value("0.3 mm"), 0.0);
        assert_close(parse_rule_value("6mil (0.1524 mm)"), 0.0);
    }

    #[test]
    fn text_without_millimetres_resolves_to_zero() {
        assert_close(parse_rule_value("6mil"), 0.0);
        assert_close(parse_rule_value(""), 0.0);
    }

    #[test]
    fn numbers_pass_through() {
        assert_close(RuleValue::Number(0.2).millimetres(), 0.2);
    }

    #[test]
    fn unknown_tier_uses_caller_default() {
        let rules = Ruleset::builtin();
        assert_close(rules.resolve("12 Layer", MIN_TRACK_WIDTH, 0.42), 0.42);
    }

    #[test]
    fn known_tier_missing_rule_is_unconstrained() {
        let mut rules = Ruleset::default();
        rules.insert("Custom", MIN_TRACK_WIDTH, "0.2mm");
        assert_close(rules.resolve("Custom", MIN_CLEARANCE, 0.15), 0.0);
        assert_close(rules.resolve("Custom", MIN_TRACK_WIDTH, 0.15), 0.2);
    }

    #[test]
    fn unknown_tier_falls_back_to_defaults() {
        let t = Ruleset::builtin().thresholds("Mystery", None, None);
        assert_close(t.min_trace_width, DEFAULT_MIN_TRACE_WIDTH);
        assert_close(t.min_clearance, DEFAULT_MIN_CLEARANCE);
        assert!(t.extra.is_empty());
    }

    #[test]
    fn explicit_thresholds_override_tier() {
        let t = Ruleset::builtin().thresholds(DEFAULT_SERVICE, Some(0.3), None);
        assert_close(t.min_trace_width, 0.3);
        assert_close(t.min_clearance, 0.127);
    }

    #[test]
    fn zero_extra_rules_are_not_active() {
        let t = Ruleset::builtin().thresholds("1 Layer", None, None);
        assert_eq!(t.extra.min_annular_ring, None);
        assert_eq!(t.extra.min_via_diameter, None);
        assert_eq!(t.extra.min_through_hole, Some(0.3));

        let t = Ruleset::builtin().thresholds("6 Layer", None, None);
        assert_eq!(t.extra.min_text_height, None);
        assert_eq!(t.extra.min_text_thickness, None);
    }

    #[test]
    fn loads_from_json() {
        let json = r#"{
            "Prototype": {
                "Minimum track Width": "8mil (0.2032mm)",
                "Minimum Clearance": 0.25,
                "Minimum Via Diameter": "any"
            }
        }"#;
        let rules = Ruleset::from_json(json);
        assert!(rules.is_ok(), "expected valid ruleset: {:?}", rules.err());
        if let Ok(rules) = rules {
            let t = rules.thresholds("Prototype", None, None);
            assert_close(t.min_trace_width, 0.2032);
            assert_close(t.min_clearance, 0.25);
            assert_eq!(t.extra.min_via_diameter, None);
        }
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Ruleset::from_json(r#"{"Tier": ["0.1mm"]}"#).is_err());
    }

    #[test]
    fn builtin_table_is_shared() {
        assert!(LAYER_SERVICE_RULES.has_tier(DEFAULT_SERVICE));
        assert_eq!(
            LAYER_SERVICE_RULES.tiers().collect::<Vec<_>>(),
            vec!["1 Layer", "2 Layer", "4 Layer", "6 Layer"]
        );
    }
}
