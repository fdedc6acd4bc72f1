//! Responsive grid vocabulary: breakpoints, column widths, spacing rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::field::Field;

/// Number of columns in one grid row.
pub const GRID_COLUMNS: u8 = 12;

/// Largest step on the spacing scale.
pub const MAX_SPACING_STEP: u8 = 6;

/// Responsive size class, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
        }
    }

    /// Class infix for this breakpoint; xs is mobile-first and has none.
    pub fn infix(&self) -> Option<&'static str> {
        match self {
            Breakpoint::Xs => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Breakpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xs" => Ok(Breakpoint::Xs),
            "sm" => Ok(Breakpoint::Sm),
            "md" => Ok(Breakpoint::Md),
            "lg" => Ok(Breakpoint::Lg),
            "xl" => Ok(Breakpoint::Xl),
            other => Err(format!("unknown breakpoint: {other}")),
        }
    }
}

/// Column width at one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScalarRepr", into = "ScalarRepr")]
pub enum Width {
    /// `"default"`: equal-width auto column
    Default,
    /// Column span 1..=12
    Span(u8),
}

impl Width {
    pub fn span(n: u8) -> Result<Self, String> {
        if (1..=GRID_COLUMNS).contains(&n) {
            Ok(Width::Span(n))
        } else {
            Err(format!("column span must be 1..={GRID_COLUMNS}, got {n}"))
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Width::Default => f.write_str("default"),
            Width::Span(n) => write!(f, "{n}"),
        }
    }
}

/// Value on the spacing scale for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScalarRepr", into = "ScalarRepr")]
pub enum Spacing {
    /// `"0"`
    Zero,
    /// `"auto"`
    Auto,
    /// Scale step 1..=6
    Step(u8),
}

impl fmt::Display for Spacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spacing::Zero => f.write_str("0"),
            Spacing::Auto => f.write_str("auto"),
            Spacing::Step(n) => write!(f, "{n}"),
        }
    }
}

/// Wire shape shared by [`Width`] and [`Spacing`]: a keyword or an integer.
/// Form posts deliver numbers as strings, so numeric strings are accepted too.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ScalarRepr {
    Int(i64),
    Text(String),
}

impl ScalarRepr {
    fn as_int(&self) -> Option<i64> {
        match self {
            ScalarRepr::Int(n) => Some(*n),
            ScalarRepr::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl TryFrom<ScalarRepr> for Width {
    type Error = String;

    fn try_from(repr: ScalarRepr) -> Result<Self, Self::Error> {
        if let ScalarRepr::Text(s) = &repr {
            if s == "default" {
                return Ok(Width::Default);
            }
        }
        match repr.as_int() {
            Some(n) if (1..=GRID_COLUMNS as i64).contains(&n) => Ok(Width::Span(n as u8)),
            Some(n) => Err(format!("column span must be 1..={GRID_COLUMNS}, got {n}")),
            None => Err("width must be \"default\" or an integer".to_string()),
        }
    }
}

impl From<Width> for ScalarRepr {
    fn from(width: Width) -> Self {
        match width {
            Width::Default => ScalarRepr::Text("default".into()),
            Width::Span(n) => ScalarRepr::Int(n as i64),
        }
    }
}

impl TryFrom<ScalarRepr> for Spacing {
    type Error = String;

    fn try_from(repr: ScalarRepr) -> Result<Self, Self::Error> {
        if let ScalarRepr::Text(s) = &repr {
            if s == "auto" {
                return Ok(Spacing::Auto);
            }
        }
        match repr.as_int() {
            Some(0) => Ok(Spacing::Zero),
            Some(n) if (1..=MAX_SPACING_STEP as i64).contains(&n) => Ok(Spacing::Step(n as u8)),
            Some(n) => Err(format!("spacing must be 0..={MAX_SPACING_STEP}, got {n}")),
            None => Err("spacing must be \"0\", \"auto\" or an integer".to_string()),
        }
    }
}

impl From<Spacing> for ScalarRepr {
    fn from(spacing: Spacing) -> Self {
        match spacing {
            Spacing::Zero => ScalarRepr::Text("0".into()),
            Spacing::Auto => ScalarRepr::Text("auto".into()),
            Spacing::Step(n) => ScalarRepr::Int(n as i64),
        }
    }
}

/// Side of a box for spacing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn abbrev(&self) -> char {
        match self {
            Side::Top => 't',
            Side::Right => 'r',
            Side::Bottom => 'b',
            Side::Left => 'l',
        }
    }
}

/// Spacing for one breakpoint. Absent sides are not set at that breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacingRule {
    pub breakpoint: Breakpoint,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub top: Field<Spacing>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub right: Field<Spacing>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub bottom: Field<Spacing>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub left: Field<Spacing>,
}

impl SpacingRule {
    pub fn new(breakpoint: Breakpoint) -> Self {
        Self {
            breakpoint,
            top: Field::Absent,
            right: Field::Absent,
            bottom: Field::Absent,
            left: Field::Absent,
        }
    }

    pub fn side(&self, side: Side) -> &Field<Spacing> {
        match side {
            Side::Top => &self.top,
            Side::Right => &self.right,
            Side::Bottom => &self.bottom,
            Side::Left => &self.left,
        }
    }
}

/// Node-level `settings` object. An explicit `null` list is kept apart from a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub paddings: Field<Vec<SpacingRule>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub margins: Field<Vec<SpacingRule>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_numeric_string_width_when_deserializing_then_normalizes_to_span() {
        let w: Width = serde_json::from_value(json!("6")).unwrap();
        assert_eq!(w, Width::Span(6));
        assert_eq!(serde_json::to_value(w).unwrap(), json!(6));
    }

    #[test]
    fn given_out_of_range_width_when_deserializing_then_fails() {
        assert!(serde_json::from_value::<Width>(json!(13)).is_err());
        assert!(serde_json::from_value::<Width>(json!(0)).is_err());
        assert!(serde_json::from_value::<Width>(json!("wide")).is_err());
    }

    #[test]
    fn given_spacing_keywords_when_round_tripping_then_preserved() {
        for raw in [json!("0"), json!("auto"), json!(4)] {
            let s: Spacing = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(serde_json::to_value(s).unwrap(), raw);
        }
        assert!(serde_json::from_value::<Spacing>(json!(7)).is_err());
    }

    #[test]
    fn given_spacing_rule_with_missing_sides_when_round_tripping_then_sides_stay_absent() {
        let raw = json!({"breakpoint": "md", "top": 2, "left": null});
        let rule: SpacingRule = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(rule.breakpoint, Breakpoint::Md);
        assert!(rule.right.is_absent());
        assert_eq!(rule.left, Field::Null);
        assert_eq!(serde_json::to_value(&rule).unwrap(), raw);
    }

    #[test]
    fn given_breakpoint_names_when_parsing_then_case_insensitive() {
        assert_eq!("MD".parse::<Breakpoint>().unwrap(), Breakpoint::Md);
        assert!("xxl".parse::<Breakpoint>().is_err());
    }
}
