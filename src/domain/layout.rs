//! Breakpoint/width resolver: grid classes for columns and spacing utilities.

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::field::Field;
use crate::domain::grid::{Breakpoint, LayoutSettings, Side, Spacing, SpacingRule, Width, GRID_COLUMNS};
use crate::domain::node::{ColumnData, NodeId};
use crate::domain::tree::{NodeField, Tree};

/// Grid class for a column width at `breakpoint`.
///
/// `None` means no class: the width is inherited from the next smaller breakpoint.
///
/// ```
/// use cmstree::domain::{resolve_width_class, Breakpoint, Width};
///
/// assert_eq!(resolve_width_class(Breakpoint::Xs, Some(Width::Span(6))).as_deref(), Some("col-6"));
/// assert_eq!(resolve_width_class(Breakpoint::Md, Some(Width::Default)).as_deref(), Some("col-md"));
/// assert_eq!(resolve_width_class(Breakpoint::Lg, None), None);
/// ```
pub fn resolve_width_class(breakpoint: Breakpoint, value: Option<Width>) -> Option<String> {
    let value = value?;
    Some(match (breakpoint.infix(), value) {
        (None, Width::Default) => "col".to_string(),
        (None, Width::Span(n)) => format!("col-{n}"),
        (Some(bp), Width::Default) => format!("col-{bp}"),
        (Some(bp), Width::Span(n)) => format!("col-{bp}-{n}"),
    })
}

/// All grid classes of a column, smallest breakpoint first.
pub fn column_classes(column: &ColumnData) -> Vec<String> {
    Breakpoint::ALL
        .iter()
        .filter_map(|bp| resolve_width_class(*bp, column.width(*bp).value().copied()))
        .collect()
}

/// Column span for a column dragged to `end_size_px` inside a row `full_width_px` wide.
///
/// `round(12 / (full / end))`, half rounded up, clamped to `1..=12`. A column is never
/// hidden through its width; disabling the node does that.
pub fn col_span(end_size_px: f64, full_width_px: f64) -> DomainResult<u8> {
    if !full_width_px.is_finite() || full_width_px <= 0.0 {
        return Err(DomainError::InvalidResize(format!(
            "row width must be positive, got {full_width_px}"
        )));
    }
    if !end_size_px.is_finite() || end_size_px < 0.0 {
        return Err(DomainError::InvalidResize(format!(
            "column width must not be negative, got {end_size_px}"
        )));
    }
    let columns = GRID_COLUMNS as f64;
    // same ratio as 12 / (full / end), without the intermediate division
    let exact = columns * end_size_px / full_width_px;
    let rounded = (exact + 0.5).floor();
    Ok(rounded.clamp(1.0, columns) as u8)
}

/// Store the span matching a resize gesture as the column's width at `breakpoint`.
#[instrument(level = "debug", skip(tree))]
pub fn resize_column(
    tree: &Tree,
    uuid: &NodeId,
    breakpoint: Breakpoint,
    end_size_px: f64,
    full_width_px: f64,
) -> DomainResult<Tree> {
    let span = col_span(end_size_px, full_width_px)?;
    debug!("resize {} at {} -> span {}", uuid, breakpoint, span);
    tree.set_field(uuid, NodeField::Width(breakpoint, Field::Set(Width::Span(span))))
}

/// Padding or margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacingKind {
    Padding,
    Margin,
}

impl SpacingKind {
    fn prefix(&self) -> char {
        match self {
            SpacingKind::Padding => 'p',
            SpacingKind::Margin => 'm',
        }
    }
}

/// Spacing utility class for one side, e.g. `pt-3`, `mb-md-auto`.
///
/// `auto` only exists for margins; a padding of `auto` yields no class.
pub fn resolve_spacing_class(
    kind: SpacingKind,
    side: Side,
    breakpoint: Breakpoint,
    value: Spacing,
) -> Option<String> {
    if kind == SpacingKind::Padding && value == Spacing::Auto {
        return None;
    }
    let property = format!("{}{}", kind.prefix(), side.abbrev());
    Some(match breakpoint.infix() {
        None => format!("{property}-{value}"),
        Some(bp) => format!("{property}-{bp}-{value}"),
    })
}

fn rule_classes(kind: SpacingKind, rule: &SpacingRule) -> impl Iterator<Item = String> + '_ {
    Side::ALL.into_iter().filter_map(move |side| match rule.side(side) {
        Field::Set(value) => resolve_spacing_class(kind, side, rule.breakpoint, *value),
        _ => None,
    })
}

/// Spacing classes for a node's settings, paddings first, in rule order.
pub fn spacing_classes(settings: &LayoutSettings) -> Vec<String> {
    let paddings = settings.paddings.value().into_iter().flatten().flat_map(|r| rule_classes(SpacingKind::Padding, r));
    let margins = settings.margins.value().into_iter().flatten().flat_map(|r| rule_classes(SpacingKind::Margin, r));
    paddings.chain(margins).collect()
}
