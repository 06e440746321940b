//! Dual-handle price range: two sliders and two numeric inputs kept in
//! lockstep, folded into a hidden composite value at the end of every sync.
//! The sync never fails; unparseable input degrades to the slider bounds.

use crate::schema::RangeSpec;
use crate::wizard::tree::{ControlTree, RangeVisual};

/// Which control kicked off a sync. The trigger side's value is taken as
/// given; the other side falls back from slider to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeTrigger {
    MinSlider,
    MaxSlider,
    MinInput,
    MaxInput,
    /// Programmatic recompute with no preferred side.
    None,
}

/// Resolved range after a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeState {
    pub min: i64,
    pub max: i64,
}

/// Parses a raw control value the way number coercion would: a float is
/// accepted and rounded to a whole amount, anything else is `None`.
fn parse_amount(raw: &str) -> Option<i64> {
    raw.trim().parse::<f64>().ok().map(|f| f.round() as i64)
}

/// Reconciles the four range controls and republishes every derived surface:
/// the controls themselves, the track visual, the formatted summary label,
/// and the hidden composite. Returns the resolved range, or `None` when the
/// form has no complete set of range controls (in which case nothing is
/// touched).
pub fn sync(tree: &mut ControlTree, spec: &RangeSpec, trigger: RangeTrigger) -> Option<RangeState> {
    let min_input = tree.first_named(&spec.min_input)?;
    let max_input = tree.first_named(&spec.max_input)?;
    let min_slider = tree.first_named(&spec.min_slider)?;
    let max_slider = tree.first_named(&spec.max_slider)?;

    let (lo, hi) = tree
        .control(min_slider)
        .bounds
        .or(tree.control(max_slider).bounds)?;

    let min_slider_raw = tree.control(min_slider).value.clone();
    let max_slider_raw = tree.control(max_slider).value.clone();
    let min_input_raw = tree.control(min_input).value.clone();
    let max_input_raw = tree.control(max_input).value.clone();

    let mut min = match trigger {
        RangeTrigger::MinSlider => parse_amount(&min_slider_raw),
        RangeTrigger::MinInput => parse_amount(&min_input_raw),
        _ => parse_amount(&min_slider_raw).or_else(|| parse_amount(&min_input_raw)),
    }
    .unwrap_or(lo);
    let mut max = match trigger {
        RangeTrigger::MaxSlider => parse_amount(&max_slider_raw),
        RangeTrigger::MaxInput => parse_amount(&max_input_raw),
        _ => parse_amount(&max_slider_raw).or_else(|| parse_amount(&max_input_raw)),
    }
    .unwrap_or(hi);

    min = min.clamp(lo, hi);
    max = max.clamp(lo, hi);

    if min > max {
        // The side the user is dragging wins; the other follows.
        match trigger {
            RangeTrigger::MinSlider | RangeTrigger::MinInput => max = min,
            RangeTrigger::MaxSlider | RangeTrigger::MaxInput => min = max,
            RangeTrigger::None => std::mem::swap(&mut min, &mut max),
        }
    }

    tree.set_value(min_slider, min.to_string());
    tree.set_value(max_slider, max.to_string());
    tree.set_value(min_input, min.to_string());
    tree.set_value(max_input, max.to_string());

    let span = (hi - lo) as f64;
    let visual = if span <= 0.0 {
        RangeVisual {
            left_pct: 0.0,
            right_pct: 100.0,
        }
    } else {
        RangeVisual {
            left_pct: (min - lo) as f64 / span * 100.0,
            right_pct: (max - lo) as f64 / span * 100.0,
        }
    };
    tree.set_range_visual(visual);

    tree.set_label(
        &spec.summary,
        format!("{} - {}", format_usd(min), format_usd(max)),
    );

    let step = tree.control(min_input).step;
    let composite = tree.ensure_hidden(&spec.composite, step);
    tree.set_value(composite, format!("{min} - {max}"));

    Some(RangeState { min, max })
}

/// Formats a whole-dollar amount with thousands separators, e.g. `$250,000`.
pub fn format_usd(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Pulls the first two digit runs out of a composite value such as
/// `"25000 - 250000"`. Anything that is not a digit separates runs, so
/// comma-grouped amounts split at their separators; composites are written
/// ungrouped for exactly that reason.
pub fn parse_composite(raw: &str) -> Option<RangeState> {
    let mut numbers = raw
        .split(|c: char| !c.is_ascii_digit())
        .filter(|chunk| !chunk.is_empty())
        .filter_map(|chunk| chunk.parse::<i64>().ok());
    let min = numbers.next()?;
    let max = numbers.next()?;
    Some(RangeState { min, max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog;
    use crate::wizard::tree::ControlTree;

    fn setup() -> (ControlTree, RangeSpec) {
        let spec = catalog::cash_buyer();
        let range = spec.range.clone().unwrap();
        (ControlTree::from_spec(&spec), range)
    }

    fn set(tree: &mut ControlTree, name: &str, value: &str) {
        let id = tree.first_named(name).unwrap();
        tree.set_value(id, value);
    }

    fn value_of(tree: &ControlTree, name: &str) -> String {
        tree.control(tree.first_named(name).unwrap()).value.clone()
    }

    #[test]
    fn all_four_controls_agree_after_a_sync() {
        let (mut tree, range) = setup();
        set(&mut tree, "priceRangeMinSlider", "100000");
        set(&mut tree, "priceRangeMaxSlider", "400000");
        let state = sync(&mut tree, &range, RangeTrigger::MinSlider).unwrap();
        assert_eq!(state, RangeState { min: 100_000, max: 400_000 });
        assert_eq!(value_of(&tree, "PriceRangesMin"), "100000");
        assert_eq!(value_of(&tree, "PriceRangesMax"), "400000");
        assert_eq!(value_of(&tree, "priceRangeMinSlider"), "100000");
        assert_eq!(value_of(&tree, "priceRangeMaxSlider"), "400000");
        assert_eq!(value_of(&tree, "PriceRanges"), "100000 - 400000");
    }

    #[test]
    fn typed_input_wins_over_its_slider_when_triggered() {
        let (mut tree, range) = setup();
        set(&mut tree, "PriceRangesMin", "250000");
        let state = sync(&mut tree, &range, RangeTrigger::MinInput).unwrap();
        assert_eq!(state.min, 250_000);
        assert_eq!(value_of(&tree, "priceRangeMinSlider"), "250000");
    }

    #[test]
    fn unparseable_input_degrades_to_the_bound() {
        let (mut tree, range) = setup();
        set(&mut tree, "PriceRangesMin", "abc");
        set(&mut tree, "priceRangeMinSlider", "abc");
        let state = sync(&mut tree, &range, RangeTrigger::MinInput).unwrap();
        assert_eq!(state.min, 0);
        assert_eq!(value_of(&tree, "PriceRangesMin"), "0");
    }

    #[test]
    fn values_clamp_to_bounds() {
        let (mut tree, range) = setup();
        set(&mut tree, "PriceRangesMax", "9000000");
        set(&mut tree, "priceRangeMaxSlider", "9000000");
        let state = sync(&mut tree, &range, RangeTrigger::MaxInput).unwrap();
        assert_eq!(state.max, 1_000_000);
    }

    #[test]
    fn crossed_handles_follow_the_trigger() {
        let (mut tree, range) = setup();
        set(&mut tree, "priceRangeMaxSlider", "300000");
        sync(&mut tree, &range, RangeTrigger::MaxSlider).unwrap();
        // Dragging min past max pulls max along.
        set(&mut tree, "priceRangeMinSlider", "500000");
        let state = sync(&mut tree, &range, RangeTrigger::MinSlider).unwrap();
        assert_eq!(state, RangeState { min: 500_000, max: 500_000 });
        // And dragging max below min pulls min down.
        set(&mut tree, "priceRangeMaxSlider", "200000");
        let state = sync(&mut tree, &range, RangeTrigger::MaxSlider).unwrap();
        assert_eq!(state, RangeState { min: 200_000, max: 200_000 });
    }

    #[test]
    fn undirected_sync_swaps_a_crossed_pair() {
        let (mut tree, range) = setup();
        set(&mut tree, "priceRangeMinSlider", "800000");
        set(&mut tree, "priceRangeMaxSlider", "200000");
        let state = sync(&mut tree, &range, RangeTrigger::None).unwrap();
        assert_eq!(state, RangeState { min: 200_000, max: 800_000 });
    }

    #[test]
    fn fractional_input_rounds_like_number_coercion() {
        let (mut tree, range) = setup();
        set(&mut tree, "PriceRangesMin", "1000.6");
        let state = sync(&mut tree, &range, RangeTrigger::MinInput).unwrap();
        assert_eq!(state.min, 1001);
    }

    #[test]
    fn summary_label_is_currency_formatted() {
        let (mut tree, range) = setup();
        set(&mut tree, "priceRangeMinSlider", "25000");
        set(&mut tree, "priceRangeMaxSlider", "250000");
        sync(&mut tree, &range, RangeTrigger::MinSlider).unwrap();
        assert_eq!(
            tree.label("priceRangeSummary"),
            Some("$25,000 - $250,000")
        );
    }

    #[test]
    fn track_visual_tracks_the_handles() {
        let (mut tree, range) = setup();
        set(&mut tree, "priceRangeMinSlider", "250000");
        set(&mut tree, "priceRangeMaxSlider", "750000");
        sync(&mut tree, &range, RangeTrigger::MinSlider).unwrap();
        let visual = tree.range_visual();
        assert!((visual.left_pct - 25.0).abs() < f64::EPSILON);
        assert!((visual.right_pct - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_controls_leave_everything_untouched() {
        let spec = catalog::fast_sell();
        let mut tree = ControlTree::from_spec(&spec);
        let range = catalog::cash_buyer().range.unwrap();
        assert!(sync(&mut tree, &range, RangeTrigger::None).is_none());
        assert!(tree.first_named("PriceRanges").is_none());
    }

    #[test]
    fn format_usd_groups_digits() {
        assert_eq!(format_usd(0), "$0");
        assert_eq!(format_usd(999), "$999");
        assert_eq!(format_usd(1_000), "$1,000");
        assert_eq!(format_usd(1_234_567), "$1,234,567");
    }

    #[test]
    fn composite_parsing_takes_first_two_digit_runs() {
        assert_eq!(
            parse_composite("25000 - 250000"),
            Some(RangeState { min: 25_000, max: 250_000 })
        );
        assert_eq!(
            parse_composite("from 5000 up to 90000 dollars"),
            Some(RangeState { min: 5_000, max: 90_000 })
        );
        assert_eq!(parse_composite("no numbers"), None);
        assert_eq!(parse_composite("12345"), None);
    }
}
