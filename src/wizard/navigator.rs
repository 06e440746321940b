use crate::wizard::effects::PageEffects;
use crate::wizard::tree::ControlTree;
use crate::wizard::validator;

/// Modal title shown when forward navigation is blocked by an incomplete
/// section.
pub const REQUIRED_FIELDS_TITLE: &str = "Please fill out all required fields before proceeding.";

/// What a navigation request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved,
    /// Forward move refused because the current section failed validation.
    Blocked,
    /// Request referenced a step that does not exist; nothing changed.
    Ignored,
}

/// Tracks the active step and drives section transitions. Forward moves are
/// gated on the current section validating; backward moves always go
/// through.
#[derive(Debug, Clone)]
pub struct StepNavigator {
    current: u32,
}

impl Default for StepNavigator {
    fn default() -> Self {
        StepNavigator::new()
    }
}

impl StepNavigator {
    pub fn new() -> Self {
        StepNavigator { current: 1 }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// Lands on the first section and renders the initial progress state.
    pub fn init(&mut self, tree: &mut ControlTree) {
        let Some(first) = tree.first_step() else {
            return;
        };
        self.current = first;
        tree.show_only(first);
        tree.set_progress(progress_for(first, tree.total_steps()));
        tree.set_chips_for(first);
    }

    /// Requests a move to `target`. Forward moves validate the current
    /// section first; on failure the first failing control is focused and a
    /// blocking alert raised. Backward moves skip the gate so visitors can
    /// always revisit earlier answers.
    pub fn go_to(
        &mut self,
        tree: &mut ControlTree,
        effects: &mut dyn PageEffects,
        target: u32,
    ) -> NavOutcome {
        if !tree.has_section(target) || !tree.has_section(self.current) {
            return NavOutcome::Ignored;
        }
        if target > self.current {
            let outcome = validator::validate_section(tree, self.current);
            if !outcome.ok() {
                if let Some(id) = outcome.first_failing_control() {
                    tree.focus(id);
                }
                effects.alert_error(REQUIRED_FIELDS_TITLE, "");
                return NavOutcome::Blocked;
            }
        }
        self.transition(tree, effects, target);
        NavOutcome::Moved
    }

    /// Moves without the validation gate. Used when the engine itself needs
    /// to surface a section, e.g. to show restored server errors.
    pub fn jump_to(
        &mut self,
        tree: &mut ControlTree,
        effects: &mut dyn PageEffects,
        target: u32,
    ) -> NavOutcome {
        if !tree.has_section(target) {
            return NavOutcome::Ignored;
        }
        self.transition(tree, effects, target);
        NavOutcome::Moved
    }

    fn transition(&mut self, tree: &mut ControlTree, effects: &mut dyn PageEffects, target: u32) {
        tree.set_section_visible(self.current, false);
        tree.set_section_visible(target, true);
        tree.set_progress(progress_for(target, tree.total_steps()));
        tree.set_chips_for(target);
        tree.focus_first_in(target);
        effects.scroll_to_top();
        self.current = target;
    }
}

/// Percentage of the journey the target step represents, rounded to the
/// nearest whole number.
pub fn progress_for(step: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    ((step as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog;
    use crate::wizard::effects::PageEffects;
    use crate::wizard::tree::{ChipState, ControlTree};

    #[derive(Default)]
    struct Recorder {
        alerts: Vec<String>,
        scrolls: usize,
    }

    impl PageEffects for Recorder {
        fn alert_error(&mut self, title: &str, _body: &str) {
            self.alerts.push(title.to_string());
        }

        fn confirm_success(&mut self, _title: &str, _body: &str) -> bool {
            true
        }

        fn scroll_to_top(&mut self) {
            self.scrolls += 1;
        }
    }

    fn wizard() -> (ControlTree, StepNavigator) {
        let mut tree = ControlTree::from_spec(&catalog::cash_buyer());
        let mut nav = StepNavigator::new();
        nav.init(&mut tree);
        (tree, nav)
    }

    fn fill_contact_section(tree: &mut ControlTree) {
        for (name, value) in [
            ("FullName", "Ada Lovelace"),
            ("CellPhone", "555-123-4567"),
            ("Email", "ada@example.com"),
            ("Address", "12 Analytical Way"),
        ] {
            if let Some(id) = tree.first_named(name) {
                tree.set_value(id, value);
            }
        }
    }

    #[test]
    fn init_lands_on_step_one() {
        let (tree, nav) = wizard();
        assert_eq!(nav.current(), 1);
        assert_eq!(tree.visible_step(), Some(1));
        assert_eq!(tree.progress(), 25);
        assert_eq!(tree.chips()[0], ChipState::Active);
    }

    #[test]
    fn forward_is_gated_on_validation() {
        let (mut tree, mut nav) = wizard();
        let mut fx = Recorder::default();
        assert_eq!(nav.go_to(&mut tree, &mut fx, 2), NavOutcome::Blocked);
        assert_eq!(nav.current(), 1);
        assert_eq!(fx.alerts, vec![REQUIRED_FIELDS_TITLE.to_string()]);
        // The first failing control took focus.
        let focused = tree.focused().unwrap();
        assert_eq!(tree.control(focused).name, "FullName");
    }

    #[test]
    fn forward_moves_once_the_section_is_complete() {
        let (mut tree, mut nav) = wizard();
        let mut fx = Recorder::default();
        fill_contact_section(&mut tree);
        assert_eq!(nav.go_to(&mut tree, &mut fx, 2), NavOutcome::Moved);
        assert_eq!(nav.current(), 2);
        assert_eq!(tree.visible_step(), Some(2));
        assert_eq!(tree.progress(), 50);
        assert_eq!(tree.chips()[0], ChipState::Complete);
        assert_eq!(tree.chips()[1], ChipState::Active);
        assert_eq!(fx.scrolls, 1);
    }

    #[test]
    fn backward_skips_the_gate() {
        let (mut tree, mut nav) = wizard();
        let mut fx = Recorder::default();
        fill_contact_section(&mut tree);
        assert_eq!(nav.go_to(&mut tree, &mut fx, 2), NavOutcome::Moved);
        // Section 2 is untouched and invalid, but going back is free.
        assert_eq!(nav.go_to(&mut tree, &mut fx, 1), NavOutcome::Moved);
        assert_eq!(nav.current(), 1);
        assert!(fx.alerts.is_empty());
    }

    #[test]
    fn unknown_targets_are_ignored() {
        let (mut tree, mut nav) = wizard();
        let mut fx = Recorder::default();
        assert_eq!(nav.go_to(&mut tree, &mut fx, 99), NavOutcome::Ignored);
        assert_eq!(nav.current(), 1);
        assert!(fx.alerts.is_empty());
        assert_eq!(tree.visible_step(), Some(1));
    }

    #[test]
    fn progress_rounds_to_nearest_percent() {
        assert_eq!(progress_for(2, 3), 67);
        assert_eq!(progress_for(1, 3), 33);
        assert_eq!(progress_for(3, 3), 100);
        assert_eq!(progress_for(1, 4), 25);
        assert_eq!(progress_for(0, 0), 0);
    }

    #[test]
    fn focus_lands_on_first_usable_control() {
        let (mut tree, mut nav) = wizard();
        let mut fx = Recorder::default();
        fill_contact_section(&mut tree);
        nav.go_to(&mut tree, &mut fx, 2);
        let focused = tree.focused().unwrap();
        assert_eq!(tree.control(focused).name, "YearsInBusiness");
    }
}
