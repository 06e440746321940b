/// Seam between the wizard engine and whatever is rendering it. The engine
/// mutates the control tree directly; anything that leaves the tree, such as
/// dialogs and page navigation, goes through this trait.
pub trait PageEffects {
    /// Blocking error dialog. `body` may be empty when the title carries the
    /// whole message.
    fn alert_error(&mut self, title: &str, body: &str);

    /// Blocking success dialog; returns whether it was acknowledged.
    fn confirm_success(&mut self, title: &str, body: &str) -> bool;

    /// Viewport reset after a section transition.
    fn scroll_to_top(&mut self) {}

    /// Full navigation to a new location.
    fn navigate(&mut self, _path: &str) {}
}

/// Swallows every effect; used by headless flows and benchmarks.
#[derive(Debug, Default)]
pub struct SilentEffects;

impl PageEffects for SilentEffects {
    fn alert_error(&mut self, _title: &str, _body: &str) {}

    fn confirm_success(&mut self, _title: &str, _body: &str) -> bool {
        true
    }
}
