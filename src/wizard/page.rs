//! A page of one or more wizard forms plus the address bar state. Mirrors
//! how the engine actually runs: forms live inside a page, and the page URL
//! carries the transient query parameters the restore flow consumes.

use crate::schema::{FormSpec, MergeSpec, RangeSpec, ReadinessSpec, ToggleSpec};
use crate::wizard::dispatch;
use crate::wizard::navigator::StepNavigator;
use crate::wizard::range::{self, RangeTrigger};
use crate::wizard::tree::ControlTree;

/// One mounted form: its control tree, navigator, and the behavior wiring
/// taken from the schema.
#[derive(Debug, Clone)]
pub struct WizardForm {
    pub id: String,
    pub title: String,
    pub tree: ControlTree,
    pub nav: StepNavigator,
    pub range: Option<RangeSpec>,
    pub toggles: Vec<ToggleSpec>,
    pub merges: Vec<MergeSpec>,
    pub comments_field: Option<String>,
    pub readiness: Option<ReadinessSpec>,
    pub canonical_path: String,
    pub restore_path: Option<String>,
}

impl WizardForm {
    pub fn from_spec(spec: &FormSpec) -> Self {
        WizardForm {
            id: spec.id.clone(),
            title: spec.title.clone(),
            tree: ControlTree::from_spec(spec),
            nav: StepNavigator::new(),
            range: spec.range.clone(),
            toggles: spec.toggles.clone(),
            merges: spec.merges.clone(),
            comments_field: spec.comments_field.clone(),
            readiness: spec.readiness.clone(),
            canonical_path: spec.canonical_path.clone(),
            restore_path: spec.restore_path.clone(),
        }
    }

    /// First render: land on the opening section and bring every derived
    /// surface (toggles, range, readiness label) in line with the initial
    /// values.
    pub fn init(&mut self) {
        self.nav.init(&mut self.tree);
        self.refresh_derived();
    }

    /// Re-runs everything that is computed from control values. Called after
    /// bulk value changes such as a restore.
    pub fn refresh_derived(&mut self) {
        if let Some(spec) = self.range.clone() {
            range::sync(&mut self.tree, &spec, RangeTrigger::None);
        }
        dispatch::apply_all_toggles(self);
        if let Some(spec) = self.readiness.clone() {
            dispatch::update_readiness(&mut self.tree, &spec);
        }
    }
}

/// Address bar model: a path plus query parameters in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl PageUrl {
    pub fn new(path: impl Into<String>) -> Self {
        PageUrl {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Drops the named parameters, the equivalent of a history rewrite that
    /// leaves the rest of the URL alone.
    pub fn strip(&mut self, keys: &[&str]) {
        self.query.retain(|(k, _)| !keys.contains(&k.as_str()));
    }

    pub fn href(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// The forms mounted on one page, plus its URL.
#[derive(Debug, Clone)]
pub struct Page {
    pub forms: Vec<WizardForm>,
    pub url: PageUrl,
}

impl Page {
    pub fn new(url: PageUrl) -> Self {
        Page {
            forms: Vec::new(),
            url,
        }
    }

    /// Page holding a single mounted form.
    pub fn single(form: WizardForm, url: PageUrl) -> Self {
        Page {
            forms: vec![form],
            url,
        }
    }

    pub fn add_form(&mut self, form: WizardForm) {
        self.forms.push(form);
    }

    /// Resolves which form a submission targets. An explicit id must match
    /// exactly; otherwise the default id is tried, then the older markup
    /// revision, then the first mounted form.
    pub fn resolve_form(&self, explicit: Option<&str>) -> Option<usize> {
        use crate::schema::catalog::{DEFAULT_FORM_ID, PREVIEW_FORM_ID};
        match explicit {
            Some(id) => self.forms.iter().position(|f| f.id == id),
            None => self
                .forms
                .iter()
                .position(|f| f.id == DEFAULT_FORM_ID)
                .or_else(|| self.forms.iter().position(|f| f.id == PREVIEW_FORM_ID))
                .or(if self.forms.is_empty() { None } else { Some(0) }),
        }
    }

    pub fn form_mut(&mut self, id: &str) -> Option<&mut WizardForm> {
        self.forms.iter_mut().find(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog;

    #[test]
    fn init_brings_derived_state_in_line() {
        let mut form = WizardForm::from_spec(&catalog::cash_buyer());
        form.init();
        assert_eq!(form.tree.visible_step(), Some(1));
        // The composite exists right away with the default bounds.
        let composite = form.tree.first_named("PriceRanges").unwrap();
        assert_eq!(form.tree.control(composite).value, "0 - 1000000");
        assert_eq!(form.tree.label("PurchaseReadiness"), Some("Somewhat ready"));
    }

    #[test]
    fn url_round_trip_and_strip() {
        let mut url = PageUrl::new("/forms/Cash-Buyer")
            .with_query("success", "true")
            .with_query("message", "done")
            .with_query("utm_source", "ad");
        assert_eq!(url.query_get("success"), Some("true"));
        assert_eq!(
            url.href(),
            "/forms/Cash-Buyer?success=true&message=done&utm_source=ad"
        );
        url.strip(&["success", "message"]);
        assert_eq!(url.href(), "/forms/Cash-Buyer?utm_source=ad");
    }

    #[test]
    fn resolution_cascade_prefers_the_default_form() {
        let url = PageUrl::new("/forms/Cash-Buyer");
        let mut page = Page::new(url);
        page.add_form(WizardForm::from_spec(&catalog::fast_sell()));
        page.add_form(WizardForm::from_spec(&catalog::cash_buyer()));
        // No explicit id: the default form wins even when mounted second.
        assert_eq!(page.resolve_form(None), Some(1));
        // Explicit ids must match exactly.
        assert_eq!(page.resolve_form(Some("fast-sell-form")), Some(0));
        assert_eq!(page.resolve_form(Some("missing-form")), None);
    }

    #[test]
    fn resolution_falls_back_to_the_first_form() {
        let mut page = Page::new(PageUrl::new("/forms/Fast-Sell"));
        page.add_form(WizardForm::from_spec(&catalog::fast_sell()));
        assert_eq!(page.resolve_form(None), Some(0));
        assert_eq!(Page::new(PageUrl::new("/")).resolve_form(None), None);
    }
}
