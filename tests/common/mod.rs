use std::path::PathBuf;
use std::sync::Mutex;

use intake_core::wizard::PageEffects;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated scratch directory and parks its guard for the run.
#[allow(dead_code)]
pub fn scratch_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Records every effect a page raises; success dialogs answer with a
/// scripted value.
pub struct RecordingEffects {
    pub alerts: Vec<(String, String)>,
    pub confirmations: Vec<(String, String)>,
    pub confirm_answer: bool,
    pub scrolls: usize,
    pub navigations: Vec<String>,
}

#[allow(dead_code)]
impl RecordingEffects {
    pub fn new() -> Self {
        RecordingEffects {
            alerts: Vec::new(),
            confirmations: Vec::new(),
            confirm_answer: true,
            scrolls: 0,
            navigations: Vec::new(),
        }
    }

    pub fn answering(confirm_answer: bool) -> Self {
        RecordingEffects {
            confirm_answer,
            ..Self::new()
        }
    }
}

impl PageEffects for RecordingEffects {
    fn alert_error(&mut self, title: &str, body: &str) {
        self.alerts.push((title.to_string(), body.to_string()));
    }

    fn confirm_success(&mut self, title: &str, body: &str) -> bool {
        self.confirmations
            .push((title.to_string(), body.to_string()));
        self.confirm_answer
    }

    fn scroll_to_top(&mut self) {
        self.scrolls += 1;
    }

    fn navigate(&mut self, path: &str) {
        self.navigations.push(path.to_string());
    }
}
