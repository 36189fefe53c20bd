//! Shared test doubles for the page-facing capabilities.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use pharmacy_core::login::{
    LoginFlow, NavigationTarget, Navigator, Notice, Notifier, PageResolver, PageRoutes,
    SubmitControl,
};
use pharmacy_core::{RequestClient, SessionContext};

pub const PAGE_URL: &str = "http://pharmacy.test/app/login.html";

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl RecordingNotifier {
    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub targets: Mutex<Vec<NavigationTarget>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &NavigationTarget) {
        self.targets.lock().unwrap().push(target.clone());
    }
}

/// Submit button that remembers whether it is enabled
pub struct FakeButton {
    pub enabled: Mutex<bool>,
    pub busy_labels: Mutex<Vec<String>>,
}

impl Default for FakeButton {
    fn default() -> Self {
        Self {
            enabled: Mutex::new(true),
            busy_labels: Mutex::new(Vec::new()),
        }
    }
}

impl SubmitControl for FakeButton {
    fn set_busy(&self, label: &str) {
        *self.enabled.lock().unwrap() = false;
        self.busy_labels.lock().unwrap().push(label.to_string());
    }

    fn reset(&self) {
        *self.enabled.lock().unwrap() = true;
    }
}

impl FakeButton {
    pub fn is_enabled(&self) -> bool {
        *self.enabled.lock().unwrap()
    }
}

pub struct Harness {
    pub session: SessionContext,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub button: Arc<FakeButton>,
    pub flow: Arc<LoginFlow>,
}

/// Login flow against `base_url` with recording capabilities
pub fn harness(base_url: &str) -> Harness {
    harness_with_session(base_url, SessionContext::in_memory())
}

/// Same as `harness`, writing logins to `session`
pub fn harness_with_session(base_url: &str, session: SessionContext) -> Harness {
    let api = RequestClient::new(base_url, session.clone()).unwrap();
    let resolver = PageResolver::new(PAGE_URL, "/app/", &PageRoutes::default()).unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let button = Arc::new(FakeButton::default());

    let flow = Arc::new(LoginFlow::new(
        api,
        resolver,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
        Arc::clone(&button) as Arc<dyn SubmitControl>,
    ));

    Harness {
        session,
        notifier,
        navigator,
        button,
        flow,
    }
}
