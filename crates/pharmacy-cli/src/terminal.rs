//! Terminal stand-ins for the login page's message banner, submit button
//! and browser navigation.

use std::sync::Mutex;

use pharmacy_core::login::{NavigationTarget, Navigator, Notice, NoticeKind, Notifier, SubmitControl};

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => eprintln!("✓ {}", notice.message),
            NoticeKind::Error => eprintln!("✗ {}", notice.message),
        }
    }
}

/// Records the redirect so `main` can report it after the flow finishes
#[derive(Default)]
pub struct TerminalNavigator {
    target: Mutex<Option<NavigationTarget>>,
}

impl TerminalNavigator {
    pub fn target(&self) -> Option<NavigationTarget> {
        self.target.lock().ok().and_then(|t| t.clone())
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, target: &NavigationTarget) {
        println!("Open: {}", target.absolute);
        if let Ok(mut slot) = self.target.lock() {
            *slot = Some(target.clone());
        }
    }
}

pub struct TerminalSubmit;

impl SubmitControl for TerminalSubmit {
    fn set_busy(&self, label: &str) {
        eprintln!("{}", label);
    }

    fn reset(&self) {}
}
