use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::{LoginFlow, LoginOutcome};

/// One submission of the login form.
#[derive(Debug, Clone, Default)]
pub struct FormSubmission {
    fields: HashMap<String, String>,
    default_prevented: bool,
}

impl FormSubmission {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self {
            fields,
            default_prevented: false,
        }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Stop the host from performing its own submission
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// The login form. Holds at most one submit listener.
#[derive(Default)]
pub struct LoginForm {
    listener: OnceLock<Arc<LoginFlow>>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `flow` as the submit listener.
    /// Returns false, keeping the existing listener, if one is already bound.
    pub fn bind(&self, flow: Arc<LoginFlow>) -> bool {
        let attached = self.listener.set(flow).is_ok();
        if !attached {
            debug!("Login form already bound, skipping");
        }
        attached
    }

    pub fn is_bound(&self) -> bool {
        self.listener.get().is_some()
    }

    /// Dispatch a submission to the bound listener, if any
    pub async fn submit(&self, fields: HashMap<String, String>) -> Option<LoginOutcome> {
        let flow = self.listener.get()?;
        let mut submission = FormSubmission::new(fields);
        Some(flow.handle_submit(&mut submission).await)
    }
}
