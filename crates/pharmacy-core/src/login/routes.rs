//! Role-based landing pages and how to reach them from the login page.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Landing page chosen after login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Admin,
    Pharmacist,
    Cashier,
}

impl Destination {
    /// Map a backend role to its landing page.
    /// Case and surrounding whitespace are ignored; anything unrecognized
    /// (or no role at all) lands on the admin dashboard.
    pub fn for_role(role: Option<&str>) -> Self {
        match role.map(|r| r.trim().to_lowercase()).as_deref() {
            Some("pharmacist") => Destination::Pharmacist,
            Some("cashier") => Destination::Cashier,
            _ => Destination::Admin,
        }
    }
}

/// Page for each destination, relative to the application base path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRoutes {
    pub admin: String,
    pub pharmacist: String,
    pub cashier: String,
}

impl Default for PageRoutes {
    fn default() -> Self {
        Self {
            admin: "dashboard.html".to_string(),
            pharmacist: "pharmacist_dashboard.html".to_string(),
            cashier: "cashier_dashboard.html".to_string(),
        }
    }
}

impl PageRoutes {
    pub fn page(&self, destination: Destination) -> &str {
        match destination {
            Destination::Admin => &self.admin,
            Destination::Pharmacist => &self.pharmacist,
            Destination::Cashier => &self.cashier,
        }
    }
}

/// Where to send the browser, in both forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub destination: Destination,
    /// Relative to the directory of the current page
    pub relative: String,
    /// Current origin + base path + page
    pub absolute: Url,
}

/// Resolves every destination once, up front.
#[derive(Debug, Clone)]
pub struct PageResolver {
    admin: NavigationTarget,
    pharmacist: NavigationTarget,
    cashier: NavigationTarget,
}

impl PageResolver {
    pub fn new(page_url: &str, app_base_path: &str, routes: &PageRoutes) -> Result<Self> {
        let current = Url::parse(page_url)
            .with_context(|| format!("Invalid page URL: {page_url}"))?;

        let mut base_path = format!("/{}", app_base_path.trim_matches('/'));
        if !base_path.ends_with('/') {
            base_path.push('/');
        }
        let app_root = current
            .join(&base_path)
            .with_context(|| format!("Invalid base path: {app_base_path}"))?;

        let target = |destination: Destination| -> Result<NavigationTarget> {
            let page = routes.page(destination).trim_start_matches('/');
            let absolute = app_root
                .join(page)
                .with_context(|| format!("Invalid page path: {page}"))?;
            let relative = current
                .make_relative(&absolute)
                .unwrap_or_else(|| absolute.to_string());
            Ok(NavigationTarget {
                destination,
                relative,
                absolute,
            })
        };

        Ok(Self {
            admin: target(Destination::Admin)?,
            pharmacist: target(Destination::Pharmacist)?,
            cashier: target(Destination::Cashier)?,
        })
    }

    pub fn resolve(&self, destination: Destination) -> &NavigationTarget {
        match destination {
            Destination::Admin => &self.admin,
            Destination::Pharmacist => &self.pharmacist,
            Destination::Cashier => &self.cashier,
        }
    }

    pub fn for_role(&self, role: Option<&str>) -> &NavigationTarget {
        self.resolve(Destination::for_role(role))
    }
}
