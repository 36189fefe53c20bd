//! Login form handling.
//!
//! - `LoginFlow`: submission lifecycle (`Idle -> Submitting -> Succeeded | Failed`)
//! - `LoginForm`: binds exactly one flow to the form
//! - `PageResolver`: role-based landing pages

pub mod flow;
pub mod form;
pub mod routes;

pub use flow::{
    LoginFlow, LoginOutcome, LoginState, Navigator, Notice, NoticeKind, Notifier, SubmitControl,
};
pub use form::{FormSubmission, LoginForm};
pub use routes::{Destination, NavigationTarget, PageResolver, PageRoutes};
