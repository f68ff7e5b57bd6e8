//! Client flows: the user-facing operations built on [`crate::api::ApiClient`].
//!
//! Each flow turns transport results into outcome values the front end can
//! render directly. Flows never panic and never propagate `ApiError` past
//! their boundary.

pub mod analyze;
pub mod documents;
pub mod login;
pub mod probe;
pub mod sequence;

use std::fmt;

pub use analyze::{AnalysisView, AnalyzeFlow, AnalyzeOutcome, UploadRequest};
pub use documents::{DocumentsFlow, QueryOutcome, QueryTarget, QueryView};
pub use login::{LoginFlow, LoginOutcome, LoginState};
pub use probe::{Probe, ProbeOutcome};

/// Where the user goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Protected,
    Analysis,
    Query(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Protected => "/protected".to_string(),
            Route::Analysis => "/analysis".to_string(),
            Route::Query(id) => format!("/query/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
