//! Shared application state

use std::sync::Arc;

use purchase_portal_core::{FormTemplate, SubmissionService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SubmissionService>,
    pub template: Arc<FormTemplate>,
}

impl AppState {
    pub fn new(service: Arc<SubmissionService>, template: Arc<FormTemplate>) -> Self {
        Self { service, template }
    }
}
