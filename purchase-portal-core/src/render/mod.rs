//! Document rendering
//!
//! Turns form data into the notification email (HTML and plain text) and
//! into the downloadable agreement. Missing values never fail a render:
//! empty sections are dropped from the email and the agreement falls back to
//! bracketed placeholders.

mod agreement;
mod email;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use handlebars::Handlebars;

use crate::error::RenderError;
use crate::form::{Action, FormData};
use crate::template::FormTemplate;

pub use agreement::{agreement_clauses, download_file_name, render_agreement, Clause};

/// A section with at least one filled-in field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub title: String,
    pub fields: Vec<RenderedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    pub label: String,
    pub value: String,
}

/// Notification email content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Renders documents for one form template
pub struct DocumentRenderer {
    template: Arc<FormTemplate>,
    handlebars: Handlebars<'static>,
}

impl DocumentRenderer {
    pub fn new(template: Arc<FormTemplate>) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string(email::EMAIL_TEMPLATE, email::EMAIL_TEMPLATE_SOURCE)
            .map_err(Box::new)?;
        Ok(Self {
            template,
            handlebars,
        })
    }

    pub fn template(&self) -> &FormTemplate {
        &self.template
    }

    /// Sections that have at least one non-blank value, in template order.
    ///
    /// Keys not in the template are ignored.
    pub fn sections(&self, form: &FormData) -> Vec<RenderedSection> {
        self.template
            .sections
            .iter()
            .filter_map(|section| {
                let fields: Vec<RenderedField> = section
                    .fields
                    .iter()
                    .filter_map(|field| {
                        form.value(&field.name).map(|value| RenderedField {
                            label: field.display_label(),
                            value: value.to_string(),
                        })
                    })
                    .collect();
                (!fields.is_empty()).then(|| RenderedSection {
                    title: section.title.clone(),
                    fields,
                })
            })
            .collect()
    }

    /// Render the notification email for a submission
    pub fn render_email(
        &self,
        form: &FormData,
        action: Action,
        submitted_at: DateTime<Utc>,
    ) -> Result<RenderedEmail, RenderError> {
        let sections = self.sections(form);
        let html = email::render_html(&self.handlebars, &sections, action, submitted_at)?;
        let text = email::render_text(&sections, action, submitted_at);
        Ok(RenderedEmail {
            subject: email::subject(form, action),
            html,
            text,
        })
    }

    /// Render the downloadable agreement text
    pub fn render_agreement(&self, form: &FormData, generated_at: DateTime<Utc>) -> String {
        render_agreement(form, generated_at)
    }
}

/// Timestamp format used in every rendered document
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
