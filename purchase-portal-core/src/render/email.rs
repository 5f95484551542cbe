//! Notification email bodies

use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::Serialize;

use super::{format_timestamp, RenderedSection};
use crate::error::RenderError;
use crate::form::{Action, FormData};

pub(super) const EMAIL_TEMPLATE: &str = "notification_email";
pub(super) const EMAIL_TEMPLATE_SOURCE: &str = include_str!("email.hbs");

const HEADING: &str = "Purchase Agreement Form Submission";
const FOOTER: [&str; 2] = [
    "This is an automated email from the Purchase Agreement Portal.",
    "Do not reply to this email.",
];

#[derive(Serialize)]
struct EmailView<'a> {
    heading: &'a str,
    action: &'a str,
    submitted_at: String,
    sections: Vec<SectionView<'a>>,
    footer: &'a [&'a str],
}

#[derive(Serialize)]
struct SectionView<'a> {
    title: &'a str,
    fields: Vec<FieldView<'a>>,
}

#[derive(Serialize)]
struct FieldView<'a> {
    label: &'a str,
    value_html: String,
}

pub(super) fn subject(form: &FormData, action: Action) -> String {
    format!(
        "Purchase Agreement {} - {}",
        action.subject_label(),
        form.value("buyerName").unwrap_or("New Agreement")
    )
}

pub(super) fn render_html(
    handlebars: &Handlebars<'static>,
    sections: &[RenderedSection],
    action: Action,
    submitted_at: DateTime<Utc>,
) -> Result<String, RenderError> {
    let view = EmailView {
        heading: HEADING,
        action: action.as_str(),
        submitted_at: format_timestamp(submitted_at),
        sections: sections
            .iter()
            .map(|s| SectionView {
                title: &s.title,
                fields: s
                    .fields
                    .iter()
                    .map(|f| FieldView {
                        label: &f.label,
                        value_html: value_html(&f.value),
                    })
                    .collect(),
            })
            .collect(),
        footer: &FOOTER,
    };
    Ok(handlebars.render(EMAIL_TEMPLATE, &view)?)
}

pub(super) fn render_text(
    sections: &[RenderedSection],
    action: Action,
    submitted_at: DateTime<Utc>,
) -> String {
    let mut out = format!(
        "{}\nAction: {}\nSubmitted: {}\n\n",
        HEADING,
        action,
        format_timestamp(submitted_at)
    );
    for section in sections {
        out.push_str(&section.title);
        out.push('\n');
        out.push_str(&"-".repeat(section.title.chars().count()));
        out.push('\n');
        for field in &section.fields {
            out.push_str(&format!("{}: {}\n", field.label, field.value));
        }
        out.push('\n');
    }
    out.push_str(&FOOTER.join("\n"));
    out.push('\n');
    out
}

/// Escape a value for HTML and turn line breaks into `<br>`
fn value_html(value: &str) -> String {
    handlebars::html_escape(value)
        .replace("\r\n", "\n")
        .replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderedField;
    use chrono::TimeZone;

    #[test]
    fn test_value_html() {
        assert_eq!(value_html("a & b"), "a &amp; b");
        assert_eq!(value_html("line1\r\nline2\nline3"), "line1<br>line2<br>line3");
    }

    #[test]
    fn test_render_text_layout() {
        let sections = vec![RenderedSection {
            title: "Party Information".into(),
            fields: vec![RenderedField {
                label: "Buyer Name".into(),
                value: "Acme".into(),
            }],
        }];
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let text = render_text(&sections, Action::Download, at);
        assert_eq!(
            text,
            "Purchase Agreement Form Submission\n\
             Action: download\n\
             Submitted: 2024-05-06 07:08:09 UTC\n\
             \n\
             Party Information\n\
             -----------------\n\
             Buyer Name: Acme\n\
             \n\
             This is an automated email from the Purchase Agreement Portal.\n\
             Do not reply to this email.\n"
        );
    }

    #[test]
    fn test_subject_ignores_blank_buyer() {
        let form = FormData::new().with("buyerName", "  ");
        assert_eq!(
            subject(&form, Action::Save),
            "Purchase Agreement Draft Saved - New Agreement"
        );
    }
}
