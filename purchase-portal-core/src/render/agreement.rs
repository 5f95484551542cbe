//! Downloadable plain-text agreement

use chrono::{DateTime, Utc};

use super::format_timestamp;
use crate::form::FormData;

const RULE_WIDTH: usize = 80;

/// A numbered clause of the agreement body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub number: usize,
    pub heading: &'static str,
    pub body: String,
}

fn or_placeholder<'a>(form: &'a FormData, name: &str, token: &'a str) -> &'a str {
    form.value(name).unwrap_or(token)
}

/// Clauses in document order.
///
/// Covenants and dispute resolution are only included when filled in;
/// numbers are assigned after that, so they always run 1..=N.
pub fn agreement_clauses(form: &FormData) -> Vec<Clause> {
    let mut clauses: Vec<(&'static str, String)> = vec![
        (
            "PURCHASE AND SALE OF ASSETS",
            or_placeholder(form, "assetDescription", "[ASSET DESCRIPTION]").to_string(),
        ),
        (
            "PURCHASE PRICE",
            or_placeholder(form, "purchasePrice", "[PURCHASE PRICE]").to_string(),
        ),
        (
            "PAYMENT TERMS",
            or_placeholder(form, "paymentTerms", "[PAYMENT TERMS]").to_string(),
        ),
        (
            "CLOSING",
            format!(
                "The closing of this transaction shall occur on: {}",
                or_placeholder(form, "closingDate", "[CLOSING DATE]")
            ),
        ),
        (
            "REPRESENTATIONS AND WARRANTIES",
            or_placeholder(form, "warranties", "[WARRANTIES]").to_string(),
        ),
    ];

    if let Some(covenants) = form.value("covenants") {
        clauses.push(("COVENANTS AND AGREEMENTS", covenants.to_string()));
    }
    clauses.push((
        "INDEMNIFICATION",
        or_placeholder(form, "indemnification", "[INDEMNIFICATION]").to_string(),
    ));
    if let Some(disputes) = form.value("disputeResolution") {
        clauses.push(("DISPUTE RESOLUTION", disputes.to_string()));
    }
    clauses.push((
        "GOVERNING LAW",
        format!(
            "This Agreement shall be governed by the laws of {}.",
            or_placeholder(form, "governingLaw", "[GOVERNING LAW]")
        ),
    ));

    clauses
        .into_iter()
        .enumerate()
        .map(|(i, (heading, body))| Clause {
            number: i + 1,
            heading,
            body,
        })
        .collect()
}

/// Render the full agreement
pub fn render_agreement(form: &FormData, generated_at: DateTime<Utc>) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("PURCHASE AGREEMENT\n{}\n\n", rule));
    out.push_str(&format!(
        "This Purchase Agreement (\"Agreement\") is entered into as of {}\n\n",
        or_placeholder(form, "agreementDate", "[DATE]")
    ));

    out.push_str("BETWEEN:\n\n");
    out.push_str(&format!(
        "BUYER: {}\nAddress: {}\n\n",
        or_placeholder(form, "buyerName", "[BUYER NAME]"),
        or_placeholder(form, "buyerAddress", "[BUYER ADDRESS]")
    ));
    out.push_str("AND\n\n");
    out.push_str(&format!(
        "SELLER: {}\nAddress: {}\n\n",
        or_placeholder(form, "sellerName", "[SELLER NAME]"),
        or_placeholder(form, "sellerAddress", "[SELLER ADDRESS]")
    ));
    out.push_str(&format!("{}\n\n", rule));

    for clause in agreement_clauses(form) {
        out.push_str(&format!(
            "{}. {}\n\n{}\n\n",
            clause.number, clause.heading, clause.body
        ));
    }

    out.push_str(&format!("\n{}\nSIGNATURES\n{}\n\n", rule, rule));
    let signed_on = or_placeholder(form, "signatureDate", "[DATE]");
    for (party, signature, title) in [
        ("BUYER", "buyerSignature", "buyerTitle"),
        ("SELLER", "sellerSignature", "sellerTitle"),
    ] {
        out.push_str(&format!(
            "{}:\n\nSignature: {}\n",
            party,
            or_placeholder(form, signature, "[SIGNATURE]")
        ));
        if let Some(title) = form.value(title) {
            out.push_str(&format!("Title: {}\n", title));
        }
        out.push_str(&format!("Date: {}\n\n", signed_on));
    }

    out.push_str(&format!(
        "\n{}\nDocument generated: {}\n",
        rule,
        format_timestamp(generated_at)
    ));
    out
}

/// File name offered for the downloaded agreement
pub fn download_file_name(form: &FormData, generated_at: DateTime<Utc>) -> String {
    let buyer = form
        .value("buyerName")
        .map(|name| name.split_whitespace().collect::<Vec<_>>().join("_"))
        .unwrap_or_else(|| "Draft".to_string());
    format!(
        "Purchase_Agreement_{}_{}.txt",
        buyer,
        generated_at.timestamp_millis()
    )
}
