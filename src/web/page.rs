//! Server-rendered HTML for the scoring page

use crate::types::prediction::Prediction;
use crate::types::transaction::{TransactionRecord, NUMERIC_FIELDS};
use axum::http::StatusCode;

pub const TITLE: &str = "Transaction Fraud Detection";
pub const CAPTION: &str =
    "This demo uses the PaySim synthetic dataset (simulating mobile money transactions).";

const STYLE: &str = "\
body{font-family:sans-serif;max-width:720px;margin:2rem auto;padding:0 1rem;color:#262730}\
label{display:block;margin-top:.8rem;font-weight:600}\
input,select{width:100%;padding:.4rem;margin-top:.2rem;box-sizing:border-box}\
button{margin-top:1.2rem;padding:.5rem 1.2rem;font-size:1rem}\
.box{margin-top:1.2rem;padding:.8rem 1rem;border-radius:.4rem}\
.fraud{background:#ffe0e0;color:#8b0000}\
.legit{background:#e0f5e6;color:#115c2b}\
.info{background:#e6f0ff;color:#0b3d91}\
.caption{margin-top:2rem;font-size:.85rem;color:#6b6b6b}";

/// What the area under the form shows
#[derive(Debug, Clone, Copy)]
pub enum ResultPanel<'a> {
    /// Nothing submitted yet
    Awaiting,
    Scored(&'a Prediction),
}

/// Escape text for an HTML body or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Initial form contents: first known type, numeric defaults
pub fn default_values(known_types: &[String]) -> TransactionRecord {
    let [amount, old_orig, new_orig, old_dest, new_dest] = NUMERIC_FIELDS.map(|f| f.default);
    TransactionRecord::new(known_types.first().cloned().unwrap_or_default(), amount)
        .with_sender_balances(old_orig, new_orig)
        .with_receiver_balances(old_dest, new_dest)
}

fn header(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n<h1>{title}</h1>\n",
        title = escape_html(title),
        style = STYLE
    )
}

fn footer() -> String {
    format!("<p class=\"caption\">{}</p>\n</body>\n</html>\n", escape_html(CAPTION))
}

fn render_form(known_types: &[String], values: &TransactionRecord) -> String {
    let mut html = String::from(
        "<h2>Enter Transaction Details</h2>\n<form method=\"post\" action=\"/predict\">\n\
         <label for=\"type\">Transaction Type</label>\n<select id=\"type\" name=\"type\">\n",
    );
    for tx_type in known_types {
        let selected = if *tx_type == values.tx_type { " selected" } else { "" };
        let escaped = escape_html(tx_type);
        html.push_str(&format!("<option value=\"{escaped}\"{selected}>{escaped}</option>\n"));
    }
    html.push_str("</select>\n");

    // step="any": the increment is a hint only, typed amounts like 181 or 9839.64 stay valid
    for (field, value) in NUMERIC_FIELDS.iter().zip(values.numeric_values()) {
        html.push_str(&format!(
            "<label for=\"{name}\">{label}</label>\n\
             <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" \
             step=\"any\" data-step=\"{step}\" value=\"{value}\" required>\n",
            name = field.name,
            label = escape_html(field.label),
            min = field.min,
            max = field.max,
            step = field.step,
            value = value,
        ));
    }

    html.push_str("<button type=\"submit\">Predict Fraud</button>\n</form>\n");
    html
}

fn render_panel(panel: ResultPanel<'_>) -> String {
    match panel {
        ResultPanel::Awaiting => "<div class=\"box info\">Fill out the form above and click \
                                  <strong>&#39;Predict Fraud&#39;</strong> to see results.</div>\n"
            .to_string(),
        ResultPanel::Scored(prediction) => {
            let class = if prediction.verdict.is_fraud() {
                "fraud"
            } else {
                "legit"
            };
            format!(
                "<hr>\n<h2>Prediction Result</h2>\n<div class=\"box {class}\">{}</div>\n",
                escape_html(&prediction.message())
            )
        }
    }
}

/// Full page: form with `values` echoed back, then the result panel
pub fn render_page(
    known_types: &[String],
    values: &TransactionRecord,
    panel: ResultPanel<'_>,
) -> String {
    let mut html = header(TITLE);
    html.push_str(
        "<p>Model trained on the <strong>PaySim synthetic transaction dataset</strong>. \
         Features mimic real financial data.</p>\n",
    );
    html.push_str(&render_form(known_types, values));
    html.push_str(&render_panel(panel));
    html.push_str(&footer());
    html
}

pub fn render_error(status: StatusCode, message: &str) -> String {
    let mut html = header(TITLE);
    html.push_str(&format!(
        "<h2>Request failed ({})</h2>\n<div class=\"box fraud\">{}</div>\n\
         <p><a href=\"/\">Back to the form</a></p>\n",
        status.as_u16(),
        escape_html(message)
    ));
    html.push_str(&footer());
    html
}
