//! HTML for the single page the service serves.

use actix_web::http::StatusCode;

use crate::models::Label;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Spam Email Classifier</title>
  <style>
    body { font-family: sans-serif; max-width: 40rem; margin: 3rem auto; }
    textarea { width: 100%; height: 10rem; }
    .result { font-size: 1.4rem; margin-top: 1.5rem; }
    .error { color: #b00020; }
  </style>
</head>
<body>
  <h1>Spam Email Classifier</h1>
"#;

const FORM: &str = r#"  <form method="post" action="/predict">
    <textarea name="email_text" placeholder="Paste the email text here"></textarea>
    <button type="submit">Check</button>
  </form>
"#;

const TAIL: &str = "</body>\n</html>\n";

/// The input form, followed by the prediction when there is one.
pub fn render_index(prediction: Option<Label>) -> String {
    let mut html = String::with_capacity(HEAD.len() + FORM.len() + 128);
    html.push_str(HEAD);
    html.push_str(FORM);
    if let Some(label) = prediction {
        html.push_str(&format!(
            "  <p class=\"result\">Prediction: <strong>{}</strong></p>\n",
            escape(label.as_str())
        ));
    }
    html.push_str(TAIL);
    html
}

pub fn render_error(status: StatusCode, message: &str) -> String {
    let mut html = String::with_capacity(HEAD.len() + FORM.len() + 256);
    html.push_str(HEAD);
    html.push_str(&format!(
        "  <p class=\"error\">{} {}: {}</p>\n",
        status.as_u16(),
        escape(status.canonical_reason().unwrap_or("Error")),
        escape(message)
    ));
    html.push_str(FORM);
    html.push_str(TAIL);
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_has_the_email_form() {
        let html = render_index(None);
        assert!(html.contains(r#"<form method="post" action="/predict">"#));
        assert!(html.contains(r#"name="email_text""#));
        assert!(!html.contains("Prediction:"));
    }

    #[test]
    fn index_shows_the_prediction() {
        let html = render_index(Some(Label::Spam));
        assert!(html.contains("Prediction: <strong>Spam</strong>"));
    }

    #[test]
    fn error_page_escapes_the_message() {
        let html = render_error(StatusCode::BAD_REQUEST, "missing <field> & \"more\"");
        assert!(html.contains("400 Bad Request: missing &lt;field&gt; &amp; &quot;more&quot;"));
        assert!(html.contains(r#"name="email_text""#));
    }
}
