//! HTML rendering for the input form

use crate::metrics::MetricsSnapshot;
use crate::service::ServiceState;
use crate::types::passenger::PassengerRecord;
use crate::types::prediction::SurvivalPrediction;
use std::fmt::Write;

/// What the last form submission produced
pub enum Outcome {
    Success(SurvivalPrediction),
    Failure,
}

const PORTS: [&str; 3] = ["S", "C", "Q"];
const SEXES: [&str; 2] = ["male", "female"];

/// Escape text for inclusion in HTML
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn select(name: &str, options: &[&str], selected: &str) -> String {
    let mut html = format!("<select name=\"{name}\">");
    for option in options {
        let attr = if *option == selected { " selected" } else { "" };
        let _ = write!(html, "<option value=\"{option}\"{attr}>{option}</option>");
    }
    html.push_str("</select>");
    html
}

fn number(name: &str, value: impl std::fmt::Display, min: &str, max: Option<&str>, step: &str) -> String {
    let max = max.map(|m| format!(" max=\"{m}\"")).unwrap_or_default();
    format!("<input type=\"number\" name=\"{name}\" value=\"{value}\" min=\"{min}\"{max} step=\"{step}\">")
}

fn form(passenger: &PassengerRecord) -> String {
    let pclass = passenger.pclass.to_string();
    let mut html = String::from("<form method=\"post\" action=\"/predict\">");
    let rows = [
        ("Pclass", select("pclass", &["1", "2", "3"], &pclass)),
        ("Sex", select("sex", &SEXES, &passenger.sex)),
        ("Age", number("age", passenger.age, "0", Some("100"), "1")),
        ("SibSp", number("sibsp", passenger.sibsp, "0", Some("8"), "1")),
        ("Parch", number("parch", passenger.parch, "0", Some("6"), "1")),
        ("Fare", number("fare", passenger.fare, "0", None, "0.01")),
        ("Embarked", select("embarked", &PORTS, &passenger.embarked)),
    ];
    for (label, input) in rows {
        let _ = write!(html, "<label>{label} {input}</label><br>");
    }
    html.push_str("<button type=\"submit\">Predict</button></form>");
    html
}

fn outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success(prediction) => format!(
            "<p class=\"result\">Predicted Survived: <strong>{}</strong> (probability: {:.2})\
             <br><small>Latency: {:.1} ms</small></p>",
            prediction.label, prediction.probability, prediction.latency_ms
        ),
        Outcome::Failure => "<p class=\"error\">Prediction failed. Check the logs.</p>".to_string(),
    }
}

fn metrics_panel(snapshot: &MetricsSnapshot) -> String {
    let p95 = match snapshot.p95_latency_ms {
        Some(p95) => format!("{p95:.1} ms"),
        None => "No requests yet.".to_string(),
    };
    format!(
        "<section><h2>Metrics</h2><ul>\
         <li>p95 latency: {p95}</li>\
         <li>Total requests: {}</li>\
         <li>Total errors: {}</li>\
         </ul></section>",
        snapshot.total_requests, snapshot.total_errors
    )
}

/// Full page: form, optional outcome and the metrics panel
pub fn render(state: &ServiceState, passenger: &PassengerRecord, result: Option<&Outcome>) -> String {
    let info = state.info();
    let mut html = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>Titanic Survival Predictor</title></head><body>\
         <h1>Titanic Survival Predictor</h1>",
    );
    let _ = write!(
        html,
        "<p>Environment: <code>{}</code> | Model: <code>{}</code> ({})</p>",
        escape_html(&info.app_env),
        escape_html(&info.model_name),
        escape_html(&info.model_version)
    );
    html.push_str(&form(passenger));
    if let Some(result) = result {
        html.push_str(&outcome(result));
    }
    html.push_str(&metrics_panel(&state.snapshot()));
    html.push_str("</body></html>");
    html
}
