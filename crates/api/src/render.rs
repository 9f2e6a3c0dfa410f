//! Result Rendering
//!
//! Formats predictions for display and builds the HTML form pages.

use feature_engine::{
    MachineType, RawObservation, RawValue, AIR_TEMPERATURE, PROCESS_TEMPERATURE,
    ROTATIONAL_SPEED, TOOL_WEAR, TORQUE,
};
use inference_engine::PredictionResult;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const FAILURE_BANNER: &str = "Prediction: FAILURE likely";
pub const NO_FAILURE_BANNER: &str = "Prediction: NO FAILURE likely";

/// Display strings for a prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    /// Probability, 3 decimals
    pub probability: String,
    /// Threshold, 2 decimals
    pub threshold: String,
    pub banner: &'static str,
    /// Failure type, or "None"
    pub failure_type: String,
}

impl From<&PredictionResult> for ResultView {
    fn from(result: &PredictionResult) -> Self {
        Self {
            probability: format!("{:.3}", result.probability()),
            threshold: format!("{:.2}", result.threshold()),
            banner: if result.will_fail() {
                FAILURE_BANNER
            } else {
                NO_FAILURE_BANNER
            },
            failure_type: result.failure_type().unwrap_or("None").to_string(),
        }
    }
}

/// Submitted form fields, kept as text so they can be echoed back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictForm {
    pub machine_type: String,
    pub air_temperature: String,
    pub process_temperature: String,
    pub rotational_speed: String,
    pub torque: String,
    pub tool_wear: String,
}

impl Default for PredictForm {
    fn default() -> Self {
        Self {
            machine_type: "L".to_string(),
            air_temperature: "300.0".to_string(),
            process_temperature: "310.0".to_string(),
            rotational_speed: "1500".to_string(),
            torque: "50.0".to_string(),
            tool_wear: "200".to_string(),
        }
    }
}

impl From<&PredictForm> for RawObservation {
    fn from(form: &PredictForm) -> Self {
        RawObservation {
            machine_type: form.machine_type.clone(),
            air_temperature: RawValue::Text(form.air_temperature.clone()),
            process_temperature: RawValue::Text(form.process_temperature.clone()),
            rotational_speed: RawValue::Text(form.rotational_speed.clone()),
            torque: RawValue::Text(form.torque.clone()),
            tool_wear: RawValue::Text(form.tool_wear.clone()),
        }
    }
}

/// Minimal HTML escaping for text and attribute values
pub fn escape(input: &str) -> String {
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

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>Vehicle Failure Prediction</title></head><body>\
         <h1>Vehicle Failure Prediction (Predictive Maintenance)</h1>\
         <p>Enter sensor values and machine type to predict failure risk and failure type.</p>\
         {}</body></html>",
        body
    )
}

fn form_html(form: &PredictForm) -> String {
    let mut html = String::from("<form method=\"post\" action=\"/predict\">");

    html.push_str("<label>Machine Type <select name=\"machine_type\">");
    for code in MachineType::ALL {
        let selected = if form.machine_type.trim().eq_ignore_ascii_case(code.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(html, "<option value=\"{0}\"{1}>{0}</option>", code, selected);
    }
    html.push_str("</select></label><br>");

    let inputs = [
        (AIR_TEMPERATURE, "air_temperature", &form.air_temperature, "200", "400", "0.1"),
        (PROCESS_TEMPERATURE, "process_temperature", &form.process_temperature, "200", "450", "0.1"),
        (ROTATIONAL_SPEED, "rotational_speed", &form.rotational_speed, "0", "5000", "1"),
        (TORQUE, "torque", &form.torque, "0", "200", "0.1"),
        (TOOL_WEAR, "tool_wear", &form.tool_wear, "0", "500", "1"),
    ];
    for (label, name, value, min, max, step) in inputs {
        let _ = write!(
            html,
            "<label>{} <input type=\"number\" name=\"{}\" value=\"{}\" min=\"{}\" max=\"{}\" step=\"{}\"></label><br>",
            escape(label),
            name,
            escape(value),
            min,
            max,
            step
        );
    }

    html.push_str("<hr><button type=\"submit\">Predict</button></form>");
    html
}

/// Input form, optionally with an error message above it
pub fn form_page(form: &PredictForm, error: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(message) = error {
        let _ = write!(body, "<div class=\"error\"><strong>Error:</strong> {}</div>", escape(message));
    }
    body.push_str(&form_html(form));
    page(&body)
}

/// Result section followed by the submitted inputs and the form again
pub fn result_page(form: &PredictForm, view: &ResultView) -> String {
    let mut body = String::from("<h2>Result</h2>");
    let _ = write!(
        body,
        "<p><strong>Failure probability:</strong> {}</p>\
         <p><strong>Threshold used:</strong> {}</p>\
         <div class=\"{}\">{}</div>\
         <p><strong>Predicted failure type:</strong> {}</p>",
        view.probability,
        view.threshold,
        if view.banner == FAILURE_BANNER { "failure" } else { "ok" },
        view.banner,
        escape(&view.failure_type)
    );

    body.push_str("<details><summary>Show input values</summary><ul>");
    let echo = [
        ("Type", &form.machine_type),
        (AIR_TEMPERATURE, &form.air_temperature),
        (PROCESS_TEMPERATURE, &form.process_temperature),
        (ROTATIONAL_SPEED, &form.rotational_speed),
        (TORQUE, &form.torque),
        (TOOL_WEAR, &form.tool_wear),
    ];
    for (label, value) in echo {
        let _ = write!(body, "<li>{}: {}</li>", escape(label), escape(value));
    }
    body.push_str("</ul></details>");

    body.push_str(&form_html(form));
    page(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_form_defaults_select_l() {
        let html = form_page(&PredictForm::default(), None);
        assert!(html.contains("<option value=\"L\" selected>L</option>"));
        assert!(html.contains("name=\"rotational_speed\" value=\"1500\""));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_form_page_escapes_error() {
        let html = form_page(&PredictForm::default(), Some("machine type must be one of: L, M, H (got '<X>')"));
        assert!(html.contains("&lt;X&gt;"));
        assert!(!html.contains("<X>"));
    }

    #[test]
    fn test_form_to_observation_keeps_text() {
        let obs = RawObservation::from(&PredictForm::default());
        assert_eq!(obs.machine_type, "L");
        assert_eq!(obs.tool_wear, RawValue::Text("200".to_string()));
        assert_eq!(obs.readings().unwrap().tool_wear, 200);
    }
}
