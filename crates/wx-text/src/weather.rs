//! Weather (`wx`) code translation.
//!
//! A code holds one or more events separated by `^`, each
//! `coverage:weather:intensity:visibility:attributes` with a comma
//! separated attribute list.

use ndfd_tables::weather as table;
use serde::Serialize;
use tracing::warn;

use crate::case::capitalize;

/// Phrase returned when a code describes no weather.
pub const NO_WEATHER: &str = "<NoWx>";

/// One event of a weather code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherEvent {
    pub coverage: String,
    pub weather: String,
    pub intensity: String,
    pub visibility: String,
    pub attributes: Vec<String>,
}

impl WeatherEvent {
    /// Split one event. Missing fields read as their placeholders.
    pub fn parse(event: &str) -> Self {
        let mut fields = event.split(':');
        let mut next = |placeholder: &str| {
            fields
                .next()
                .map(str::to_string)
                .unwrap_or_else(|| placeholder.to_string())
        };
        let coverage = next("<NoCov>");
        let weather = next("<NoWx>");
        let intensity = next("<NoInten>");
        let visibility = next("<NoVis>");
        let attributes = next("").split(',').map(str::to_string).collect();
        Self {
            coverage,
            weather,
            intensity,
            visibility,
            attributes,
        }
    }

    /// Visibility in statute miles, NaN when absent or unknown.
    pub fn visibility_miles(&self) -> f64 {
        if self.visibility.contains("<NoVis>") {
            return f64::NAN;
        }
        match table::visibility(&self.visibility) {
            Some(miles) => miles,
            None => {
                warn!(code = %self.visibility, "Unknown visibility code");
                f64::NAN
            }
        }
    }
}

/// How an event joins the phrase built so far.
#[derive(Debug, Default, Clone, Copy)]
struct Connector {
    prepend: bool,
    or: bool,
}

/// Append the phrase for `code` unless it carries `placeholder`.
fn push_phrase(
    ws: &mut String,
    code: &str,
    placeholder: &str,
    lookup: fn(&str) -> Option<&'static str>,
    kind: &str,
) {
    if code.contains(placeholder) {
        return;
    }
    match lookup(code) {
        Some(phrase) => {
            ws.push_str(phrase);
            ws.push(' ');
        }
        None => warn!(code = %code, kind, "Unknown weather code"),
    }
}

fn describe(event: &WeatherEvent) -> (String, Connector) {
    let mut ws = String::new();
    let mut connector = Connector::default();
    let mut likely = false;

    if event.coverage.contains("Lkly") && !event.coverage.contains("<NoCov>") {
        likely = true;
    } else {
        push_phrase(&mut ws, &event.coverage, "<NoCov>", table::coverage, "coverage");
    }
    push_phrase(&mut ws, &event.intensity, "<NoInten>", table::intensity, "intensity");
    push_phrase(&mut ws, &event.weather, "<NoWx>", table::weather_type, "weather");

    if likely {
        ws.push_str("likely ");
    }

    for attribute in &event.attributes {
        let attribute = attribute.as_str();
        if attribute.is_empty() || attribute.contains("<None>") || attribute.contains("Mention") {
            continue;
        }
        match attribute {
            "Primary" => connector.prepend = true,
            "OR" => connector.or = true,
            _ => {
                if let Some(hazard) = table::hazard(attribute) {
                    ws.push_str("with ");
                    ws.push_str(hazard);
                    ws.push(' ');
                } else if let Some(phrase) = table::attribute(attribute) {
                    ws.push_str(phrase);
                    ws.push(' ');
                } else {
                    warn!(code = %attribute, "Unknown attribute code");
                }
            }
        }
    }

    (ws, connector)
}

/// Translate a weather code into a sentence and the lowest visibility
/// (statute miles) any event reports.
///
/// Unknown codes are logged and left out of the sentence.
///
/// ```
/// let (text, vis) = wx_text::parse_weather("Lkly:A:-:0SM:LgA");
/// assert_eq!(text, "Light hail likely with large hail");
/// assert_eq!(vis, 0.0);
/// ```
pub fn parse_weather(code: &str) -> (String, f64) {
    let mut sentence = String::new();
    let mut visibility = f64::NAN;

    for event in code.split('^').map(WeatherEvent::parse) {
        let (ws, connector) = describe(&event);

        if sentence.is_empty() {
            sentence = ws;
        } else {
            let joiner = if connector.or { "or " } else { "and " };
            sentence = if connector.prepend {
                format!("{}{}{}", ws, joiner, sentence.to_lowercase())
            } else {
                format!("{}{}{}", sentence, joiner, ws.to_lowercase())
            };
        }

        let vis = event.visibility_miles();
        if !vis.is_nan() && (visibility.is_nan() || vis < visibility) {
            visibility = vis;
        }
    }

    if sentence.is_empty() {
        (NO_WEATHER.to_string(), visibility)
    } else {
        (capitalize(sentence.trim()), visibility)
    }
}
