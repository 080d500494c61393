//! Watch, warning and advisory (`wwa`) code translation.

use ndfd_tables::advisory as table;
use tracing::warn;

use crate::case::title_case;

/// Phrase returned when no hazard is in effect.
pub const NO_HAZARD: &str = "<None>";

/// Translate a `^` separated list of `phenomenon.significance` codes.
///
/// Each hazard becomes one line, e.g. `GL.A^SC.Y` reads
/// "Gale Watch\nSmall Craft Advisory". Unknown parts are logged and left
/// out.
pub fn parse_advisory(code: &str) -> String {
    let mut advisory = String::new();

    for event in code.split('^') {
        if event.contains("<None>") {
            continue;
        }

        let mut parts = event.split('.');
        let hazard = parts.next().unwrap_or_default();
        let significance = parts.next();

        match table::hazard(hazard) {
            Some(phrase) => {
                advisory.push_str(phrase);
                advisory.push(' ');
            }
            None => warn!(code = %hazard, "Unknown hazard code"),
        }

        match significance.and_then(table::significance) {
            Some(phrase) => {
                advisory.push_str(phrase);
                advisory.push('\n');
            }
            None => warn!(code = significance.unwrap_or_default(), "Unknown significance code"),
        }
    }

    if advisory.is_empty() {
        NO_HAZARD.to_string()
    } else {
        title_case(advisory.trim())
    }
}
