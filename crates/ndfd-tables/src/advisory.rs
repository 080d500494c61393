//! Watch/warning/advisory (`wwa`) vocabulary, keyed by VTEC codes.

/// VTEC phenomenon code.
pub fn hazard(code: &str) -> Option<&'static str> {
    let phrase = match code {
        "AF" => "Ash Fall",
        "AS" => "Air Stagnation",
        "BH" => "Beach Hazard",
        "BS" => "Blowing Snow",
        "BW" => "Brisk Wind",
        "BZ" => "Blizzard",
        "CF" => "Coastal Flood",
        "DF" => "Debris Flow",
        "DS" => "Dust Storm",
        "DU" => "Blowing Dust",
        "EC" => "Extreme Cold",
        "EH" => "Excessive Heat",
        "EW" => "Extreme Wind",
        "FA" => "Areal Flood",
        "FF" => "Flash Flood",
        "FG" => "Dense Fog",
        "FL" => "Flood",
        "FR" => "Frost",
        "FW" => "Fire Weather",
        "FZ" => "Freeze",
        "GL" => "Gale",
        "HF" => "Hurricane Force Wind",
        "HI" => "Inland Hurricane",
        "HS" => "Heavy Snow",
        "HT" => "Heat",
        "HU" => "Hurricane",
        "HW" => "High Wind",
        "HY" => "Hydrologic",
        "HZ" => "Hard Freeze",
        "IP" => "Sleet",
        "IS" => "Ice Storm",
        "LB" => "Lake Effect Snow and Blowing Snow",
        "LE" => "Lake Effect Snow",
        "LO" => "Low Water",
        "LS" => "Lakeshore Flood",
        "LW" => "Lake Wind",
        "MA" => "Marine",
        "MF" => "Marine Dense Fog",
        "MH" => "Marine Ash Fall",
        "MS" => "Marine Dense Smoke",
        "RB" => "Small Craft for Rough Bar",
        "RP" => "Rip Current Risk",
        "SB" => "Snow and Blowing Snow",
        "SC" => "Small Craft",
        "SE" => "Hazardous Seas",
        "SI" => "Small Craft for Winds",
        "SM" => "Dense Smoke",
        "SN" => "Snow",
        "SQ" => "Snow Squall",
        "SR" => "Storm",
        "SS" => "Storm Surge",
        "SU" => "High Surf",
        "SV" => "Severe Thunderstorm",
        "SW" => "Small Craft for Hazardous Seas",
        "TI" => "Inland Tropical Storm",
        "TO" => "Tornado",
        "TR" => "Tropical Storm",
        "TS" => "Tsunami",
        "TY" => "Typhoon",
        "UP" => "Heavy Freezing Spray",
        "WC" => "Wind Chill",
        "WI" => "Wind",
        "WS" => "Winter Storm",
        "WW" => "Winter Weather",
        "XH" => "Extreme Heat",
        "ZF" => "Freezing Fog",
        "ZR" => "Freezing Rain",
        _ => return None,
    };
    Some(phrase)
}

/// VTEC significance code.
pub fn significance(code: &str) -> Option<&'static str> {
    let phrase = match code {
        "W" => "Warning",
        "A" => "Watch",
        "Y" => "Advisory",
        "S" => "Statement",
        "O" => "Outlook",
        "N" => "Synopsis",
        "F" => "Forecast",
        _ => return None,
    };
    Some(phrase)
}
