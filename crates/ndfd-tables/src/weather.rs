//! Weather (`wx`) string vocabulary.
//!
//! See the NDFD GRIB2 design notes for the coded weather string format
//! `coverage:weather:intensity:visibility:attributes`.

/// Coverage or probability qualifier.
pub fn coverage(code: &str) -> Option<&'static str> {
    let phrase = match code {
        "SChc" => "slight chance of",
        "Chc" => "chance of",
        "Num" => "numerous",
        "Def" => "definite",
        "Iso" => "isolated",
        "Sct" => "scattered",
        "Wide" => "widespread",
        "Ocnl" => "occasional",
        "Frq" => "frequent",
        "Brf" => "brief",
        "Pds" => "periods of",
        "Inter" => "intermittent",
        "Areas" => "areas of",
        "Patchy" => "patchy",
        _ => return None,
    };
    Some(phrase)
}

pub fn intensity(code: &str) -> Option<&'static str> {
    let phrase = match code {
        "--" => "very light",
        "-" => "light",
        "m" => "moderate",
        "+" => "heavy",
        _ => return None,
    };
    Some(phrase)
}

pub fn weather_type(code: &str) -> Option<&'static str> {
    let phrase = match code {
        "R" => "rain",
        "RW" => "rain showers",
        "L" => "drizzle",
        "ZL" => "freezing drizzle",
        "ZR" => "freezing rain",
        "S" => "snow",
        "SW" => "snow showers",
        "IP" => "sleet",
        "F" => "fog",
        "ZF" => "freezing fog",
        "IF" => "ice fog",
        "IC" => "ice crystals",
        "H" => "haze",
        "BS" => "blowing snow",
        "BN" => "blowing sand",
        "BD" => "blowing dust",
        "K" => "smoke",
        "FR" => "frost",
        "ZY" => "freezing spray",
        "T" => "thunderstorms",
        "WP" => "water spouts",
        "A" => "hail",
        "VA" => "volcanic ash",
        _ => return None,
    };
    Some(phrase)
}

/// Attributes rendered as "with <hazard>".
pub fn hazard(code: &str) -> Option<&'static str> {
    let phrase = match code {
        "LgA" => "large hail",
        "SmA" => "small hail",
        "DmgW" => "damaging winds",
        "TOR" => "tornadoes",
        "FL" => "frequent lightning",
        "GW" => "gusty winds",
        "HvyRn" => "heavy rain",
        _ => return None,
    };
    Some(phrase)
}

/// Attributes rendered as a bare phrase.
pub fn attribute(code: &str) -> Option<&'static str> {
    let phrase = match code {
        "OLA" => "on outlying areas",
        "OBO" => "on bridges and overpasses",
        "OGA" => "on grassy areas",
        "Dry" => "dry",
        _ => return None,
    };
    Some(phrase)
}

/// Visibility in statute miles.
pub fn visibility(code: &str) -> Option<f64> {
    let miles = match code {
        "0SM" => 0.0,
        "1/4SM" => 0.25,
        "1/2SM" => 0.5,
        "3/4SM" => 0.75,
        "1SM" => 1.0,
        "11/2SM" => 1.5,
        "2SM" => 2.0,
        "21/2SM" => 2.5,
        "3SM" => 3.0,
        "4SM" => 4.0,
        "5SM" => 5.0,
        "6SM" => 6.0,
        "P6SM" => 6.0,
        _ => return None,
    };
    Some(miles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        assert_eq!(coverage("SChc"), Some("slight chance of"));
        assert_eq!(intensity("--"), Some("very light"));
        assert_eq!(weather_type("ZR"), Some("freezing rain"));
        assert_eq!(hazard("DmgW"), Some("damaging winds"));
        assert_eq!(attribute("OLA"), Some("on outlying areas"));
        assert_eq!(visibility("11/2SM"), Some(1.5));
    }

    #[test]
    fn test_placeholders_and_markers_are_not_codes() {
        assert_eq!(coverage("Lkly"), None);
        assert_eq!(coverage("<NoCov>"), None);
        assert_eq!(weather_type("<NoWx>"), None);
        assert_eq!(intensity("<NoInten>"), None);
        assert_eq!(visibility("<NoVis>"), None);
        assert_eq!(attribute("Primary"), None);
        assert_eq!(hazard("OR"), None);
    }
}
