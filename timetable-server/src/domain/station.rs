//! Stations and their platform stop codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Internal station identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub i32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scraped platform-level stop code.
///
/// Several stop codes may belong to one physical station; a code belongs to
/// exactly one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopCode(pub i32);

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physical bus station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: StationId,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    pub lat: f64,
    pub lon: f64,
    /// Stop codes in declaration order. The pair finder tries them in this
    /// order, so it doubles as the tie-break.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub codes: Vec<StopCode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
}

impl Station {
    /// Create a station with no coordinates, lines or image.
    pub fn new(id: StationId, name: impl Into<String>, codes: Vec<StopCode>) -> Self {
        Self {
            id,
            name: name.into(),
            image_url: String::new(),
            lat: 0.0,
            lon: 0.0,
            codes,
            lines: Vec::new(),
        }
    }

    /// Set coordinates.
    pub fn with_position(mut self, lat: f64, lon: f64) -> Self {
        self.lat = lat;
        self.lon = lon;
        self
    }

    /// The display name with the source's `"- "` separators removed.
    ///
    /// Direction labels that terminate at this station end with this string.
    ///
    /// ```
    /// use timetable_server::domain::{Station, StationId, StopCode};
    ///
    /// let s = Station::new(StationId(1), "Tezno - TVK", vec![StopCode(300)]);
    /// assert_eq!(s.sanitized_name(), "Tezno TVK");
    /// ```
    pub fn sanitized_name(&self) -> String {
        self.name.replace("- ", "")
    }

    /// Whether `direction` names this station as its final stop.
    pub fn is_terminus_of(&self, direction: &str) -> bool {
        let terminus = self.sanitized_name();
        !terminus.is_empty() && direction.ends_with(&terminus)
    }

    /// `[lon, lat]`, the order the distance matrix provider expects.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// A stop code row and the station it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationCode {
    pub id: i32,
    pub station_id: StationId,
    pub code: StopCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(name: &str) -> Station {
        Station::new(StationId(1), name, vec![StopCode(10)])
    }

    #[test]
    fn sanitized_name_strips_separators() {
        assert_eq!(station("Tezno").sanitized_name(), "Tezno");
        assert_eq!(station("- Tezno").sanitized_name(), "Tezno");
        assert_eq!(station("Melje - Obrtna").sanitized_name(), "Melje Obrtna");
        assert_eq!(station("Center-Tezno").sanitized_name(), "Center-Tezno");
    }

    #[test]
    fn terminus_matching() {
        let tezno = station("Tezno");
        assert!(tezno.is_terminus_of("Center - Tezno"));
        assert!(tezno.is_terminus_of("Tezno"));
        assert!(!tezno.is_terminus_of("Tezno - Center"));
    }

    #[test]
    fn empty_name_is_never_a_terminus() {
        assert!(!station("").is_terminus_of("Center - Tezno"));
        assert!(!station("- ").is_terminus_of("Center - Tezno"));
    }

    #[test]
    fn serializes_camel_case_and_omits_empty_codes() {
        let mut s = station("Tezno").with_position(46.55, 15.65);
        s.codes.clear();
        s.image_url = "https://example.com/tezno.jpg".into();

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["imageUrl"], "https://example.com/tezno.jpg");
        assert_eq!(json["lat"], 46.55);
        assert!(json.get("codes").is_none());
        assert!(json.get("lines").is_none());
    }

    #[test]
    fn lon_lat_order() {
        let s = station("Tezno").with_position(46.5, 15.6);
        assert_eq!(s.lon_lat(), [15.6, 46.5]);
    }
}
