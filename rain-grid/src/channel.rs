use serde::{Deserialize, Serialize};

/// Decimal places used when a label is built from numeric coordinates.
pub const COORDINATE_PRECISION: usize = 4;

/// One spatial rainfall series, identified by the `"<lat>,<lon>"` label of its column.
///
/// `lat` and `lon` keep the text of the original label (trimmed, never
/// re-formatted) so output names match the input headers exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    /// Column label as it appears in the input matrix.
    pub label: String,
    pub lat: String,
    pub lon: String,
}

impl Channel {
    /// Parse a column label of the form `"<number>,<number>"`.
    ///
    /// Splits on the first comma. Returns `None` when there is no comma or
    /// either side is not a finite number.
    pub fn parse(label: &str) -> Option<Channel> {
        let (lat, lon) = label.split_once(',')?;
        let (lat, lon) = (lat.trim(), lon.trim());
        if !is_coordinate(lat) || !is_coordinate(lon) {
            return None;
        }
        Some(Channel {
            label: label.to_string(),
            lat: lat.to_string(),
            lon: lon.to_string(),
        })
    }

    /// Build a channel from numeric coordinates, rendered with four decimal places.
    pub fn from_coordinates(lat: f64, lon: f64) -> Channel {
        let lat = format!("{:.*}", COORDINATE_PRECISION, lat);
        let lon = format!("{:.*}", COORDINATE_PRECISION, lon);
        Channel {
            label: format!("{lat},{lon}"),
            lat,
            lon,
        }
    }

    /// The `"<lat>_<lon>"` suffix appended to every feature of this channel.
    pub fn suffix(&self) -> String {
        format!("{}_{}", self.lat, self.lon)
    }

    /// Compose `"<feature>_<lat>_<lon>"`.
    pub fn feature_name(&self, feature: &str) -> String {
        format!("{}_{}_{}", feature, self.lat, self.lon)
    }
}

fn is_coordinate(s: &str) -> bool {
    s.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::Channel;

    #[test]
    fn test_parse_keeps_original_text() {
        let channel = Channel::parse("1.22, 103.6").unwrap();
        assert_eq!(channel.label, "1.22, 103.6");
        assert_eq!(channel.lat, "1.22");
        assert_eq!(channel.lon, "103.6");
        assert_eq!(channel.suffix(), "1.22_103.6");
    }

    #[test]
    fn test_parse_negative_coordinates() {
        let channel = Channel::parse("-33.8700,151.2100").unwrap();
        assert_eq!(channel.feature_name("lag1h"), "lag1h_-33.8700_151.2100");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Channel::parse("timestamp").is_none());
        assert!(Channel::parse("lat,lon").is_none());
        assert!(Channel::parse("1.22,").is_none());
        assert!(Channel::parse("1.22,103.6,7").is_none());
        assert!(Channel::parse("nan,103.6").is_none());
    }

    #[test]
    fn test_from_coordinates() {
        let channel = Channel::from_coordinates(1.22, 103.6);
        assert_eq!(channel.label, "1.2200,103.6000");
        assert_eq!(Channel::parse(&channel.label), Some(channel));
    }
}
