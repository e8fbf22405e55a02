use serde::Deserialize;

/// Where an intention was sent from, as reported by the geolocation service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Location {
    #[serde(rename = "country_name")]
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub region_code: Option<String>,
    pub city: Option<String>,
    pub postal: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
}

impl Location {
    /// `City, Region, Country` with the missing parts skipped.
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.trim().is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Location;

    #[test]
    fn summary_skips_missing_parts() {
        let location = Location {
            country: Some("Brazil".to_string()),
            city: Some("Curitiba".to_string()),
            region: Some(" ".to_string()),
            ..Default::default()
        };

        assert_eq!(location.summary().as_deref(), Some("Curitiba, Brazil"));
        assert_eq!(Location::default().summary(), None);
    }
}
