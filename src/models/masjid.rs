use serde::{Deserialize, Serialize};

use crate::prayer_times::Coordinates;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Masjid {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Masjid {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            city: None,
            contact: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }

    /// Google Maps directions link, when the masjid has a position on record.
    pub fn directions_url(&self) -> Option<String> {
        self.coordinates().map(|c| {
            format!(
                "https://www.google.com/maps/dir/?api=1&destination={},{}",
                c.latitude, c.longitude
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_need_both_coordinates() {
        let mut masjid = Masjid::new("jamia", "Jamia Masjid");
        masjid.latitude = Some(12.97);
        assert!(masjid.directions_url().is_none());

        masjid.longitude = Some(77.59);
        assert_eq!(
            masjid.directions_url().as_deref(),
            Some("https://www.google.com/maps/dir/?api=1&destination=12.97,77.59")
        );
    }
}
