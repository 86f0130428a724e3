//! `users` rows as seen by the subscriber registry.

use sqlx::FromRow;

use hazard_core::geo::GeoPoint;
use hazard_core::subscriber::SubscriberRecord;

#[derive(Debug, Clone, FromRow)]
pub struct SubscriberRow {
    pub email: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub roles: Vec<String>,
    pub push_token: Option<String>,
}

impl From<SubscriberRow> for SubscriberRecord {
    fn from(row: SubscriberRow) -> Self {
        // A half-set coordinate pair is treated as no location.
        let location = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };
        SubscriberRecord {
            email: row.email,
            location,
            roles: row.roles.into_iter().collect(),
            push_token: row.push_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_set_coordinates_mean_no_location() {
        let row = SubscriberRow {
            email: "u@example.com".into(),
            latitude: Some(12.0),
            longitude: None,
            roles: vec!["USER".into()],
            push_token: None,
        };
        let record = SubscriberRecord::from(row);
        assert!(record.location.is_none());
        assert!(record.has_role("user"));
    }
}
