//! Great-circle distance and radius matching.

use serde::{Deserialize, Serialize};

use crate::alert::AlertEvent;
use crate::subscriber::SubscriberRecord;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius used by the scheduled monitoring cycle.
pub const DEFAULT_MATCH_RADIUS_KM: f64 = 20.0;

/// Radius used by the "alerts near me" read path.
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// The fixed location the scheduler monitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredLocation {
    pub name: String,
    pub point: GeoPoint,
}

/// Haversine great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Return the subscribers strictly closer than `radius_km` to the alert.
///
/// Subscribers without coordinates never match. The input order is kept and
/// nothing is mutated.
pub fn match_subscribers<'a>(
    alert: &AlertEvent,
    subscribers: &'a [SubscriberRecord],
    radius_km: f64,
) -> Vec<&'a SubscriberRecord> {
    let origin = GeoPoint::new(alert.latitude, alert.longitude);
    subscribers
        .iter()
        .filter(|s| {
            s.location
                .is_some_and(|point| origin.distance_km(&point) < radius_km)
        })
        .collect()
}

/// Alerts within `radius_km` of `origin`, most recent first.
///
/// Unlike [`match_subscribers`] the boundary is inclusive: an alert exactly
/// `radius_km` away is returned.
pub fn alerts_near(origin: GeoPoint, alerts: Vec<AlertEvent>, radius_km: f64) -> Vec<AlertEvent> {
    let mut nearby: Vec<AlertEvent> = alerts
        .into_iter()
        .filter(|a| origin.distance_km(&GeoPoint::new(a.latitude, a.longitude)) <= radius_km)
        .collect();
    nearby.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    nearby
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;

    use super::*;
    use crate::alert::{AlertCategory, AlertSeverity, AlertSource};

    const BENGALURU: GeoPoint = GeoPoint {
        latitude: 12.97,
        longitude: 77.59,
    };

    fn alert_at(point: GeoPoint) -> AlertEvent {
        AlertEvent {
            id: 1,
            category: AlertCategory::Flood,
            severity: AlertSeverity::High,
            location: "Bengaluru".into(),
            latitude: point.latitude,
            longitude: point.longitude,
            message: "flood".into(),
            source: AlertSource::RuleEngine,
            acknowledged: false,
            created_at: Utc::now(),
        }
    }

    fn subscriber(email: &str, location: Option<GeoPoint>) -> SubscriberRecord {
        SubscriberRecord {
            email: email.into(),
            location,
            roles: BTreeSet::new(),
            push_token: None,
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert!(BENGALURU.distance_km(&BENGALURU).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let chennai = GeoPoint::new(13.08, 80.27);
        let ab = BENGALURU.distance_km(&chennai);
        let ba = chennai.distance_km(&BENGALURU);
        assert!((ab - ba).abs() < 1e-9);
        // Roughly 290 km by great circle.
        assert!((280.0..300.0).contains(&ab), "unexpected distance {ab}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.01, "unexpected distance {d}");
    }

    #[test]
    fn subscribers_without_coordinates_are_excluded() {
        let subs = vec![
            subscriber("near@example.com", Some(GeoPoint::new(12.98, 77.60))),
            subscriber("nowhere@example.com", None),
        ];
        let matched = match_subscribers(&alert_at(BENGALURU), &subs, 20.0);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].email, "near@example.com");
    }

    #[test]
    fn radius_boundary_is_exclusive() {
        let point = GeoPoint::new(13.10, 77.59);
        let exact = BENGALURU.distance_km(&point);
        let subs = vec![subscriber("edge@example.com", Some(point))];
        let alert = alert_at(BENGALURU);

        assert!(match_subscribers(&alert, &subs, exact).is_empty());
        assert_eq!(match_subscribers(&alert, &subs, exact + 1.0).len(), 1);
    }

    #[test]
    fn far_subscribers_are_not_matched() {
        let subs = vec![subscriber("mumbai@example.com", Some(GeoPoint::new(19.07, 72.87)))];
        assert!(match_subscribers(&alert_at(BENGALURU), &subs, DEFAULT_MATCH_RADIUS_KM).is_empty());
    }

    #[test]
    fn alerts_near_is_inclusive_and_newest_first() {
        let edge = GeoPoint::new(13.10, 77.59);
        let exact = BENGALURU.distance_km(&edge);

        let mut older = alert_at(BENGALURU);
        older.id = 1;
        older.created_at = Utc::now() - chrono::Duration::hours(2);
        let mut newer = alert_at(edge);
        newer.id = 2;
        let mut far = alert_at(GeoPoint::new(19.07, 72.87));
        far.id = 3;

        let nearby = alerts_near(BENGALURU, vec![older, far, newer], exact);
        let ids: Vec<_> = nearby.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
