//! Subscriber records supplied by the external user registry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A geolocated subscriber. Read-only to this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberRecord {
    /// Identity of the subscriber.
    pub email: String,
    /// `None` excludes the subscriber from geospatial matching.
    pub location: Option<GeoPoint>,
    pub roles: BTreeSet<String>,
    pub push_token: Option<String>,
}

impl SubscriberRecord {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}
