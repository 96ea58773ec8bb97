//! CSV record shapes for the import subcommands
//!
//! Headers follow the FAA NASR export naming for the preferred-route
//! table and plain lowercase names for the locally maintained files.
//! Every field defaults to empty so sparse exports load cleanly.

use serde::Deserialize;

/// One row of the FAA preferred-route export
#[derive(Debug, Deserialize)]
pub struct PrefRouteRecord {
    #[serde(rename = "Orig", default)]
    pub orig: String,
    #[serde(rename = "Route String", default)]
    pub route_string: String,
    #[serde(rename = "Dest", default)]
    pub dest: String,
    #[serde(rename = "Hours1", default)]
    pub hours: String,
    #[serde(rename = "Type", default)]
    pub route_type: String,
    #[serde(rename = "Area", default)]
    pub area: String,
    #[serde(rename = "Altitude", default)]
    pub altitude: String,
    #[serde(rename = "Aircraft", default)]
    pub aircraft: String,
    #[serde(rename = "Direction", default)]
    pub direction: String,
    /// Sequence number; empty in some exports
    #[serde(rename = "Seq", default)]
    pub seq: Option<i64>,
}

impl PrefRouteRecord {
    pub fn dedup_key(&self) -> (String, String, String, String, String) {
        (
            self.orig.trim().to_uppercase(),
            self.route_string.trim().to_string(),
            self.dest.trim().to_uppercase(),
            self.area.trim().to_string(),
            self.direction.trim().to_string(),
        )
    }
}

/// One boundary crossing row
#[derive(Debug, Deserialize)]
pub struct CrossingRecord {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub bdry_fix: String,
    #[serde(default)]
    pub restriction: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub artcc: String,
}

impl CrossingRecord {
    pub fn dedup_key(&self) -> (String, String, String, String, String) {
        (
            self.destination.trim().to_uppercase(),
            self.bdry_fix.trim().to_string(),
            self.restriction.trim().to_string(),
            self.notes.trim().to_string(),
            self.artcc.trim().to_uppercase(),
        )
    }
}

/// One curated route row
#[derive(Debug, Deserialize)]
pub struct RouteRecord {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub altitude: String,
    #[serde(default)]
    pub notes: String,
}

impl RouteRecord {
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.origin.trim().to_uppercase(),
            self.destination.trim().to_uppercase(),
            self.route.trim().to_string(),
        )
    }
}
