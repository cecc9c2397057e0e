use crate::{error::Result, observation::nearest_by_distance};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

/// Embedded CSV table of fixed wind observation stations.
pub static STATIONS_CSV: &str = include_str!("../../fixtures/stations.csv");

/// A fixed coastal observation station reporting wind.
///
/// Wind is never interpolated to the query point; the nearest station in this
/// table answers for it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Provider station code (e.g., "DT_0004" for Jeju)
    pub code: String,
    /// Human-readable name of the station
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Station {
    /// Parse a CSV string of station data into a vector of Stations.
    ///
    /// Expected CSV columns: code, name, latitude, longitude
    pub fn parse_station_csv(csv_object: &str) -> Result<Vec<Station>> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_object.as_bytes());
        let mut station_list = Vec::new();
        for row in rdr.deserialize() {
            let station: Station = row?;
            station_list.push(station);
        }
        Ok(station_list)
    }

    /// The embedded station table.
    pub fn station_table() -> Result<Vec<Station>> {
        Station::parse_station_csv(STATIONS_CSV)
    }

    /// The station nearest to (lat, lon); ties keep table order.
    pub fn find_nearest(stations: &[Station], lat: f64, lon: f64) -> Option<&Station> {
        nearest_by_distance(
            stations.iter().map(|s| (s.latitude, s.longitude, s)),
            lat,
            lon,
        )
    }
}
