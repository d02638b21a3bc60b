use crate::utils::error::{EtlError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of `update_datetime` in the availability feed (local time, no offset).
pub const UPDATE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Occupancy of one lot type within a carpark. Counts are kept as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarparkInfo {
    pub lot_type: String,
    pub lots_available: String,
    pub total_lots: String,
}

/// Occupancy snapshot for one carpark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub carpark_info: Vec<CarparkInfo>,
    /// Matches [`Carpark::car_park_no`].
    pub carpark_number: String,
    pub update_datetime: String,
}

impl Availability {
    pub fn parsed_update_datetime(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.update_datetime.trim(), UPDATE_DATETIME_FORMAT)
            .map_err(|e| EtlError::ValidationError {
                message: format!(
                    "carpark {}: invalid update_datetime '{}': {}",
                    self.carpark_number, self.update_datetime, e
                ),
            })
    }
}

/// Position as `(x, y)`, i.e. easting then northing. Serialized as a
/// two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate(pub f64, pub f64);

impl Coordinate {
    /// Parses the textual `x_coord` / `y_coord` pair of a carpark record.
    pub fn from_text(x_coord: &str, y_coord: &str) -> Result<Self> {
        Ok(Self(parse_axis("x_coord", x_coord)?, parse_axis("y_coord", y_coord)?))
    }

    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }
}

fn parse_axis(field: &str, text: &str) -> Result<f64> {
    let value: f64 = text.trim().parse().map_err(|_| EtlError::ValidationError {
        message: format!("{} '{}' is not a number", field, text),
    })?;

    if !value.is_finite() {
        return Err(EtlError::ValidationError {
            message: format!("{} '{}' is not a finite number", field, text),
        });
    }

    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carpark {
    pub address: String,
    pub car_park_basement: String,
    pub car_park_decks: String,
    pub car_park_no: String,
    pub car_park_type: String,
    pub free_parking: String,
    pub gantry_height: String,
    pub night_parking: String,
    pub short_term_parking: String,
    pub type_of_parking_system: String,
    pub x_coord: String,
    pub y_coord: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availabilities: Option<Availability>,
    pub coordinate: Coordinate,
}

impl Carpark {
    /// The coordinate implied by `x_coord` / `y_coord`.
    pub fn derived_coordinate(&self) -> Result<Coordinate> {
        Coordinate::from_text(&self.x_coord, &self.y_coord)
    }

    /// Whether `coordinate` agrees with the textual coordinates.
    pub fn has_consistent_coordinate(&self) -> bool {
        self.derived_coordinate()
            .map(|derived| derived == self.coordinate)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_availability() -> Availability {
        Availability {
            carpark_info: vec![CarparkInfo {
                lot_type: "C".to_string(),
                lots_available: "45".to_string(),
                total_lots: "120".to_string(),
            }],
            carpark_number: "HE12".to_string(),
            update_datetime: "2024-01-01T08:00:00".to_string(),
        }
    }

    #[test]
    fn test_coordinate_from_text_trims_whitespace() {
        let coordinate = Coordinate::from_text(" 30250.1", "31200.2 ").unwrap();
        assert_eq!(coordinate, Coordinate(30250.1, 31200.2));
        assert_eq!(coordinate.x(), 30250.1);
        assert_eq!(coordinate.y(), 31200.2);
    }

    #[test]
    fn test_coordinate_from_text_rejects_garbage() {
        assert!(matches!(
            Coordinate::from_text("", "31200.2"),
            Err(EtlError::ValidationError { .. })
        ));
        assert!(Coordinate::from_text("30250.1", "north").is_err());
        assert!(Coordinate::from_text("NaN", "31200.2").is_err());
        assert!(Coordinate::from_text("inf", "31200.2").is_err());
    }

    #[test]
    fn test_coordinate_is_position_sensitive() {
        let coordinate = Coordinate(30250.1, 31200.2);
        let swapped = Coordinate(coordinate.1, coordinate.0);
        assert_ne!(coordinate, swapped);
    }

    #[test]
    fn test_parsed_update_datetime() {
        let parsed = sample_availability().parsed_update_datetime().unwrap();
        assert_eq!(parsed.to_string(), "2024-01-01 08:00:00");

        let mut broken = sample_availability();
        broken.update_datetime = "yesterday".to_string();
        let err = broken.parsed_update_datetime().unwrap_err();
        assert!(err.to_string().contains("HE12"));
    }

    #[test]
    fn test_consistent_coordinate() {
        let mut carpark = Carpark {
            address: "BLK 270/271 ALBERT CENTRE BASEMENT CAR PARK".to_string(),
            car_park_basement: "Y".to_string(),
            car_park_decks: "1".to_string(),
            car_park_no: "ACB".to_string(),
            car_park_type: "BASEMENT CAR PARK".to_string(),
            free_parking: "NO".to_string(),
            gantry_height: "1.80".to_string(),
            night_parking: "YES".to_string(),
            short_term_parking: "WHOLE DAY".to_string(),
            type_of_parking_system: "ELECTRONIC PARKING".to_string(),
            x_coord: "30314.7936".to_string(),
            y_coord: "31490.4942".to_string(),
            availabilities: None,
            coordinate: Coordinate(30314.7936, 31490.4942),
        };
        assert!(carpark.has_consistent_coordinate());

        carpark.coordinate = Coordinate(31490.4942, 30314.7936);
        assert!(!carpark.has_consistent_coordinate());

        carpark.x_coord = "n/a".to_string();
        assert!(!carpark.has_consistent_coordinate());
    }
}
