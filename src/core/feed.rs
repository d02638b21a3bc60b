use crate::domain::model::{Availability, Carpark, Coordinate};
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the carpark information dataset. Extra columns such as `_id`
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarparkRecord {
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
}

impl CarparkRecord {
    pub fn into_carpark(self) -> Result<Carpark> {
        let coordinate = Coordinate::from_text(&self.x_coord, &self.y_coord).map_err(|e| {
            EtlError::ValidationError {
                message: format!("carpark {}: {}", self.car_park_no, e),
            }
        })?;

        Ok(Carpark {
            address: self.address,
            car_park_basement: self.car_park_basement,
            car_park_decks: self.car_park_decks,
            car_park_no: self.car_park_no,
            car_park_type: self.car_park_type,
            free_parking: self.free_parking,
            gantry_height: self.gantry_height,
            night_parking: self.night_parking,
            short_term_parking: self.short_term_parking,
            type_of_parking_system: self.type_of_parking_system,
            x_coord: self.x_coord,
            y_coord: self.y_coord,
            availabilities: None,
            coordinate,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityFeed {
    #[serde(default)]
    items: Vec<AvailabilityItem>,
}

#[derive(Debug, Deserialize)]
struct AvailabilityItem {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    carpark_data: Vec<Availability>,
}

/// Accepts `{"result": {"records": [..]}}`, `{"records": [..]}` or a bare array.
pub fn decode_carpark_records(payload: Value) -> Result<Vec<CarparkRecord>> {
    let records = match payload {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut obj) => {
            let nested = obj
                .get_mut("result")
                .and_then(|result| result.get_mut("records"))
                .map(Value::take);
            match nested.or_else(|| obj.remove("records")) {
                Some(records) => records,
                None => {
                    return Err(EtlError::ProcessingError {
                        message: "carpark information payload has no records".to_string(),
                    })
                }
            }
        }
        other => {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "expected carpark information object or array, got {}",
                    json_kind(&other)
                ),
            })
        }
    };

    Ok(serde_json::from_value(records)?)
}

/// Accepts the `{"items": [{"carpark_data": [..]}]}` feed or a bare array of
/// snapshots. Items are flattened in feed order.
pub fn decode_availability_feed(payload: Value) -> Result<Vec<Availability>> {
    match payload {
        Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
        Value::Object(obj) => {
            let feed: AvailabilityFeed = serde_json::from_value(Value::Object(obj))?;
            let mut snapshots = Vec::new();
            for item in feed.items {
                tracing::debug!(
                    "Availability item at {} with {} carparks",
                    item.timestamp.as_deref().unwrap_or("unknown time"),
                    item.carpark_data.len()
                );
                snapshots.extend(item.carpark_data);
            }
            Ok(snapshots)
        }
        other => Err(EtlError::ProcessingError {
            message: format!(
                "expected availability object or array, got {}",
                json_kind(&other)
            ),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_json(number: &str) -> Value {
        json!({
            "_id": 1,
            "car_park_no": number,
            "address": "BLK 801 HOUGANG AVENUE 10",
            "x_coord": "30250.1",
            "y_coord": "31200.2",
            "car_park_type": "MULTI-STOREY CAR PARK",
            "type_of_parking_system": "ELECTRONIC PARKING",
            "short_term_parking": "WHOLE DAY",
            "free_parking": "SUN & PH FR 7AM-10.30PM",
            "night_parking": "YES",
            "car_park_decks": "5",
            "gantry_height": "2.15",
            "car_park_basement": "N"
        })
    }

    #[test]
    fn test_decode_ckan_envelope() {
        let payload = json!({
            "success": true,
            "result": { "records": [record_json("HE12"), record_json("HE13")], "total": 2 }
        });

        let records = decode_carpark_records(payload).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].car_park_no, "HE12");
        assert_eq!(records[1].gantry_height, "2.15");
    }

    #[test]
    fn test_decode_records_object_and_bare_array() {
        let records = decode_carpark_records(json!({ "records": [record_json("HE12")] })).unwrap();
        assert_eq!(records.len(), 1);

        let records = decode_carpark_records(json!([record_json("HE12")])).unwrap();
        assert_eq!(records[0].address, "BLK 801 HOUGANG AVENUE 10");
    }

    #[test]
    fn test_decode_records_rejects_unknown_shapes() {
        assert!(matches!(
            decode_carpark_records(json!({ "data": [] })),
            Err(EtlError::ProcessingError { .. })
        ));
        assert!(decode_carpark_records(json!("HE12")).is_err());
    }

    #[test]
    fn test_decode_records_missing_field_is_serialization_error() {
        let mut record = record_json("HE12");
        record.as_object_mut().unwrap().remove("gantry_height");

        assert!(matches!(
            decode_carpark_records(json!([record])),
            Err(EtlError::SerializationError(_))
        ));
    }

    #[test]
    fn test_into_carpark_derives_coordinate() {
        let record: CarparkRecord = serde_json::from_value(record_json("HE12")).unwrap();
        let carpark = record.into_carpark().unwrap();

        assert_eq!(carpark.coordinate, Coordinate(30250.1, 31200.2));
        assert_eq!(carpark.x_coord, "30250.1");
        assert!(carpark.availabilities.is_none());
        assert!(carpark.has_consistent_coordinate());
    }

    #[test]
    fn test_into_carpark_reports_bad_coordinate() {
        let mut record: CarparkRecord = serde_json::from_value(record_json("HE12")).unwrap();
        record.y_coord = "".to_string();

        let err = record.into_carpark().unwrap_err();
        assert!(err.to_string().contains("HE12"));
    }

    #[test]
    fn test_decode_availability_feed_flattens_items_in_order() {
        let payload = json!({
            "items": [
                {
                    "timestamp": "2024-01-01T08:00:30+08:00",
                    "carpark_data": [
                        {
                            "carpark_info": [
                                {"total_lots": "120", "lot_type": "C", "lots_available": "45"},
                                {"total_lots": "20", "lot_type": "Y", "lots_available": "3"}
                            ],
                            "carpark_number": "HE12",
                            "update_datetime": "2024-01-01T08:00:00"
                        }
                    ]
                },
                {
                    "carpark_data": [
                        {
                            "carpark_info": [],
                            "carpark_number": "HE13",
                            "update_datetime": "2024-01-01T07:59:00"
                        }
                    ]
                }
            ]
        });

        let snapshots = decode_availability_feed(payload).unwrap();

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].carpark_number, "HE12");
        assert_eq!(snapshots[0].carpark_info[0].lot_type, "C");
        assert_eq!(snapshots[0].carpark_info[1].lot_type, "Y");
        assert!(snapshots[1].carpark_info.is_empty());
    }

    #[test]
    fn test_decode_availability_feed_without_items() {
        assert!(decode_availability_feed(json!({})).unwrap().is_empty());
        assert!(decode_availability_feed(json!(null)).is_err());
    }
}
