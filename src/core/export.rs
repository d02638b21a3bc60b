use crate::domain::model::Carpark;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(EtlError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: s.to_string(),
                reason: "Unsupported format. Valid formats: csv, tsv, json".to_string(),
            }),
        }
    }
}

/// A file destined for the output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub content: String,
}

#[derive(Serialize)]
struct CarparkRow<'a> {
    car_park_no: &'a str,
    address: &'a str,
    car_park_type: &'a str,
    type_of_parking_system: &'a str,
    short_term_parking: &'a str,
    free_parking: &'a str,
    night_parking: &'a str,
    car_park_decks: &'a str,
    gantry_height: &'a str,
    car_park_basement: &'a str,
    x_coord: &'a str,
    y_coord: &'a str,
    coordinate_x: f64,
    coordinate_y: f64,
    update_datetime: &'a str,
}

#[derive(Serialize)]
struct LotRow<'a> {
    carpark_number: &'a str,
    update_datetime: &'a str,
    lot_type: &'a str,
    lots_available: &'a str,
    total_lots: &'a str,
}

pub fn render(carparks: &[Carpark], format: OutputFormat) -> Result<Vec<OutputFile>> {
    match format {
        OutputFormat::Csv => render_delimited(carparks, b',', format.extension()),
        OutputFormat::Tsv => render_delimited(carparks, b'\t', format.extension()),
        OutputFormat::Json => Ok(vec![OutputFile {
            name: "carparks.json".to_string(),
            content: serde_json::to_string_pretty(carparks)?,
        }]),
    }
}

fn render_delimited(carparks: &[Carpark], delimiter: u8, extension: &str) -> Result<Vec<OutputFile>> {
    let mut carpark_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    let mut lot_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    for carpark in carparks {
        let availability = carpark.availabilities.as_ref();

        carpark_writer.serialize(CarparkRow {
            car_park_no: &carpark.car_park_no,
            address: &carpark.address,
            car_park_type: &carpark.car_park_type,
            type_of_parking_system: &carpark.type_of_parking_system,
            short_term_parking: &carpark.short_term_parking,
            free_parking: &carpark.free_parking,
            night_parking: &carpark.night_parking,
            car_park_decks: &carpark.car_park_decks,
            gantry_height: &carpark.gantry_height,
            car_park_basement: &carpark.car_park_basement,
            x_coord: &carpark.x_coord,
            y_coord: &carpark.y_coord,
            coordinate_x: carpark.coordinate.x(),
            coordinate_y: carpark.coordinate.y(),
            update_datetime: availability.map_or("", |a| a.update_datetime.as_str()),
        })?;

        if let Some(availability) = availability {
            for info in &availability.carpark_info {
                lot_writer.serialize(LotRow {
                    carpark_number: &availability.carpark_number,
                    update_datetime: &availability.update_datetime,
                    lot_type: &info.lot_type,
                    lots_available: &info.lots_available,
                    total_lots: &info.total_lots,
                })?;
            }
        }
    }

    // Headers come from the first serialized row; write them for empty exports.
    if carparks.is_empty() {
        carpark_writer.write_record(CARPARK_HEADERS)?;
    }
    if !carparks.iter().any(|c| {
        c.availabilities
            .as_ref()
            .is_some_and(|a| !a.carpark_info.is_empty())
    }) {
        lot_writer.write_record(LOT_HEADERS)?;
    }

    Ok(vec![
        OutputFile {
            name: format!("carparks.{}", extension),
            content: finish(carpark_writer)?,
        },
        OutputFile {
            name: format!("carpark_availability.{}", extension),
            content: finish(lot_writer)?,
        },
    ])
}

const CARPARK_HEADERS: [&str; 15] = [
    "car_park_no",
    "address",
    "car_park_type",
    "type_of_parking_system",
    "short_term_parking",
    "free_parking",
    "night_parking",
    "car_park_decks",
    "gantry_height",
    "car_park_basement",
    "x_coord",
    "y_coord",
    "coordinate_x",
    "coordinate_y",
    "update_datetime",
];

const LOT_HEADERS: [&str; 5] = [
    "carpark_number",
    "update_datetime",
    "lot_type",
    "lots_available",
    "total_lots",
];

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("failed to flush export: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("export is not valid UTF-8: {}", e),
    })
}
