use chrono::{DateTime, Utc};
use serde::Serialize;

use super::indices::DerivedIndices;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherReading {
    pub wind_direction: f32,
    pub wind_speed_avg: f32,
    pub wind_speed_max: f32,
    pub air_temperature: f32,
    pub air_humidity: f32,
    pub pressure: f32,
    pub light: f32,
    pub uv_index: f32,
    pub rainfall: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoilReading {
    pub moisture: f32,
    pub temperature: f32,
    pub conductivity: f32,
    pub ph: f32,
}

/// Temperature and humidity inside the equipment enclosure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnclosureReading {
    pub temperature: f32,
    pub humidity: f32,
}

/// Calibrated channel values of the 18-channel triad spectral sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralReading {
    pub a_410nm: f32,
    pub b_435nm: f32,
    pub c_460nm: f32,
    pub d_485nm: f32,
    pub e_510nm: f32,
    pub f_535nm: f32,
    pub g_560nm: f32,
    pub h_585nm: f32,
    pub r_610nm: f32,
    pub i_645nm: f32,
    pub s_680nm: f32,
    pub j_705nm: f32,
    pub t_730nm: f32,
    pub u_760nm: f32,
    pub v_810nm: f32,
    pub w_860nm: f32,
    pub k_900nm: f32,
    pub l_940nm: f32,
    pub die_temperatures: [f32; 3],
}

impl SpectralReading {
    pub fn channels(&self) -> [f32; 18] {
        [
            self.a_410nm,
            self.b_435nm,
            self.c_460nm,
            self.d_485nm,
            self.e_510nm,
            self.f_535nm,
            self.g_560nm,
            self.h_585nm,
            self.r_610nm,
            self.i_645nm,
            self.s_680nm,
            self.j_705nm,
            self.t_730nm,
            self.u_760nm,
            self.v_810nm,
            self.w_860nm,
            self.k_900nm,
            self.l_940nm,
        ]
    }
}

/// One poll of every field sensor. A sensor that failed to answer is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FieldReadings {
    pub weather: Option<WeatherReading>,
    pub soil: Option<SoilReading>,
    pub enclosure: Option<EnclosureReading>,
    pub spectral: Option<SpectralReading>,
}

impl FieldReadings {
    pub fn enclosure_temperature(&self) -> Option<f32> {
        self.enclosure.map(|e| e.temperature)
    }
}

/// The merged record produced by one acquisition cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SampleRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub field: FieldReadings,
    pub cpu_temperature: Option<f32>,
    pub indices: DerivedIndices,
}

/// Column order used for tabular export.
pub const COLUMNS: [&str; 51] = [
    "timestamp",
    "wind_direction",
    "wind_speed_avg",
    "wind_speed_max",
    "air_temperature",
    "air_humidity",
    "pressure",
    "light",
    "uv_index",
    "rainfall",
    "soil_moisture",
    "soil_temperature",
    "soil_conductivity",
    "soil_ph",
    "enclosure_temperature",
    "enclosure_humidity",
    "A_410nm",
    "B_435nm",
    "C_460nm",
    "D_485nm",
    "E_510nm",
    "F_535nm",
    "G_560nm",
    "H_585nm",
    "R_610nm",
    "I_645nm",
    "S_680nm",
    "J_705nm",
    "T_730nm",
    "U_760nm",
    "V_810nm",
    "W_860nm",
    "K_900nm",
    "L_940nm",
    "spectral_temp_0",
    "spectral_temp_1",
    "spectral_temp_2",
    "NDVI",
    "GNDVI",
    "NDRE",
    "SAVI",
    "EVI",
    "MCARI",
    "MTVI2",
    "ET",
    "Delta_T",
    "THI",
    "REP",
    "PAR",
    "cpu_temperature",
    "node_version",
];

/// Written in place of a value whose sensor did not answer.
pub const MISSING: &str = "--";

fn cell(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => MISSING.to_string(),
    }
}

impl SampleRecord {
    /// Render the record in `COLUMNS` order.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(COLUMNS.len());
        row.push(self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());

        let w = self.field.weather;
        row.extend(
            [
                w.map(|w| w.wind_direction),
                w.map(|w| w.wind_speed_avg),
                w.map(|w| w.wind_speed_max),
                w.map(|w| w.air_temperature),
                w.map(|w| w.air_humidity),
                w.map(|w| w.pressure),
                w.map(|w| w.light),
                w.map(|w| w.uv_index),
                w.map(|w| w.rainfall),
            ]
            .into_iter()
            .map(cell),
        );

        let s = self.field.soil;
        row.extend(
            [
                s.map(|s| s.moisture),
                s.map(|s| s.temperature),
                s.map(|s| s.conductivity),
                s.map(|s| s.ph),
            ]
            .into_iter()
            .map(cell),
        );

        let e = self.field.enclosure;
        row.push(cell(e.map(|e| e.temperature)));
        row.push(cell(e.map(|e| e.humidity)));

        match self.field.spectral {
            Some(spectral) => {
                row.extend(spectral.channels().into_iter().map(|v| cell(Some(v))));
                row.extend(spectral.die_temperatures.into_iter().map(|v| cell(Some(v))));
            }
            None => row.extend(std::iter::repeat(MISSING.to_string()).take(21)),
        }

        row.extend(self.indices.values().into_iter().map(cell));
        row.push(cell(self.cpu_temperature));
        row.push(env!("CARGO_PKG_VERSION").to_string());
        row
    }
}
