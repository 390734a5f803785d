//! Vegetation and climate indices derived from a single acquisition cycle.
//!
//! Spectral indices need the spectral sensor, climate indices need the
//! weather station. An index whose inputs are missing, or whose formula
//! would divide by zero, is left as `None`.

use serde::Serialize;

use super::sensor_data::{SoilReading, SpectralReading, WeatherReading};

/// Psychrometric constant used by the simplified FAO evapotranspiration estimate (kPa/degC).
const PSYCHROMETRIC_CONSTANT: f64 = 0.066;

/// Lux to PAR (umol/m2/s) conversion factor for daylight.
const LUX_PER_PAR: f64 = 54.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DerivedIndices {
    pub ndvi: Option<f32>,
    pub gndvi: Option<f32>,
    pub ndre: Option<f32>,
    pub savi: Option<f32>,
    pub evi: Option<f32>,
    pub mcari: Option<f32>,
    pub mtvi2: Option<f32>,
    pub et: Option<f32>,
    #[serde(rename = "Delta_T")]
    pub delta_t: Option<f32>,
    pub thi: Option<f32>,
    pub rep: Option<f32>,
    pub par: Option<f32>,
}

impl DerivedIndices {
    pub fn values(&self) -> [Option<f32>; 12] {
        [
            self.ndvi,
            self.gndvi,
            self.ndre,
            self.savi,
            self.evi,
            self.mcari,
            self.mtvi2,
            self.et,
            self.delta_t,
            self.thi,
            self.rep,
            self.par,
        ]
    }
}

fn round3(value: f64) -> Option<f32> {
    value
        .is_finite()
        .then(|| ((value * 1000.0).round() / 1000.0) as f32)
}

fn ratio(numerator: f64, denominator: f64) -> Option<f32> {
    if denominator == 0.0 {
        return None;
    }
    round3(numerator / denominator)
}

fn normalized_difference(a: f64, b: f64) -> Option<f32> {
    ratio(a - b, a + b)
}

pub fn compute_indices(
    weather: Option<&WeatherReading>,
    soil: Option<&SoilReading>,
    spectral: Option<&SpectralReading>,
) -> DerivedIndices {
    let mut out = DerivedIndices::default();

    if let Some(s) = spectral {
        let nir = s.w_860nm as f64;
        let red = s.r_610nm as f64;
        let blue = s.c_460nm as f64;
        let green = s.e_510nm as f64;
        let yellow = s.f_535nm as f64;
        let red_edge = s.j_705nm as f64;
        let deep_red = s.i_645nm as f64;
        let far_nir = s.l_940nm as f64;

        out.ndvi = normalized_difference(nir, red);
        out.gndvi = normalized_difference(nir, green);
        out.ndre = normalized_difference(nir, red_edge);
        out.savi = ratio(1.5 * (nir - red), nir + red + 0.5);
        out.evi = ratio(2.5 * nir - red, nir + 6.0 * red - 7.5 * blue + 1.0);
        if red != 0.0 {
            out.mcari = round3(((yellow - red) - 0.2 * (yellow - green)) * (yellow / red));
        }
        out.mtvi2 = round3(1.5 * (1.2 * (far_nir - green) - 2.5 * (red - green)));

        let denominator = deep_red - red_edge;
        if denominator != 0.0 {
            out.rep = round3(
                700.0 + 40.0 * (red + far_nir) / 2.0 - red_edge * (red + far_nir) / denominator,
            );
        }
    }

    if let Some(w) = weather {
        let t = w.air_temperature as f64;
        let rh = w.air_humidity as f64;
        let u2 = w.wind_speed_avg as f64;
        let light = w.light as f64;

        out.et = evapotranspiration(t, rh, u2, light);
        out.thi = round3(t - (0.55 - 0.0055 * rh) * (t - 14.5));
        if light != 0.0 {
            out.par = round3(light / LUX_PER_PAR);
        }
        if let Some(soil) = soil {
            out.delta_t = round3(t - soil.temperature as f64);
        }
    }

    out
}

/// Simplified FAO-56 reference evapotranspiration. Net radiation is
/// approximated by the raw light reading and soil heat flux is taken as zero.
fn evapotranspiration(t: f64, rh: f64, u2: f64, net_radiation: f64) -> Option<f32> {
    let saturation = 0.6108 * ((17.27 * t) / (t + 237.3)).exp();
    let slope = 4098.0 * saturation / (t + 237.3).powi(2);
    let actual = saturation * (rh / 100.0);
    let denominator = slope + PSYCHROMETRIC_CONSTANT * (1.0 + 0.34 * u2);
    if denominator == 0.0 || t + 273.0 == 0.0 {
        return None;
    }
    round3(
        (0.408 * slope * net_radiation
            + PSYCHROMETRIC_CONSTANT * 900.0 / (t + 273.0) * u2 * (saturation - actual))
            / denominator,
    )
}
