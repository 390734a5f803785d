use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::sensor_data::{
    EnclosureReading, FieldReadings, SoilReading, SpectralReading, WeatherReading,
};

/// Source of the weather station, soil probe, enclosure probe and spectral
/// sensor readings. Implementations report a sensor that did not answer as
/// `None` and never retry on their own.
pub trait FieldSensorService: Send {
    fn read_all(&mut self) -> FieldReadings;

    /// Put the sensors in a safe state before exit (lamps off, ports closed).
    fn cleanup(&mut self) {}
}

/// Plausible values for a node without its field buses attached.
pub struct SimulatedFieldSensors {
    rng: StdRng,
}

impl SimulatedFieldSensors {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn weather(&mut self) -> WeatherReading {
        let r = &mut self.rng;
        WeatherReading {
            wind_direction: r.gen_range(0.0..360.0),
            wind_speed_avg: r.gen_range(0.0..15.0),
            wind_speed_max: r.gen_range(5.0..25.0),
            air_temperature: r.gen_range(15.0..35.0),
            air_humidity: r.gen_range(30.0..90.0),
            pressure: r.gen_range(950.0..1050.0),
            light: r.gen_range(0..100_000) as f32,
            uv_index: r.gen_range(0.0..12.0),
            rainfall: r.gen_range(0.0..5.0),
        }
    }

    fn soil(&mut self) -> SoilReading {
        let r = &mut self.rng;
        SoilReading {
            moisture: r.gen_range(20.0..80.0),
            temperature: r.gen_range(10.0..30.0),
            conductivity: r.gen_range(100..2000) as f32,
            ph: r.gen_range(5.5..8.5),
        }
    }

    fn enclosure(&mut self) -> EnclosureReading {
        EnclosureReading {
            temperature: self.rng.gen_range(15.0..40.0),
            humidity: self.rng.gen_range(20.0..80.0),
        }
    }

    fn spectral(&mut self) -> SpectralReading {
        let r = &mut self.rng;
        SpectralReading {
            a_410nm: r.gen_range(10.0..100.0),
            b_435nm: r.gen_range(50.0..200.0),
            c_460nm: r.gen_range(100.0..1000.0),
            d_485nm: r.gen_range(50.0..300.0),
            e_510nm: r.gen_range(200.0..1500.0),
            f_535nm: r.gen_range(500.0..2500.0),
            g_560nm: r.gen_range(400.0..2200.0),
            h_585nm: r.gen_range(200.0..1200.0),
            r_610nm: r.gen_range(100.0..500.0),
            i_645nm: r.gen_range(50.0..150.0),
            s_680nm: r.gen_range(200.0..1300.0),
            j_705nm: r.gen_range(80.0..400.0),
            t_730nm: r.gen_range(30.0..100.0),
            u_760nm: r.gen_range(50.0..150.0),
            v_810nm: r.gen_range(100.0..300.0),
            w_860nm: r.gen_range(90.0..250.0),
            k_900nm: r.gen_range(20.0..80.0),
            l_940nm: r.gen_range(10.0..50.0),
            die_temperatures: [
                r.gen_range(20.0..30.0),
                r.gen_range(20.0..30.0),
                r.gen_range(20.0..30.0),
            ],
        }
    }
}

impl Default for SimulatedFieldSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSensorService for SimulatedFieldSensors {
    fn read_all(&mut self) -> FieldReadings {
        FieldReadings {
            weather: Some(self.weather()),
            soil: Some(self.soil()),
            enclosure: Some(self.enclosure()),
            spectral: Some(self.spectral()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_readings_in_range() {
        let mut sensors = SimulatedFieldSensors::seeded(7);
        for _ in 0..50 {
            let readings = sensors.read_all();

            let weather = readings.weather.expect("weather missing");
            assert!((15.0..35.0).contains(&weather.air_temperature));
            assert!((0.0..360.0).contains(&weather.wind_direction));

            let enclosure = readings.enclosure.expect("enclosure missing");
            assert!((15.0..40.0).contains(&enclosure.temperature));

            let soil = readings.soil.expect("soil missing");
            assert!((5.5..8.5).contains(&soil.ph));

            assert!(readings.spectral.is_some());
        }
    }

    #[test]
    fn test_seeded_sensors_repeat() {
        let a = SimulatedFieldSensors::seeded(42).read_all();
        let b = SimulatedFieldSensors::seeded(42).read_all();
        assert_eq!(a, b);
    }
}
