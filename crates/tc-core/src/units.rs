// tc-core/src/units.rs

use uom::si::f64::{
    Ratio as UomRatio, ThermodynamicTemperature as UomThermodynamicTemperature,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn percent(v: f64) -> Ratio {
    use uom::si::ratio::percent;
    Ratio::new::<percent>(v)
}

/// Temperature in degrees Celsius, the unit every comfort model works in.
#[inline]
pub fn to_degc(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    t.get::<degree_celsius>()
}

#[inline]
pub fn to_mps(v: Velocity) -> f64 {
    use uom::si::velocity::meter_per_second;
    v.get::<meter_per_second>()
}

#[inline]
pub fn to_percent(r: Ratio) -> f64 {
    use uom::si::ratio::percent;
    r.get::<percent>()
}

pub mod constants {
    /// Sea-level barometric pressure (Pa)
    pub const STANDARD_PRESSURE_PA: f64 = 101_325.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_round_trip() {
        assert!((to_degc(degc(25.0)) - 25.0).abs() < 1e-9);
        assert!((to_degc(degc(-12.5)) + 12.5).abs() < 1e-9);
    }

    #[test]
    fn percent_and_speed_accessors() {
        assert!((to_percent(percent(65.0)) - 65.0).abs() < 1e-9);
        assert!((to_mps(mps(0.15)) - 0.15).abs() < 1e-12);
    }
}
