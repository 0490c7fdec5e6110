// pf-core/src/units.rs
//
// Catalog values are carried as plain `Real` in the canonical units below.
// uom is used at the edges, where a source table states its own units.

use uom::si::f64::{Length as UomLength, Power as UomPower, VolumeRate as UomVolumeRate};
use uom::si::length::{foot, meter};
use uom::si::power::{horsepower, horsepower_metric, kilowatt};
use uom::si::volume_rate::{
    cubic_meter_per_hour, cubic_meter_per_second, gallon_per_minute, liter_per_second,
};

use crate::Real;

pub type Flow = UomVolumeRate;
/// Head in metres of water column (mca).
pub type Head = UomLength;
pub type ShaftPower = UomPower;

/// Flow units accepted in catalog headers. Canonical: m³/h.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FlowUnit {
    #[default]
    CubicMeterPerHour,
    CubicMeterPerSecond,
    LiterPerSecond,
    UsGallonPerMinute,
}

impl FlowUnit {
    /// Parse a normalized unit token (lower case, ASCII, no whitespace).
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "m3/h" | "m3h" | "m3/hr" | "m^3/h" | "cmh" => Some(Self::CubicMeterPerHour),
            "m3/s" | "m^3/s" => Some(Self::CubicMeterPerSecond),
            "l/s" | "lps" => Some(Self::LiterPerSecond),
            "gpm" | "usgpm" | "gal/min" => Some(Self::UsGallonPerMinute),
            _ => None,
        }
    }

    pub fn quantity(self, v: Real) -> Flow {
        match self {
            Self::CubicMeterPerHour => Flow::new::<cubic_meter_per_hour>(v),
            Self::CubicMeterPerSecond => Flow::new::<cubic_meter_per_second>(v),
            Self::LiterPerSecond => Flow::new::<liter_per_second>(v),
            Self::UsGallonPerMinute => Flow::new::<gallon_per_minute>(v),
        }
    }

    /// Convert to m³/h. The canonical unit passes through untouched so
    /// exact flow matching sees the literal catalog value.
    pub fn to_m3h(self, v: Real) -> Real {
        match self {
            Self::CubicMeterPerHour => v,
            other => other.quantity(v).get::<cubic_meter_per_hour>(),
        }
    }
}

/// Head units accepted in catalog headers. Canonical: mca.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HeadUnit {
    #[default]
    MetersWaterColumn,
    Feet,
}

impl HeadUnit {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "mca" | "m.c.a." | "m.c.a" | "m" | "mwc" | "mh2o" => Some(Self::MetersWaterColumn),
            "ft" | "feet" | "fth2o" => Some(Self::Feet),
            _ => None,
        }
    }

    pub fn to_mca(self, v: Real) -> Real {
        match self {
            Self::MetersWaterColumn => v,
            Self::Feet => Head::new::<foot>(v).get::<meter>(),
        }
    }
}

/// Shaft power units accepted in catalog headers. Canonical: HP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PowerUnit {
    #[default]
    Horsepower,
    MetricHorsepower,
    Kilowatt,
}

impl PowerUnit {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "hp" => Some(Self::Horsepower),
            "cv" | "ps" => Some(Self::MetricHorsepower),
            "kw" => Some(Self::Kilowatt),
            _ => None,
        }
    }

    pub fn to_hp(self, v: Real) -> Real {
        match self {
            Self::Horsepower => v,
            Self::MetricHorsepower => ShaftPower::new::<horsepower_metric>(v).get::<horsepower>(),
            Self::Kilowatt => ShaftPower::new::<kilowatt>(v).get::<horsepower>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tolerances, nearly_equal};

    const TOL: Tolerances = Tolerances {
        abs: 1e-9,
        rel: 1e-6,
    };

    #[test]
    fn liter_per_second_to_m3h() {
        assert!(nearly_equal(FlowUnit::LiterPerSecond.to_m3h(1.0), 3.6, TOL));
        assert!(nearly_equal(
            FlowUnit::CubicMeterPerSecond.to_m3h(1.0),
            3600.0,
            TOL
        ));
    }

    #[test]
    fn feet_to_mca() {
        assert!(nearly_equal(HeadUnit::Feet.to_mca(100.0), 30.48, TOL));
    }

    #[test]
    fn kilowatt_to_hp() {
        // 1 hp = 745.699872 W
        assert!(nearly_equal(PowerUnit::Kilowatt.to_hp(0.745_699_872), 1.0, TOL));
        assert!(PowerUnit::MetricHorsepower.to_hp(1.0) < 1.0);
    }

    #[test]
    fn unit_tokens() {
        assert_eq!(FlowUnit::parse("m3/h"), Some(FlowUnit::CubicMeterPerHour));
        assert_eq!(FlowUnit::parse("l/s"), Some(FlowUnit::LiterPerSecond));
        assert_eq!(HeadUnit::parse("mca"), Some(HeadUnit::MetersWaterColumn));
        assert_eq!(PowerUnit::parse("cv"), Some(PowerUnit::MetricHorsepower));
        assert_eq!(PowerUnit::parse("btu"), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn canonical_units_are_identity(v in 0.0_f64..1.0e6) {
            prop_assert_eq!(FlowUnit::CubicMeterPerHour.to_m3h(v).to_bits(), v.to_bits());
            prop_assert_eq!(HeadUnit::MetersWaterColumn.to_mca(v).to_bits(), v.to_bits());
            prop_assert_eq!(PowerUnit::Horsepower.to_hp(v).to_bits(), v.to_bits());
        }

        #[test]
        fn conversions_preserve_order(a in 0.1_f64..1.0e4, b in 0.1_f64..1.0e4) {
            prop_assume!(a < b);
            prop_assert!(FlowUnit::LiterPerSecond.to_m3h(a) < FlowUnit::LiterPerSecond.to_m3h(b));
            prop_assert!(HeadUnit::Feet.to_mca(a) < HeadUnit::Feet.to_mca(b));
        }
    }
}
