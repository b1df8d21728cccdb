//! Unit conversion over a fixed table of units
//!
//! Each unit maps to a base unit of its dimension as `base = value * factor + offset`.
//! Only temperatures carry an offset.

use super::{format_significant, CalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Length,
    Mass,
    Volume,
    Time,
    Speed,
    Area,
    Temperature,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dimension::Length => "[length]",
            Dimension::Mass => "[mass]",
            Dimension::Volume => "[length] ** 3",
            Dimension::Time => "[time]",
            Dimension::Speed => "[length] / [time]",
            Dimension::Area => "[length] ** 2",
            Dimension::Temperature => "[temperature]",
        };
        write!(f, "{}", name)
    }
}

struct Unit {
    /// Canonical singular name, used in results
    name: &'static str,
    aliases: &'static [&'static str],
    dimension: Dimension,
    factor: f64,
    offset: f64,
}

const fn unit(
    name: &'static str,
    aliases: &'static [&'static str],
    dimension: Dimension,
    factor: f64,
) -> Unit {
    Unit {
        name,
        aliases,
        dimension,
        factor,
        offset: 0.0,
    }
}

const MILE: f64 = 1609.344;
const HOUR: f64 = 3600.0;

static UNITS: &[Unit] = &[
    // length, base meter
    unit("meter", &["m", "metre"], Dimension::Length, 1.0),
    unit("kilometer", &["km", "kilometre"], Dimension::Length, 1000.0),
    unit("centimeter", &["cm", "centimetre"], Dimension::Length, 0.01),
    unit("millimeter", &["mm", "millimetre"], Dimension::Length, 0.001),
    unit("micrometer", &["um", "micron", "micrometre"], Dimension::Length, 1e-6),
    unit("nanometer", &["nm", "nanometre"], Dimension::Length, 1e-9),
    unit("mile", &["mi"], Dimension::Length, MILE),
    unit("yard", &["yd"], Dimension::Length, 0.9144),
    unit("foot", &["ft", "feet"], Dimension::Length, 0.3048),
    unit("inch", &["in", "inches"], Dimension::Length, 0.0254),
    unit("nautical_mile", &["nmi"], Dimension::Length, 1852.0),
    unit("light_year", &["ly", "lightyear"], Dimension::Length, 9.4607304725808e15),
    unit("astronomical_unit", &["au"], Dimension::Length, 1.495978707e11),
    // mass, base kilogram
    unit("kilogram", &["kg", "kilo"], Dimension::Mass, 1.0),
    unit("gram", &["g", "gramme"], Dimension::Mass, 0.001),
    unit("milligram", &["mg"], Dimension::Mass, 1e-6),
    unit("metric_ton", &["t", "tonne", "ton"], Dimension::Mass, 1000.0),
    unit("pound", &["lb", "lbs"], Dimension::Mass, 0.45359237),
    unit("ounce", &["oz"], Dimension::Mass, 0.028349523125),
    unit("stone", &["st"], Dimension::Mass, 6.35029318),
    // volume, base cubic meter
    unit("liter", &["l", "litre"], Dimension::Volume, 0.001),
    unit("milliliter", &["ml", "millilitre"], Dimension::Volume, 1e-6),
    unit("cubic_meter", &["m3", "m^3"], Dimension::Volume, 1.0),
    unit("gallon", &["gal"], Dimension::Volume, 0.003785411784),
    unit("quart", &["qt"], Dimension::Volume, 0.000946352946),
    unit("pint", &["pt"], Dimension::Volume, 0.000473176473),
    unit("cup", &[], Dimension::Volume, 0.0002365882365),
    unit("fluid_ounce", &["floz", "fl_oz"], Dimension::Volume, 2.95735295625e-5),
    // time, base second
    unit("second", &["s", "sec"], Dimension::Time, 1.0),
    unit("millisecond", &["ms"], Dimension::Time, 0.001),
    unit("minute", &["min"], Dimension::Time, 60.0),
    unit("hour", &["h", "hr"], Dimension::Time, HOUR),
    unit("day", &["d"], Dimension::Time, 86_400.0),
    unit("week", &["wk"], Dimension::Time, 604_800.0),
    unit("year", &["yr", "a"], Dimension::Time, 31_557_600.0),
    // speed, base meter per second
    unit("meter_per_second", &["m/s", "mps"], Dimension::Speed, 1.0),
    unit("kilometer_per_hour", &["km/h", "kph", "kmh"], Dimension::Speed, 1000.0 / HOUR),
    unit("mile_per_hour", &["mph", "mi/h"], Dimension::Speed, MILE / HOUR),
    unit("foot_per_second", &["ft/s", "fps"], Dimension::Speed, 0.3048),
    unit("knot", &["kn", "kt"], Dimension::Speed, 1852.0 / HOUR),
    // area, base square meter
    unit("square_meter", &["m2", "m^2", "sq_m"], Dimension::Area, 1.0),
    unit("square_kilometer", &["km2", "km^2", "sq_km"], Dimension::Area, 1e6),
    unit("square_mile", &["mi2", "sq_mi"], Dimension::Area, MILE * MILE),
    unit("square_foot", &["ft2", "sq_ft", "square_feet"], Dimension::Area, 0.09290304),
    unit("hectare", &["ha"], Dimension::Area, 10_000.0),
    unit("acre", &["ac"], Dimension::Area, 4046.8564224),
    // temperature, base kelvin
    unit("kelvin", &["k"], Dimension::Temperature, 1.0),
    Unit {
        name: "degree_Celsius",
        aliases: &["celsius", "c", "degc", "degree_celsius", "°c", "centigrade"],
        dimension: Dimension::Temperature,
        factor: 1.0,
        offset: 273.15,
    },
    Unit {
        name: "degree_Fahrenheit",
        aliases: &["fahrenheit", "f", "degf", "degree_fahrenheit", "°f"],
        dimension: Dimension::Temperature,
        factor: 5.0 / 9.0,
        offset: 459.67 * 5.0 / 9.0,
    },
];

fn lookup(raw: &str) -> Option<&'static Unit> {
    let key = raw
        .trim()
        .to_lowercase()
        .replace("degrees", "degree")
        .replace([' ', '-'], "_");

    let mut candidates = vec![key.clone(), key.replace("s_per_", "_per_")];
    if let Some(stripped) = key.strip_suffix("es") {
        candidates.push(stripped.to_string());
    }
    if let Some(stripped) = key.strip_suffix('s') {
        candidates.push(stripped.to_string());
    }

    candidates.iter().find_map(|candidate| {
        UNITS.iter().find(|u| {
            u.name.eq_ignore_ascii_case(candidate) || u.aliases.contains(&candidate.as_str())
        })
    })
}

/// Convert `value` between two named units. The result carries four
/// significant digits and the canonical unit name.
pub fn convert_units(value: f64, from_unit: &str, to_unit: &str) -> String {
    match convert(value, from_unit, to_unit) {
        Ok((converted, unit)) => format!("{} {}", format_significant(converted, 4), unit),
        Err(e) => format!("Conversion error: {}", e),
    }
}

fn convert(value: f64, from_unit: &str, to_unit: &str) -> CalcResult<(f64, &'static str)> {
    let from = lookup(from_unit).ok_or_else(|| format!("'{}' is not defined in the unit registry", from_unit))?;
    let to = lookup(to_unit).ok_or_else(|| format!("'{}' is not defined in the unit registry", to_unit))?;

    if from.dimension != to.dimension {
        return Err(format!(
            "Cannot convert from '{}' ({}) to '{}' ({})",
            from.name, from.dimension, to.name, to.dimension
        ));
    }

    let base = value * from.factor + from.offset;
    let mut converted = (base - to.offset) / to.factor;
    // offset arithmetic leaves residue like 5.7e-14 where the answer is zero
    if converted.abs() < 1e-9 * (base.abs() / to.factor).max(1.0) {
        converted = 0.0;
    }
    Ok((converted, to.name))
}
