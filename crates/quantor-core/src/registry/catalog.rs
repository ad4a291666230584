//! Standard catalog of prefixes, units and constants
//!
//! To add a new unit, add an entry to the matching table. Definitions may only
//! refer to units that appear earlier (base units, then [`DERIVED`] in order).

/// Which generated prefixed variants a unit gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prefixing {
    None,
    /// Every metric prefix
    Metric,
    /// Metric prefixes from kilo up, plus the binary prefixes
    Data,
}

pub(crate) struct PrefixEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub multiplier: &'static str,
}

const fn prefix(symbol: &'static str, name: &'static str, multiplier: &'static str) -> PrefixEntry {
    PrefixEntry {
        symbol,
        name,
        multiplier,
    }
}

/// Metric prefixes. quetta, ronna, ronto and quecto lie outside the decimal range.
pub(crate) static METRIC_PREFIXES: &[PrefixEntry] = &[
    prefix("Y", "yotta", "1e24"),
    prefix("Z", "zetta", "1e21"),
    prefix("E", "exa", "1e18"),
    prefix("P", "peta", "1e15"),
    prefix("T", "tera", "1e12"),
    prefix("G", "giga", "1e9"),
    prefix("M", "mega", "1e6"),
    prefix("k", "kilo", "1e3"),
    prefix("h", "hecto", "1e2"),
    prefix("da", "deca", "1e1"),
    prefix("d", "deci", "1e-1"),
    prefix("c", "centi", "1e-2"),
    prefix("m", "milli", "1e-3"),
    prefix("μ", "micro", "1e-6"),
    prefix("n", "nano", "1e-9"),
    prefix("p", "pico", "1e-12"),
    prefix("f", "femto", "1e-15"),
    prefix("a", "atto", "1e-18"),
    prefix("z", "zepto", "1e-21"),
    prefix("y", "yocto", "1e-24"),
];

pub(crate) static BINARY_PREFIXES: &[PrefixEntry] = &[
    prefix("Ki", "kibi", "1024"),
    prefix("Mi", "mebi", "1048576"),
    prefix("Gi", "gibi", "1073741824"),
    prefix("Ti", "tebi", "1099511627776"),
    prefix("Pi", "pebi", "1125899906842624"),
    prefix("Ei", "exbi", "1152921504606846976"),
    prefix("Zi", "zebi", "1180591620717411303424"),
    prefix("Yi", "yobi", "1208925819614629174706176"),
];

pub(crate) struct BaseEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub alt_names: &'static [&'static str],
    pub dimension: usize,
    pub prefixing: Prefixing,
}

/// The SI base units, in dimension order
pub(crate) static BASE_UNITS: &[BaseEntry] = &[
    BaseEntry {
        symbol: "m",
        name: "metre",
        alt_names: &["meter"],
        dimension: 0,
        prefixing: Prefixing::Metric,
    },
    BaseEntry {
        symbol: "kg",
        name: "kilogram",
        alt_names: &[],
        dimension: 1,
        prefixing: Prefixing::None,
    },
    BaseEntry {
        symbol: "s",
        name: "second",
        alt_names: &["sec"],
        dimension: 2,
        prefixing: Prefixing::Metric,
    },
    BaseEntry {
        symbol: "A",
        name: "ampere",
        alt_names: &["amp"],
        dimension: 3,
        prefixing: Prefixing::Metric,
    },
    BaseEntry {
        symbol: "K",
        name: "kelvin",
        alt_names: &[],
        dimension: 4,
        prefixing: Prefixing::Metric,
    },
    BaseEntry {
        symbol: "mol",
        name: "mole",
        alt_names: &[],
        dimension: 5,
        prefixing: Prefixing::Metric,
    },
    BaseEntry {
        symbol: "cd",
        name: "candela",
        alt_names: &[],
        dimension: 6,
        prefixing: Prefixing::Metric,
    },
];

pub(crate) struct UnitlessEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub drop: bool,
}

pub(crate) static UNITLESS_UNITS: &[UnitlessEntry] = &[
    UnitlessEntry {
        symbol: "unitless",
        name: "unitless",
        drop: true,
    },
    UnitlessEntry {
        symbol: "rad",
        name: "radian",
        drop: false,
    },
    UnitlessEntry {
        symbol: "sr",
        name: "steradian",
        drop: false,
    },
];

pub(crate) struct TemperatureEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub alt_names: &'static [&'static str],
    /// One degree is `degree_numer / degree_denom` kelvin
    pub degree_numer: &'static str,
    pub degree_denom: &'static str,
    pub zero_point: &'static str,
}

pub(crate) static TEMPERATURE_SCALES: &[TemperatureEntry] = &[
    TemperatureEntry {
        symbol: "°C",
        name: "degreeCelsius",
        alt_names: &["celsius", "degree_Celsius", "degreeC", "centigrade"],
        degree_numer: "1",
        degree_denom: "1",
        zero_point: "273.15",
    },
    TemperatureEntry {
        symbol: "°F",
        name: "degreeFahrenheit",
        alt_names: &["fahrenheit", "degree_Fahrenheit", "degreeF"],
        degree_numer: "5",
        degree_denom: "9",
        zero_point: "459.67",
    },
    TemperatureEntry {
        symbol: "°R",
        name: "degreeRankine",
        alt_names: &["rankine", "degree_Rankine", "degreeR"],
        degree_numer: "5",
        degree_denom: "9",
        zero_point: "0",
    },
    TemperatureEntry {
        symbol: "°Ré",
        name: "degreeReaumur",
        alt_names: &["reaumur", "degree_Reaumur"],
        degree_numer: "5",
        degree_denom: "4",
        zero_point: "218.52",
    },
];

pub(crate) struct DerivedEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub alt_names: &'static [&'static str],
    /// Number of `unit` in one of this unit; `π` stands for pi (`π/180`, `2π`)
    pub value: &'static str,
    pub unit: &'static str,
    pub prefixing: Prefixing,
    pub preceding_space: bool,
}

const fn unit(
    symbol: &'static str,
    name: &'static str,
    value: &'static str,
    unit: &'static str,
) -> DerivedEntry {
    DerivedEntry {
        symbol,
        name,
        alt_names: &[],
        value,
        unit,
        prefixing: Prefixing::None,
        preceding_space: true,
    }
}

impl DerivedEntry {
    const fn alt(self, alt_names: &'static [&'static str]) -> Self {
        DerivedEntry { alt_names, ..self }
    }

    const fn metric(self) -> Self {
        DerivedEntry {
            prefixing: Prefixing::Metric,
            ..self
        }
    }

    const fn data(self) -> Self {
        DerivedEntry {
            prefixing: Prefixing::Data,
            ..self
        }
    }

    const fn no_space(self) -> Self {
        DerivedEntry {
            preceding_space: false,
            ..self
        }
    }
}

pub(crate) static DERIVED: &[DerivedEntry] = &[
    // Named SI derived units
    unit("g", "gram", "0.001", "kg").metric(),
    unit("Hz", "hertz", "1", "s-1").metric(),
    unit("N", "newton", "1", "kg m s-2").metric(),
    unit("Pa", "pascal", "1", "kg m-1 s-2").metric(),
    unit("J", "joule", "1", "kg m2 s-2").metric(),
    unit("W", "watt", "1", "kg m2 s-3").metric(),
    unit("C", "coulomb", "1", "s A").metric(),
    unit("V", "volt", "1", "kg m2 s-3 A-1").metric(),
    unit("F", "farad", "1", "kg-1 m-2 s4 A2").metric(),
    unit("Ω", "ohm", "1", "kg m2 s-3 A-2").metric(),
    unit("S", "siemens", "1", "kg-1 m-2 s3 A2").metric(),
    unit("Wb", "weber", "1", "kg m2 s-2 A-1").metric(),
    unit("T", "tesla", "1", "kg s-2 A-1").metric(),
    unit("H", "henry", "1", "kg m2 s-2 A-2").metric(),
    unit("lm", "lumen", "1", "cd sr").metric(),
    unit("lx", "lux", "1", "cd sr m-2").metric(),
    unit("Bq", "becquerel", "1", "s-1").metric(),
    unit("Gy", "gray", "1", "m2 s-2").metric(),
    unit("Sv", "sievert", "1", "m2 s-2").metric(),
    unit("kat", "katal", "1", "mol s-1").metric(),
    // Accepted for use with the SI
    unit("min", "minute", "60", "s"),
    unit("h", "hour", "3600", "s").alt(&["hr"]),
    unit("d", "day", "86400", "s"),
    unit("au", "astronomical_unit", "149597870700", "m"),
    unit("°", "degree", "π/180", "rad").no_space(),
    unit("′", "arcminute", "π/10800", "rad").no_space(),
    unit("″", "arcsecond", "π/648000", "rad").no_space(),
    unit("ha", "hectare", "1e4", "m2"),
    unit("L", "litre", "0.001", "m3").alt(&["liter"]).metric(),
    unit("t", "tonne", "1000", "kg").alt(&["metric_ton"]).metric(),
    unit("eV", "electronvolt", "1.602176634e-19", "J").metric(),
    // Ratios
    unit("%", "percent", "0.01", "unitless").alt(&["per_cent"]),
    unit("‰", "permille", "0.001", "unitless").alt(&["per_mille"]),
    unit("ppm", "parts_per_million", "1e-6", "unitless"),
    unit("ppb", "parts_per_billion", "1e-9", "unitless"),
    // Time
    unit("wk", "week", "604800", "s"),
    unit("yr", "year", "365", "d"),
    unit("a", "julian_year", "365.25", "d"),
    // Energy, pressure
    unit("Wh", "watthour", "3600", "J").metric(),
    unit("cal", "calorie", "4.184", "J").alt(&["thermochemical_calorie"]).metric(),
    unit("bar", "bar", "100000", "Pa").metric(),
    unit("mmHg", "millimetre_of_mercury", "133.322387415", "Pa"),
    // Astronomy
    unit("ly", "light_year", "9460730472580800", "m").alt(&["lightyear"]),
    unit("Jy", "jansky", "1e-26", "W m-2 Hz-1").metric(),
    unit("Å", "angstrom", "1e-10", "m").alt(&["ångström"]),
    // Imperial and US customary
    unit("in", "inch", "0.0254", "m").alt(&["inches"]),
    unit("ft", "foot", "12", "in").alt(&["feet"]),
    unit("yd", "yard", "3", "ft").alt(&["yards"]),
    unit("mi", "mile", "1760", "yd").alt(&["miles"]),
    unit("nmi", "nautical_mile", "1852", "m"),
    unit("lb", "pound", "0.45359237", "kg").alt(&["pounds", "lbs"]),
    unit("oz", "ounce", "0.0625", "lb").alt(&["ounces"]),
    unit("st", "stone", "14", "lb"),
    unit("ct", "carat", "0.2", "g"),
    unit("lbf", "pound_force", "4.4482216152605", "N"),
    unit("psi", "pound_per_square_inch", "1", "lbf in-2"),
    unit("gal", "gallon", "3.785411784", "L").alt(&["us_gallon"]),
    unit("mph", "miles_per_hour", "1", "mi h-1"),
    unit("kn", "knot", "1", "nmi h-1").alt(&["knots"]),
    // Computing
    unit("bit", "bit", "1", "unitless").data(),
    unit("B", "byte", "8", "bit").alt(&["bytes"]).data(),
    // Rotation
    unit("rpm", "revolutions_per_minute", "2π", "rad min-1").alt(&["rev_per_min"]),
];

pub(crate) struct ConstantEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    /// Quantity string, with concise uncertainty where the value is measured
    pub value: &'static str,
}

const fn constant(symbol: &'static str, name: &'static str, value: &'static str) -> ConstantEntry {
    ConstantEntry {
        symbol,
        name,
        value,
    }
}

/// Defining and commonly used constants. The Planck and Boltzmann constants
/// are too small for the decimal range in SI units.
pub(crate) static CONSTANTS: &[ConstantEntry] = &[
    constant("Δν_Cs", "caesium_hyperfine_transition", "9192631770 Hz"),
    constant("c", "speed_of_light", "299792458 m s-1"),
    constant("e", "elementary_charge", "1.602176634e-19 C"),
    constant("N_A", "Avogadro_constant", "6.02214076e23 mol-1"),
    constant("K_cd", "luminous_efficacy_540_THz", "683 lm W-1"),
    constant("G", "gravitational_constant", "6.67430(15)e-11 m3 kg-1 s-2"),
    constant("R", "molar_gas_constant", "8.31446261815324 J mol-1 K-1"),
    constant("F", "Faraday_constant", "96485.3321233100184 C mol-1"),
    constant("g_n", "standard_acceleration_of_gravity", "9.80665 m s-2"),
    constant("atm", "standard_atmosphere", "101325 Pa"),
];
