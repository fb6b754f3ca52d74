//! Reference market data: makes, trims and provinces
//!
//! Depreciation rates are stored in basis points (1/10_000) so that the
//! depreciation curve can be computed with exact integer arithmetic.

/// Pricing profile of a make
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MakeProfile {
    pub name: &'static str,
    /// New-vehicle base price
    pub base_price: i64,
    /// Annual depreciation rate in basis points
    pub depreciation_bp: u32,
    pub reliability: f64,
    pub models: &'static [&'static str],
}

/// Provincial price multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProvinceProfile {
    pub code: &'static str,
    pub multiplier: f64,
}

pub const MAKES: &[MakeProfile] = &[
    MakeProfile {
        name: "Toyota",
        base_price: 35_000,
        depreciation_bp: 1_200,
        reliability: 0.95,
        models: &["RAV4", "Camry", "Corolla", "Highlander", "Tacoma"],
    },
    MakeProfile {
        name: "Honda",
        base_price: 32_000,
        depreciation_bp: 1_300,
        reliability: 0.93,
        models: &["CR-V", "Civic", "Accord", "Pilot", "HR-V"],
    },
    MakeProfile {
        name: "Mazda",
        base_price: 30_000,
        depreciation_bp: 1_400,
        reliability: 0.90,
        models: &["CX-5", "CX-30", "Mazda3", "CX-9", "MX-5"],
    },
    MakeProfile {
        name: "Hyundai",
        base_price: 28_000,
        depreciation_bp: 1_500,
        reliability: 0.88,
        models: &["Tucson", "Elantra", "Santa Fe", "Kona", "Palisade"],
    },
    MakeProfile {
        name: "Kia",
        base_price: 27_000,
        depreciation_bp: 1_500,
        reliability: 0.87,
        models: &["Sportage", "Forte", "Sorento", "Seltos", "Telluride"],
    },
    MakeProfile {
        name: "Ford",
        base_price: 38_000,
        depreciation_bp: 1_600,
        reliability: 0.85,
        models: &["F-150", "Escape", "Explorer", "Mustang", "Edge"],
    },
    MakeProfile {
        name: "Chevrolet",
        base_price: 36_000,
        depreciation_bp: 1_700,
        reliability: 0.84,
        models: &["Silverado", "Equinox", "Malibu", "Traverse", "Blazer"],
    },
    MakeProfile {
        name: "Subaru",
        base_price: 33_000,
        depreciation_bp: 1_300,
        reliability: 0.92,
        models: &["Outback", "Forester", "Crosstrek", "Impreza", "Ascent"],
    },
    MakeProfile {
        name: "Nissan",
        base_price: 31_000,
        depreciation_bp: 1_500,
        reliability: 0.86,
        models: &["Rogue", "Sentra", "Altima", "Pathfinder", "Murano"],
    },
    MakeProfile {
        name: "Volkswagen",
        base_price: 34_000,
        depreciation_bp: 1_600,
        reliability: 0.87,
        models: &["Tiguan", "Jetta", "Atlas", "Golf", "Passat"],
    },
    MakeProfile {
        name: "BMW",
        base_price: 55_000,
        depreciation_bp: 2_000,
        reliability: 0.80,
        models: &["X3", "X5", "3 Series", "5 Series", "X1"],
    },
    MakeProfile {
        name: "Mercedes",
        base_price: 60_000,
        depreciation_bp: 2_200,
        reliability: 0.79,
        models: &["GLC", "C-Class", "E-Class", "GLE", "GLA"],
    },
    MakeProfile {
        name: "Audi",
        base_price: 52_000,
        depreciation_bp: 2_100,
        reliability: 0.81,
        models: &["Q5", "A4", "Q3", "Q7", "A6"],
    },
    MakeProfile {
        name: "Lexus",
        base_price: 50_000,
        depreciation_bp: 1_400,
        reliability: 0.96,
        models: &["RX", "ES", "NX", "IS", "GX"],
    },
    MakeProfile {
        name: "Tesla",
        base_price: 65_000,
        depreciation_bp: 1_800,
        reliability: 0.83,
        models: &["Model 3", "Model Y", "Model S", "Model X"],
    },
];

/// Trims in ascending price order; each step adds 5% to the price
pub const TRIMS: &[&str] = &["Base", "LE", "EX", "Limited", "Sport", "Premium", "Platinum"];

pub const PROVINCES: &[ProvinceProfile] = &[
    ProvinceProfile { code: "ON", multiplier: 1.08 },
    ProvinceProfile { code: "QC", multiplier: 0.95 },
    ProvinceProfile { code: "BC", multiplier: 1.10 },
    ProvinceProfile { code: "AB", multiplier: 1.03 },
    ProvinceProfile { code: "MB", multiplier: 0.98 },
    ProvinceProfile { code: "SK", multiplier: 0.97 },
    ProvinceProfile { code: "NS", multiplier: 1.00 },
    ProvinceProfile { code: "NB", multiplier: 0.96 },
    ProvinceProfile { code: "NL", multiplier: 1.02 },
    ProvinceProfile { code: "PE", multiplier: 0.98 },
    ProvinceProfile { code: "NT", multiplier: 1.15 },
    ProvinceProfile { code: "YT", multiplier: 1.12 },
    ProvinceProfile { code: "NU", multiplier: 1.18 },
];

pub fn make_profile(name: &str) -> Option<&'static MakeProfile> {
    MAKES.iter().find(|m| m.name == name)
}

/// `1 + 0.05 * position` for known trims, `1.0` otherwise
pub fn trim_multiplier(trim: &str) -> f64 {
    TRIMS
        .iter()
        .position(|t| *t == trim)
        .map_or(1.0, |idx| 1.0 + idx as f64 * 0.05)
}

pub fn province_multiplier(code: &str) -> Option<f64> {
    PROVINCES
        .iter()
        .find(|p| p.code == code)
        .map(|p| p.multiplier)
}
