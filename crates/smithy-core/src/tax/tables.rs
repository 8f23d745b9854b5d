use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Province or territory code.
///
/// Unrecognized codes deserialize to `Other` instead of failing; the
/// resolver answers them with the flat fallback rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Province {
    AB,
    BC,
    MB,
    NB,
    NL,
    NS,
    ON,
    PE,
    QC,
    SK,
    NT,
    NU,
    YT,
    Other(String),
}

impl Province {
    /// Parse a two-letter code, case-insensitively. Anything outside the
    /// supported set becomes `Other`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "AB" => Province::AB,
            "BC" => Province::BC,
            "MB" => Province::MB,
            "NB" => Province::NB,
            "NL" => Province::NL,
            "NS" => Province::NS,
            "ON" => Province::ON,
            "PE" => Province::PE,
            "QC" => Province::QC,
            "SK" => Province::SK,
            "NT" => Province::NT,
            "NU" => Province::NU,
            "YT" => Province::YT,
            other => Province::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Province::AB => "AB",
            Province::BC => "BC",
            Province::MB => "MB",
            Province::NB => "NB",
            Province::NL => "NL",
            Province::NS => "NS",
            Province::ON => "ON",
            Province::PE => "PE",
            Province::QC => "QC",
            Province::SK => "SK",
            Province::NT => "NT",
            Province::NU => "NU",
            Province::YT => "YT",
            Province::Other(code) => code,
        }
    }

    /// The 13 supported provinces and territories, in code order.
    pub fn supported() -> [Province; 13] {
        [
            Province::AB,
            Province::BC,
            Province::MB,
            Province::NB,
            Province::NL,
            Province::NS,
            Province::ON,
            Province::PE,
            Province::QC,
            Province::SK,
            Province::NT,
            Province::NU,
            Province::YT,
        ]
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Province {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Province {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Province::from_code(&code))
    }
}

/// One marginal bracket: the rate applies to income above the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: Money,
    pub rate: Rate,
}

/// A province's schedule: display name, single-rate summary (used when no
/// detailed brackets exist), and the detailed marginal brackets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceSchedule {
    pub name: String,
    pub flat_rate: Rate,
    pub brackets: Vec<TaxBracket>,
}

/// Immutable federal + provincial rate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxTables {
    /// Federal basic personal amount, subtracted before every bracket lookup
    pub basic_personal_amount: Money,
    /// BC's own basic personal amount, applied to raw income for the BC
    /// provincial lookup only
    pub bc_basic_personal_amount: Money,
    /// Combined rate answered for provinces outside the supported set
    pub unknown_province_rate: Rate,
    pub federal_brackets: Vec<TaxBracket>,
    pub provinces: Vec<(Province, ProvinceSchedule)>,
}

fn bracket(threshold: Decimal, rate: Decimal) -> TaxBracket {
    TaxBracket { threshold, rate }
}

fn schedule(name: &str, flat_rate: Decimal, brackets: Vec<TaxBracket>) -> ProvinceSchedule {
    ProvinceSchedule {
        name: name.to_string(),
        flat_rate,
        brackets,
    }
}

impl TaxTables {
    /// The embedded 2024 federal and provincial bracket schedules.
    pub fn canada_2024() -> Self {
        TaxTables {
            basic_personal_amount: dec!(15000),
            bc_basic_personal_amount: dec!(15000),
            unknown_province_rate: dec!(0.25),
            federal_brackets: vec![
                bracket(dec!(0), dec!(0.15)),
                bracket(dec!(55867), dec!(0.205)),
                bracket(dec!(111733), dec!(0.26)),
                bracket(dec!(173205), dec!(0.29)),
                bracket(dec!(246752), dec!(0.33)),
            ],
            provinces: vec![
                (
                    Province::AB,
                    schedule(
                        "Alberta",
                        dec!(0.10),
                        vec![
                            bracket(dec!(0), dec!(0.10)),
                            bracket(dec!(148600), dec!(0.12)),
                            bracket(dec!(177922), dec!(0.13)),
                            bracket(dec!(237230), dec!(0.14)),
                            bracket(dec!(355845), dec!(0.15)),
                        ],
                    ),
                ),
                (
                    Province::BC,
                    schedule(
                        "British Columbia",
                        dec!(0.0506),
                        vec![
                            bracket(dec!(0), dec!(0.0506)),
                            bracket(dec!(47937), dec!(0.077)),
                            bracket(dec!(95875), dec!(0.105)),
                            bracket(dec!(110076), dec!(0.1229)),
                            bracket(dec!(133664), dec!(0.147)),
                            bracket(dec!(181232), dec!(0.168)),
                            bracket(dec!(252752), dec!(0.205)),
                        ],
                    ),
                ),
                (
                    Province::MB,
                    schedule(
                        "Manitoba",
                        dec!(0.108),
                        vec![
                            bracket(dec!(0), dec!(0.108)),
                            bracket(dec!(36832), dec!(0.1275)),
                            bracket(dec!(79625), dec!(0.174)),
                        ],
                    ),
                ),
                (
                    Province::NB,
                    schedule(
                        "New Brunswick",
                        dec!(0.0968),
                        vec![
                            bracket(dec!(0), dec!(0.0968)),
                            bracket(dec!(47715), dec!(0.1482)),
                            bracket(dec!(95431), dec!(0.1652)),
                            bracket(dec!(176756), dec!(0.1784)),
                        ],
                    ),
                ),
                (
                    Province::NL,
                    schedule(
                        "Newfoundland and Labrador",
                        dec!(0.087),
                        vec![
                            bracket(dec!(0), dec!(0.087)),
                            bracket(dec!(41447), dec!(0.145)),
                            bracket(dec!(82894), dec!(0.158)),
                            bracket(dec!(148027), dec!(0.173)),
                            bracket(dec!(207239), dec!(0.183)),
                            bracket(dec!(264750), dec!(0.208)),
                        ],
                    ),
                ),
                (
                    Province::NS,
                    schedule(
                        "Nova Scotia",
                        dec!(0.0875),
                        vec![
                            bracket(dec!(0), dec!(0.0875)),
                            bracket(dec!(29590), dec!(0.1495)),
                            bracket(dec!(59180), dec!(0.1667)),
                            bracket(dec!(93000), dec!(0.175)),
                            bracket(dec!(150000), dec!(0.21)),
                        ],
                    ),
                ),
                (
                    Province::ON,
                    schedule(
                        "Ontario",
                        dec!(0.0505),
                        vec![
                            bracket(dec!(0), dec!(0.0505)),
                            bracket(dec!(49231), dec!(0.0915)),
                            bracket(dec!(98463), dec!(0.1116)),
                            bracket(dec!(150000), dec!(0.1216)),
                            bracket(dec!(220000), dec!(0.1316)),
                        ],
                    ),
                ),
                (
                    Province::PE,
                    schedule(
                        "Prince Edward Island",
                        dec!(0.098),
                        vec![
                            bracket(dec!(0), dec!(0.098)),
                            bracket(dec!(31984), dec!(0.138)),
                            bracket(dec!(63968), dec!(0.167)),
                        ],
                    ),
                ),
                (
                    Province::QC,
                    schedule(
                        "Quebec",
                        dec!(0.1475),
                        vec![
                            bracket(dec!(0), dec!(0.14)),
                            bracket(dec!(49275), dec!(0.19)),
                            bracket(dec!(98540), dec!(0.24)),
                            bracket(dec!(119910), dec!(0.2575)),
                        ],
                    ),
                ),
                (
                    Province::SK,
                    schedule(
                        "Saskatchewan",
                        dec!(0.105),
                        vec![
                            bracket(dec!(0), dec!(0.105)),
                            bracket(dec!(52057), dec!(0.125)),
                            bracket(dec!(148734), dec!(0.145)),
                        ],
                    ),
                ),
                (
                    Province::NT,
                    schedule(
                        "Northwest Territories",
                        dec!(0.059),
                        vec![
                            bracket(dec!(0), dec!(0.059)),
                            bracket(dec!(48326), dec!(0.086)),
                            bracket(dec!(96655), dec!(0.122)),
                            bracket(dec!(157139), dec!(0.1405)),
                        ],
                    ),
                ),
                (
                    Province::NU,
                    schedule(
                        "Nunavut",
                        dec!(0.04),
                        vec![
                            bracket(dec!(0), dec!(0.04)),
                            bracket(dec!(53359), dec!(0.07)),
                            bracket(dec!(106717), dec!(0.09)),
                            bracket(dec!(165430), dec!(0.115)),
                        ],
                    ),
                ),
                (
                    Province::YT,
                    schedule(
                        "Yukon",
                        dec!(0.064),
                        vec![
                            bracket(dec!(0), dec!(0.064)),
                            bracket(dec!(53359), dec!(0.09)),
                            bracket(dec!(106717), dec!(0.109)),
                            bracket(dec!(165430), dec!(0.128)),
                            bracket(dec!(500000), dec!(0.15)),
                        ],
                    ),
                ),
            ],
        }
    }

    pub fn schedule(&self, province: &Province) -> Option<&ProvinceSchedule> {
        self.provinces.iter().find(|(p, _)| p == province).map(|(_, s)| s)
    }
}

impl Default for TaxTables {
    fn default() -> Self {
        TaxTables::canada_2024()
    }
}
