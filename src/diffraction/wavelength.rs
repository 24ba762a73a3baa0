/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! X-ray wavelengths: named anode lines or an explicit value in Å

use super::errors::{Result, XrdError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Characteristic emission lines of common X-ray tube anodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadiationSource {
    CuKa,
    CuKa1,
    CuKa2,
    CuKb1,
    MoKa,
    MoKa1,
    MoKa2,
    MoKb1,
    CrKa,
    CrKa1,
    CrKa2,
    CrKb1,
    FeKa,
    FeKa1,
    FeKa2,
    FeKb1,
    CoKa,
    CoKa1,
    CoKa2,
    CoKb1,
    AgKa,
    AgKa1,
    AgKa2,
    AgKb1,
}

impl RadiationSource {
    pub const ALL: [RadiationSource; 24] = [
        RadiationSource::CuKa,
        RadiationSource::CuKa1,
        RadiationSource::CuKa2,
        RadiationSource::CuKb1,
        RadiationSource::MoKa,
        RadiationSource::MoKa1,
        RadiationSource::MoKa2,
        RadiationSource::MoKb1,
        RadiationSource::CrKa,
        RadiationSource::CrKa1,
        RadiationSource::CrKa2,
        RadiationSource::CrKb1,
        RadiationSource::FeKa,
        RadiationSource::FeKa1,
        RadiationSource::FeKa2,
        RadiationSource::FeKb1,
        RadiationSource::CoKa,
        RadiationSource::CoKa1,
        RadiationSource::CoKa2,
        RadiationSource::CoKb1,
        RadiationSource::AgKa,
        RadiationSource::AgKa1,
        RadiationSource::AgKa2,
        RadiationSource::AgKb1,
    ];

    /// Wavelength in Å
    pub fn wavelength(&self) -> f64 {
        match self {
            RadiationSource::CuKa => 1.5406,
            RadiationSource::CuKa1 => 1.54056,
            RadiationSource::CuKa2 => 1.54439,
            RadiationSource::CuKb1 => 1.39222,
            RadiationSource::MoKa => 0.7107,
            RadiationSource::MoKa1 => 0.70930,
            RadiationSource::MoKa2 => 0.71359,
            RadiationSource::MoKb1 => 0.63229,
            RadiationSource::CrKa => 2.29100,
            RadiationSource::CrKa1 => 2.28970,
            RadiationSource::CrKa2 => 2.29361,
            RadiationSource::CrKb1 => 2.08487,
            RadiationSource::FeKa => 1.93735,
            RadiationSource::FeKa1 => 1.93604,
            RadiationSource::FeKa2 => 1.93998,
            RadiationSource::FeKb1 => 1.75661,
            RadiationSource::CoKa => 1.79026,
            RadiationSource::CoKa1 => 1.78896,
            RadiationSource::CoKa2 => 1.79285,
            RadiationSource::CoKb1 => 1.63079,
            RadiationSource::AgKa => 0.560885,
            RadiationSource::AgKa1 => 0.559421,
            RadiationSource::AgKa2 => 0.563813,
            RadiationSource::AgKb1 => 0.497082,
        }
    }

    /// Conventional name, e.g. `"CuKa1"`
    pub fn name(&self) -> &'static str {
        match self {
            RadiationSource::CuKa => "CuKa",
            RadiationSource::CuKa1 => "CuKa1",
            RadiationSource::CuKa2 => "CuKa2",
            RadiationSource::CuKb1 => "CuKb1",
            RadiationSource::MoKa => "MoKa",
            RadiationSource::MoKa1 => "MoKa1",
            RadiationSource::MoKa2 => "MoKa2",
            RadiationSource::MoKb1 => "MoKb1",
            RadiationSource::CrKa => "CrKa",
            RadiationSource::CrKa1 => "CrKa1",
            RadiationSource::CrKa2 => "CrKa2",
            RadiationSource::CrKb1 => "CrKb1",
            RadiationSource::FeKa => "FeKa",
            RadiationSource::FeKa1 => "FeKa1",
            RadiationSource::FeKa2 => "FeKa2",
            RadiationSource::FeKb1 => "FeKb1",
            RadiationSource::CoKa => "CoKa",
            RadiationSource::CoKa1 => "CoKa1",
            RadiationSource::CoKa2 => "CoKa2",
            RadiationSource::CoKb1 => "CoKb1",
            RadiationSource::AgKa => "AgKa",
            RadiationSource::AgKa1 => "AgKa1",
            RadiationSource::AgKa2 => "AgKa2",
            RadiationSource::AgKb1 => "AgKb1",
        }
    }
}

impl FromStr for RadiationSource {
    type Err = XrdError;

    /// Case-insensitive: `"CuKa"`, `"cuka"` and `"CUKA"` are the same line
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        RadiationSource::ALL
            .iter()
            .copied()
            .find(|source| source.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| XrdError::InvalidParameter(format!("unknown radiation source '{}'", s)))
    }
}

impl fmt::Display for RadiationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Incident wavelength: a named line or an explicit value in Å
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wavelength {
    Preset(RadiationSource),
    Angstrom(f64),
}

impl Wavelength {
    /// Wavelength in Å, unchecked
    pub fn angstroms(&self) -> f64 {
        match self {
            Wavelength::Preset(source) => source.wavelength(),
            Wavelength::Angstrom(value) => *value,
        }
    }

    /// Wavelength in Å, failing unless it is finite and positive
    pub fn validated(&self) -> Result<f64> {
        let value = self.angstroms();
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(XrdError::InvalidParameter(format!(
                "wavelength must be positive, got {}",
                value
            )))
        }
    }
}

impl Default for Wavelength {
    fn default() -> Self {
        Wavelength::Preset(RadiationSource::CuKa)
    }
}

impl From<RadiationSource> for Wavelength {
    fn from(source: RadiationSource) -> Self {
        Wavelength::Preset(source)
    }
}

impl From<f64> for Wavelength {
    fn from(value: f64) -> Self {
        Wavelength::Angstrom(value)
    }
}

impl FromStr for Wavelength {
    type Err = XrdError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(source) = s.parse::<RadiationSource>() {
            return Ok(Wavelength::Preset(source));
        }
        let value: f64 = s.trim().parse().map_err(|_| {
            XrdError::InvalidParameter(format!(
                "'{}' is neither a radiation source nor a wavelength in Å",
                s
            ))
        })?;
        let wavelength = Wavelength::Angstrom(value);
        wavelength.validated()?;
        Ok(wavelength)
    }
}

impl fmt::Display for Wavelength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wavelength::Preset(source) => write!(f, "{} ({} Å)", source, source.wavelength()),
            Wavelength::Angstrom(value) => write!(f, "{} Å", value),
        }
    }
}

impl Serialize for Wavelength {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Wavelength::Preset(source) => serializer.serialize_str(source.name()),
            Wavelength::Angstrom(value) => serializer.serialize_f64(*value),
        }
    }
}

impl<'de> Deserialize<'de> for Wavelength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Value(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
            Raw::Value(value) => Ok(Wavelength::Angstrom(value)),
        }
    }
}
