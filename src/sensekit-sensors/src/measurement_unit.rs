/// Represents a unit of measurement.
///
/// Only the units produced by the bundled transducer drivers are listed.
// Built upon https://doc.riot-os.org/phydat_8h_source.html
// and https://www.iana.org/assignments/senml/senml.xhtml
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum MeasurementUnit {
    /// Degrees Celsius (°C).
    Celsius,
    /// Kelvin (K).
    Kelvin,
    /// Pascal (Pa).
    Pascal,
    /// Percent (%).
    Percent,
    /// Volt (V).
    Volt,
    /// Dimensionless code, such as a calibration coefficient.
    Dimensionless,
}

impl core::fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Celsius => write!(f, "°C"), // The Unicode Standard v15 recommends using U+00B0 + U+0043.
            Self::Kelvin => write!(f, "K"),
            Self::Pascal => write!(f, "Pa"),
            Self::Percent => write!(f, "%"),
            Self::Volt => write!(f, "V"),
            Self::Dimensionless => write!(f, ""),
        }
    }
}
