//! Length units declared by RISA files.

use serde::Serialize;
use uom::si::f64::Length;
use uom::si::length::{centimeter, foot, inch, meter, millimeter};

/// Unit of node coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LengthUnit {
    /// Feet (RISA code 0).
    Feet,
    /// Inches (RISA code 1).
    Inches,
    /// Metres (RISA code 2).
    Meters,
    /// Centimetres (RISA code 3).
    Centimeters,
    /// Millimetres (RISA code 4).
    Millimeters,
}

impl LengthUnit {
    /// Decode a RISA length-unit code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Feet),
            1 => Some(Self::Inches),
            2 => Some(Self::Meters),
            3 => Some(Self::Centimeters),
            4 => Some(Self::Millimeters),
            _ => None,
        }
    }

    /// A quantity of `value` in this unit.
    #[must_use]
    pub fn length(self, value: f64) -> Length {
        match self {
            Self::Feet => Length::new::<foot>(value),
            Self::Inches => Length::new::<inch>(value),
            Self::Meters => Length::new::<meter>(value),
            Self::Centimeters => Length::new::<centimeter>(value),
            Self::Millimeters => Length::new::<millimeter>(value),
        }
    }

    /// Express `length` as a number of this unit.
    #[must_use]
    pub fn value_of(self, length: Length) -> f64 {
        match self {
            Self::Feet => length.get::<foot>(),
            Self::Inches => length.get::<inch>(),
            Self::Meters => length.get::<meter>(),
            Self::Centimeters => length.get::<centimeter>(),
            Self::Millimeters => length.get::<millimeter>(),
        }
    }
}

/// Unit of cross-section dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SectionUnit {
    /// Inches (RISA code 0).
    Inches,
    /// Centimetres (RISA code 1).
    Centimeters,
    /// Millimetres (RISA code 2).
    Millimeters,
}

impl SectionUnit {
    /// Decode a RISA section-dimension unit code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Inches),
            1 => Some(Self::Centimeters),
            2 => Some(Self::Millimeters),
            _ => None,
        }
    }

    /// A quantity of `value` in this unit.
    #[must_use]
    pub fn length(self, value: f64) -> Length {
        match self {
            Self::Inches => Length::new::<inch>(value),
            Self::Centimeters => Length::new::<centimeter>(value),
            Self::Millimeters => Length::new::<millimeter>(value),
        }
    }
}

/// Units of a model: coordinates and section dimensions are often different
/// (feet and inches by default).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Units {
    /// Unit of node coordinates.
    pub length: LengthUnit,
    /// Unit of section dimensions.
    pub section: SectionUnit,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            length: LengthUnit::Feet,
            section: SectionUnit::Inches,
        }
    }
}

impl Units {
    /// Factor that converts a section dimension into coordinate units.
    ///
    /// # Examples
    /// ```
    /// use trussmesh::Units;
    ///
    /// let factor = Units::default().section_scale();
    /// assert!((factor - 1.0 / 12.0).abs() < 1.0e-12);
    /// ```
    #[must_use]
    pub fn section_scale(&self) -> f64 {
        self.length.value_of(self.section.length(1.0))
    }
}
