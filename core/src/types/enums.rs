use std::fmt;

/// Laterality specification (left/right/bilateral)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Laterality {
    Unknown,
    Left,
    Right,
    Bilateral,
}

impl Laterality {
    /// Returns whether this laterality is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, Laterality::Unknown)
    }

    /// Returns whether this is a unilateral (left or right) laterality
    pub fn is_unilateral(&self) -> bool {
        matches!(self, Laterality::Left | Laterality::Right)
    }

    /// Returns the one-letter code used in projection labels ("L", "R")
    pub fn code(&self) -> &'static str {
        match self {
            Laterality::Left => "L",
            Laterality::Right => "R",
            Laterality::Bilateral => "B",
            Laterality::Unknown => "",
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Laterality::Left => "left",
            Laterality::Right => "right",
            Laterality::Bilateral => "bilateral",
            Laterality::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// View position enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum ViewPosition {
    Unknown,
    Xccl, // Cranio-caudal exaggerated laterally
    Xccm, // Cranio-caudal exaggerated medially
    Cc,   // Cranio-caudal
    Mlo,  // Medio-lateral oblique
    Ml,   // Medio-lateral
    Lmo,  // Latero-medial oblique
    Lm,   // Latero-medial
    At,   // Axillary tail
    Cv,   // Cleavage view
}

impl ViewPosition {
    /// Returns whether this view position is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, ViewPosition::Unknown)
    }

    /// Returns whether this is a standard view (CC or MLO)
    pub fn is_standard_view(&self) -> bool {
        matches!(self, ViewPosition::Cc | ViewPosition::Mlo)
    }

    /// Returns short string representation
    pub fn short_str(&self) -> &'static str {
        match self {
            ViewPosition::Unknown => "",
            ViewPosition::Xccl => "xccl",
            ViewPosition::Xccm => "xccm",
            ViewPosition::Cc => "cc",
            ViewPosition::Mlo => "mlo",
            ViewPosition::Ml => "ml",
            ViewPosition::Lmo => "lmo",
            ViewPosition::Lm => "lm",
            ViewPosition::At => "at",
            ViewPosition::Cv => "cv",
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        self.short_str()
    }
}

impl fmt::Display for ViewPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Binary value of a single mask cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskValue {
    Background,
    Foreground,
}

impl MaskValue {
    /// Returns whether this is the foreground (region of interest) value
    pub fn is_foreground(&self) -> bool {
        matches!(self, MaskValue::Foreground)
    }

    /// 8-bit intensity used when the mask is rendered or exported
    pub fn intensity(&self) -> u8 {
        match self {
            MaskValue::Background => 0,
            MaskValue::Foreground => 255,
        }
    }
}

impl From<bool> for MaskValue {
    fn from(foreground: bool) -> Self {
        if foreground {
            MaskValue::Foreground
        } else {
            MaskValue::Background
        }
    }
}

/// What a brush stamp writes into the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum BrushMode {
    /// Adds cells to the region of interest
    Paint,
    /// Removes cells from the region of interest
    #[default]
    Erase,
}

impl BrushMode {
    /// Mask value written by a stamp in this mode
    pub fn value(&self) -> MaskValue {
        match self {
            BrushMode::Paint => MaskValue::Foreground,
            BrushMode::Erase => MaskValue::Background,
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            BrushMode::Paint => "brush",
            BrushMode::Erase => "rubber",
        }
    }
}

impl fmt::Display for BrushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
