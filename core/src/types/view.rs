use super::{Laterality, ViewPosition};
use std::fmt;

/// Mammogram view combining laterality and view position
///
/// Represents a complete mammogram view specification,
/// such as "left MLO" or "right CC".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MammogramView {
    pub laterality: Laterality,
    pub view: ViewPosition,
}

impl MammogramView {
    /// Creates a new MammogramView
    pub fn new(laterality: Laterality, view: ViewPosition) -> Self {
        Self { laterality, view }
    }

    /// Compact projection label such as "LCC" or "RMLO"
    ///
    /// Returns `None` when neither laterality nor view position is known,
    /// since an empty label is indistinguishable from a missing one.
    pub fn projection_label(&self) -> Option<String> {
        if self.laterality.is_unknown() && self.view.is_unknown() {
            return None;
        }
        Some(format!(
            "{}{}",
            self.laterality.code(),
            self.view.short_str().to_uppercase()
        ))
    }
}

impl fmt::Display for MammogramView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.laterality.simple_name(),
            self.view.simple_name()
        )
    }
}
