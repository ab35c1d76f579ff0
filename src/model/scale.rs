use crate::model::constants::{DEFAULT_RATING, SCALING_FACTOR};

/// Affine mapping between the public rating scale (centered on 1500)
/// and the internal Glicko-2 scale (centered on 0).
///
/// The scale is fixed: the only instance is [`ScaleConverter::STANDARD`]. A configured
/// starting rating changes where new players begin, not where the scale is centered.
/// Volatility is not converted: it already lives on the internal scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleConverter {
    scaling_factor: f64,
    center: f64
}

impl Default for ScaleConverter {
    fn default() -> Self {
        ScaleConverter::STANDARD
    }
}

impl ScaleConverter {
    pub const STANDARD: ScaleConverter = ScaleConverter {
        scaling_factor: SCALING_FACTOR,
        center: DEFAULT_RATING
    };

    pub fn scaling_factor(&self) -> f64 {
        self.scaling_factor
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn to_internal_rating(&self, rating: f64) -> f64 {
        (rating - self.center) / self.scaling_factor
    }

    pub fn to_public_rating(&self, rating: f64) -> f64 {
        rating * self.scaling_factor + self.center
    }

    pub fn to_internal_rd(&self, rd: f64) -> f64 {
        rd / self.scaling_factor
    }

    pub fn to_public_rd(&self, rd: f64) -> f64 {
        rd * self.scaling_factor
    }
}
