use serde_repr::{Deserialize_repr, Serialize_repr};
use std::convert::TryFrom;
use strum_macros::EnumIter;

#[derive(Deserialize_repr, Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[repr(u8)]
pub enum RatingAdjustmentType {
    /// RD grew with elapsed time, no results involved
    Decay = 0,
    /// Period closed with at least one result
    Period = 1,
    /// Period closed without results
    Idle = 2,
    /// Single result applied immediately
    Instant = 3
}

impl TryFrom<i32> for RatingAdjustmentType {
    type Error = ();

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(RatingAdjustmentType::Decay),
            1 => Ok(RatingAdjustmentType::Period),
            2 => Ok(RatingAdjustmentType::Idle),
            3 => Ok(RatingAdjustmentType::Instant),
            _ => Err(())
        }
    }
}
