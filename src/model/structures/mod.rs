pub mod rating_adjustment;
pub mod rating_adjustment_type;
pub mod rating_snapshot;
pub mod result_buffer;
