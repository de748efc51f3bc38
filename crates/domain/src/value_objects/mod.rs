pub mod direction;
pub mod percent_change;
pub mod status;
pub mod thresholds;

pub use direction::Direction;
pub use percent_change::PercentChange;
pub use status::Status;
pub use thresholds::Thresholds;
