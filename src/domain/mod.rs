pub mod activity;
pub mod level;
pub mod points;
pub mod state;
pub mod units;

pub use activity::*;
pub use level::*;
pub use points::*;
pub use state::*;
pub use units::*;
