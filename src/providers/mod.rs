pub mod degiro;
pub mod nbp;
pub mod util;

pub use degiro::DegiroProvider;
pub use nbp::{NbpRates, RateTable};
