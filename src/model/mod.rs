pub mod cell;
pub mod mandala;
pub mod settings;

pub use cell::*;
pub use mandala::*;
pub use settings::*;
