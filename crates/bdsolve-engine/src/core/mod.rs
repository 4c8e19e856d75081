pub use self::{board::*, piece::*};

pub(crate) mod board;
pub(crate) mod piece;
pub mod region;
