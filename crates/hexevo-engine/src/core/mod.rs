pub use self::{cell::*, chain::*, snapshot::*};

pub(crate) mod cell;
pub(crate) mod chain;
pub(crate) mod snapshot;
