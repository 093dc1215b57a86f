//! Command implementations for the Granary CLI

pub(crate) mod common;
pub(crate) mod extract;
pub(crate) mod init;
pub(crate) mod load;
pub(crate) mod run;
pub(crate) mod transform;
pub(crate) mod validate;
