pub mod audit;
pub mod config;
pub mod effects;
pub mod error;
pub mod executor;
pub mod gate;
pub mod io;
pub mod notify;
pub mod paths;
pub mod registry;

pub use error::{EffectError, RemedyError, Result};
pub use executor::{ActionRequest, ExecutionOutcome, Executor};
