//! Smith Manoeuvre projection engine.
//!
//! Computes the projected financial outcome of converting non-deductible
//! primary-residence mortgage interest into tax-deductible investment-loan
//! interest: home equity freed by mortgage paydown is re-borrowed through a
//! HELOC to fund an income-producing rental property, and the resulting tax
//! refund and rental cash flow accelerate the primary mortgage.
//!
//! The engine is a pure, synchronous computation over an immutable input
//! snapshot. The only side effect is a fire-and-forget diagnostic snapshot
//! written to an injected [`diagnostics::DiagnosticsSink`].

pub mod diagnostics;
pub mod error;
pub mod household;
pub mod mortgage;
pub mod rental;
pub mod scenario;
pub mod tax;
pub mod types;

pub use error::SmithyError;
pub use scenario::{calculate_smith_manoeuvre, CalculationResult, SmithManoeuvreEngine};
pub use types::*;

/// Standard result type for all engine operations
pub type SmithyResult<T> = Result<T, SmithyError>;
