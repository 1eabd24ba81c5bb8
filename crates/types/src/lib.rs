pub mod event;
pub mod fee;
pub mod outcome;
pub mod request;
pub mod status;

pub use event::*;
pub use fee::*;
pub use outcome::*;
pub use request::*;
pub use status::*;

/// Maximum number of input assets accepted in one conversion request
pub const MAX_ASSETS: usize = 50;

/// Hard cap on the protocol fee rate (100 bps = 1%)
pub const MAX_FEE_BPS: u16 = 100;

/// Fee rate applied until a controller changes it (10 bps = 0.1%)
pub const DEFAULT_FEE_BPS: u16 = 10;

/// Denominator for basis-point arithmetic
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Returns true for the null identifier (empty or whitespace-only address)
pub fn is_null_addr(addr: &cosmwasm_std::Addr) -> bool {
    addr.as_str().trim().is_empty()
}
