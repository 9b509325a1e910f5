//! Startup defaults: the five seeded stages and the initial value.

/// Equations of the seeded nodes, ids 1..=5 in order.
pub const DEFAULT_EQUATIONS: [&str; 5] = ["x^2", "2x+4", "x^2+20", "x-2", "x/2"];

/// Value fed into the SOURCE end of the chain at startup.
pub const DEFAULT_INITIAL_VALUE: f64 = 2.0;

/// Stage order used by strict mode and by the pre-wired default chain.
pub const DEFAULT_STAGE_ORDER: [u32; 5] = [1, 2, 4, 5, 3];
