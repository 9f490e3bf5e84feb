// Re-export parry for the bounding volumes shared with the host engine
pub use parry3d_f64 as parry3d;

// Our Real scalar type. Earth-centered coordinates are in the 6.4e6 m range,
// so single precision is not an option here.
pub type Real = f64;

/// Smallest squared length still treated as a usable direction.
pub const EPSILON: Real = 1e-12;

/// π/2
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Unit conversion
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
pub const KILOMETER: Real = 1000.0;
