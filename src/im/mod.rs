pub mod core;
pub use self::core::{Im, RGBAIm};

pub mod roi;
pub use self::roi::ROI;

// Decode / encode
// -----------------------------------------------------------------------------

pub mod io;
