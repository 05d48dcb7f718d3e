//! Physically simulated layout of Groups, Items and SubItems drawn as soft
//! puff shapes, with an analytic focus mode.

pub mod engine;
pub mod tree;
pub mod util;
