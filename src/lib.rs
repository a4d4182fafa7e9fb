pub mod axis;
pub mod harness;
pub mod motion;
pub mod session;
pub mod status;
pub mod tracking;
pub mod transport;
