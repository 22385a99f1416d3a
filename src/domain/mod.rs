// Domain layer: street and section models plus the ports the engine drives.

pub mod model;
pub mod ports;
