// Domain layer: manifest/session models and the ports the engine depends on.

pub mod model;
pub mod ports;
