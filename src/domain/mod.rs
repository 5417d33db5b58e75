// Domain layer: tire models and the collaborator ports the core depends on.

pub mod model;
pub mod ports;
