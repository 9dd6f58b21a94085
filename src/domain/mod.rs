// Domain layer: core models and ports (interfaces).

pub mod language;
pub mod mappings;
pub mod model;
pub mod ports;
