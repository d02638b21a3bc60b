// Domain layer: the carpark data model, the availability lookup and the ports
// the pipeline is written against.

pub mod index;
pub mod model;
pub mod ports;
