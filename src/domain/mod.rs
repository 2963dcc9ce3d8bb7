// Domain layer: records the backend exchanges with us, plus the ports the
// view-models talk through. No I/O here.

pub mod booking;
pub mod clinical;
pub mod inventory;
pub mod model;
pub mod ports;
pub mod schedule;
