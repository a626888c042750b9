// Domain layer: WordPress wire models, render-ready projections and ports (interfaces).
// No HTTP or filesystem code lives here.

pub mod model;
pub mod ports;
