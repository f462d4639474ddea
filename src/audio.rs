pub(crate) mod chime;
pub(crate) mod graph;
pub(crate) mod synth;
