pub(crate) mod canvas;
pub(crate) mod permutation;
pub(crate) mod scheduler;
