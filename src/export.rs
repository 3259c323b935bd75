pub(crate) mod batch;
pub(crate) mod pacing;
pub(crate) mod run;
pub(crate) mod sink;
pub(crate) mod status;
