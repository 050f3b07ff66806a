pub(crate) mod adapter;
pub(crate) mod orchestrator;
pub(crate) mod props;
pub(crate) mod session;
