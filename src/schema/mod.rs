pub(crate) mod fields;
pub(crate) mod naming;
pub(crate) mod node;
