//! Process-scoped session store.

pub mod store;
