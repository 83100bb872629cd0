pub(crate) mod aggregate;
pub(crate) mod items;
pub(crate) mod meta;
pub(crate) mod migrate;
pub(crate) mod season;
pub(crate) mod shared;
pub(crate) mod sync;
