pub(crate) mod cards;
pub(crate) mod modal;
pub(crate) mod text;
