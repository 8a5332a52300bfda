pub(crate) mod analyze;
pub(crate) mod health;
