pub mod precedence;
pub mod width_checks;
