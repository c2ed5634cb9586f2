// Summary assembly — pipeline orchestration and request validation.

pub mod assembler;
pub mod validation;
