pub mod castep;
pub mod discovery;
