
pub mod cmd;
