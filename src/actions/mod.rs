pub mod applaunch;
pub mod fileopen;
