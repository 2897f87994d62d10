pub mod config_show;
pub mod meta_package;
pub mod readme;
pub mod requirements;
