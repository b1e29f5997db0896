pub mod home;
pub mod pad;
pub mod sensors;
