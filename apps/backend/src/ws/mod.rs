pub mod games;
pub mod hub;
pub mod protocol;
pub mod session;
