pub mod info;
pub mod ping;
pub mod validator;
