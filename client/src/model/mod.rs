pub mod block;
pub mod duty;
pub mod genesis;
pub mod node;
pub mod state;
pub mod validator;
