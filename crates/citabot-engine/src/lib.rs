pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod flow;
pub mod invoker;
pub mod resolver;
pub mod scope;
pub mod selector;
pub mod session;
pub mod site;
pub mod step;
pub mod verifier;
pub mod wait;
