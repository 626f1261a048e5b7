pub mod add;
pub mod agenda;
pub mod configure;
pub mod delete;
pub mod edit;
pub mod import;
pub mod quickadd;
pub mod search;
