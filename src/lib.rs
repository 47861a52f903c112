pub mod account;
pub mod clock;
pub mod consts;
pub mod form;
pub mod models;
pub mod rules;
pub mod schema;
pub mod utils;
