pub mod health;
pub mod serve;
pub mod status;
pub mod users;
