pub mod health;
pub mod live;
pub mod shows;
pub mod sync;
