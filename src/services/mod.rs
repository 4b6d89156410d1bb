pub mod init;
pub mod live;
pub mod radiocult;
pub mod schedule;
pub mod sync;
