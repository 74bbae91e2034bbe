pub mod realtime;

pub mod auth;
pub mod db;
pub mod storage;

#[cfg(test)]
pub mod memory;
