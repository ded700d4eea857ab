pub mod db;
pub mod kv_store {
    pub mod entity;
    pub mod memory;
    pub mod repository;
}
