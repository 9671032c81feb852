pub mod entity;
pub mod intent;
pub mod inventory;
pub mod turn;
