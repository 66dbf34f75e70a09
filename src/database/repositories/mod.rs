//! Database repositories module
//! 
//! This module contains all repository implementations for data access

pub mod user;
pub mod category;
pub mod subcategory;
pub mod item;
pub mod cart;
pub mod purchase;

// Re-export repositories
pub use user::UserRepository;
pub use category::CategoryRepository;
pub use subcategory::SubcategoryRepository;
pub use item::ItemRepository;
pub use cart::CartRepository;
pub use purchase::PurchaseRepository;
