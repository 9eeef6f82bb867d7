pub mod cart_items;
pub mod favorites;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod sea_orm_active_enums;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use favorites::Entity as Favorites;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use users::Entity as Users;
