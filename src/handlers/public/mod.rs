pub mod menu;
pub mod orders;
pub mod storefront;

pub use menu::menu;
pub use orders::place_order;
pub use storefront::{branches, storefront};
