pub mod branch;
pub mod category;
pub mod menu_item;
pub mod order;
pub mod tenant;

pub use branch::{Branch, NewBranch};
pub use category::{Category, NewCategory};
pub use menu_item::{MenuItem, NewMenuItem};
pub use order::{Customer, NewOrder, Order, OrderLine};
pub use tenant::{NewTenant, Tenant};
