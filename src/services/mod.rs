pub mod orders;
pub mod sweep;
pub mod tenants;

pub use orders::{advance_status, place_order, PlaceOrderRequest, PlacedOrder};
pub use sweep::{spawn_expiry_sweep, sweep_once};
pub use tenants::create_tenant;
