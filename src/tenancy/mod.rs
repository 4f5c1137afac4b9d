// tenancy - request-to-tenant resolution
//
// Resolution runs exactly once per request, in the outer middleware layer,
// before any route handler or data query. Everything downstream receives
// the tenant positionally (first path segment) or as a `TenantKey`
// request extension; nothing re-parses the host.

pub mod key;
pub mod resolver;

pub use key::TenantKey;
pub use resolver::{first_segment, parse_host, split_path_and_query, HostParts, Resolution, TenantResolver};
