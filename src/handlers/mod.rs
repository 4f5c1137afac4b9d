// handlers - HTTP surface
//
// public: tenant-positional routes (`/:subdomain/...`). Reached directly on
//         the root domain / local hosts, or via the resolver's rewrite on a
//         tenant subdomain.
// admin:  `/api/admin/...`, an always-public prefix (never rewritten),
//         guarded by JWT.

pub mod admin;
pub mod public;
pub mod service;
