// Token inspection - payload decoding and role claim extraction.
// Signature verification belongs to the identity provider and the backend.

pub mod roles;
pub mod token;

pub use roles::{collect_roles, has_role};
pub use token::{decode_payload, encode_payload, inspect_header, summarize_token, ClaimSet};
