//! Authentication: password hashing, bearer tokens, and the request
//! extractor that turns an `Authorization` header into an [`AuthUser`].

pub mod extractor;
pub mod password;
pub mod revocation;
pub mod token;

pub use extractor::AuthUser;
pub use revocation::TokenDenylist;
pub use token::{Claims, IssuedToken, TokenIssuer};
