pub mod claims;
pub mod codec;
pub mod errors;
pub mod issuer;

pub use claims::Claims;
pub use claims::Role;
pub use claims::TokenKind;
pub use codec::TokenCodec;
pub use errors::RoleError;
pub use errors::TokenError;
pub use issuer::TokenIssuer;
pub use issuer::TokenPair;
