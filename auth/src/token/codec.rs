use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;

/// Codec for signed, tamper-evident bearer tokens.
///
/// Holds the signing secret and algorithm for the process lifetime; key
/// rotation is a redeploy, not a runtime operation. Only HMAC algorithms
/// are supported since both keys derive from one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a codec from a signing secret and an algorithm identifier.
    ///
    /// # Arguments
    /// * `secret` - Signing secret, at least 32 bytes for HS256
    /// * `algorithm` - Algorithm name (`HS256`, `HS384`, or `HS512`)
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Name is unknown or not an HMAC algorithm
    pub fn new(secret: &[u8], algorithm: &str) -> Result<Self, TokenError> {
        let parsed = algorithm
            .parse::<Algorithm>()
            .map_err(|_| TokenError::UnsupportedAlgorithm(algorithm.to_string()))?;

        if !matches!(parsed, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(TokenError::UnsupportedAlgorithm(algorithm.to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: parsed,
        })
    }

    /// Encode a claim set into a signed, URL-safe token string.
    ///
    /// The signature covers the entire claim payload.
    ///
    /// # Errors
    /// * `EncodingFailed` - Serialization or signing failed
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Decode a token back into its claims.
    ///
    /// The signature is verified before the expiry check, with zero leeway
    /// on `exp`.
    ///
    /// # Errors
    /// * `Malformed` - Token cannot be parsed, or a mandatory claim
    ///   (including `kind`) is missing
    /// * `InvalidSignature` - Signature mismatch, including a token signed
    ///   with a different algorithm
    /// * `Expired` - Signature verifies but `exp` is in the past
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::Malformed,
                }
            })?;

        Ok(token_data.claims)
    }
}
