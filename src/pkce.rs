//! PKCE (Proof Key for Code Exchange) implementation
//! RFC 7636: https://tools.ietf.org/html/rfc7636

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};

/// PKCE challenge pair containing code verifier and code challenge
#[derive(Debug, Clone)]
pub struct Pkce {
    code_verifier: String,
    code_challenge: String,
}

impl Pkce {
    /// Generate a new PKCE challenge pair
    ///
    /// Creates a cryptographically secure random code verifier and derives
    /// the code challenge using SHA256.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixauth::pkce::Pkce;
    ///
    /// let pkce = Pkce::generate();
    /// assert_eq!(Pkce::code_challenge_method(), "S256");
    /// ```
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let random_bytes: [u8; 32] = rng.gen();

        // Base64 URL encode without padding, 32 bytes -> 43 chars
        Self::from_verifier(URL_SAFE_NO_PAD.encode(random_bytes))
    }

    /// Derive the challenge pair from a known verifier.
    ///
    /// The challenge is a pure function of the verifier, so this is how
    /// tests pin the S256 transformation to a fixed input.
    pub fn from_verifier(code_verifier: impl Into<String>) -> Self {
        let code_verifier = code_verifier.into();
        let code_challenge = s256(code_verifier.as_bytes());

        Self {
            code_verifier,
            code_challenge,
        }
    }

    /// Get the code verifier
    pub fn code_verifier(&self) -> &str {
        &self.code_verifier
    }

    /// Get the code challenge
    pub fn code_challenge(&self) -> &str {
        &self.code_challenge
    }

    /// Get the code challenge method (always S256)
    pub fn code_challenge_method() -> &'static str {
        "S256"
    }
}

/// S256 transformation: base64url(SHA-256(data)) with padding stripped.
fn s256(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(data))
}
