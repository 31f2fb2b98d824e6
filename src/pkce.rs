use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Challenge method sent alongside [`generate_code_challenge`] output.
pub const CHALLENGE_METHOD: &str = "s256";

/// Generates the secret half of a PKCE pair for a recovery e-mail request.
///
/// Returns a 64-character URL-safe string (RFC 7636: 43-128 chars). Whoever
/// requested the e-mail must keep it until the link's code is exchanged.
#[must_use]
pub fn generate_code_verifier() -> String {
    let entropy: [u8; 48] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(entropy)
}

/// Public half sent with the recovery request; the auth service stores it
/// and checks the verifier against it when the link's code is exchanged.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier))
}
