use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha512};

/// Stable digest of a rendered level's raw pixel buffer, used to spot
/// identical levels across builds and localizations. SHA-512 over the
/// exact bytes (not the encoded image), base64 for tabular comparison.
pub fn fingerprint(bytes: &[u8]) -> String {
    STANDARD.encode(Sha512::digest(bytes))
}
