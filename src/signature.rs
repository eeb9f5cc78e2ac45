use md5::{Digest, Md5};

use crate::params::Params;

/// Reserved parameter carrying the body signature.
pub const SIGNATURE_KEY: &str = "kalsig";

/// Compute the signature of a serialized body: its MD5 digest as lowercase hex
pub fn sign(body: &str) -> String {
    format!("{:x}", Md5::digest(body.as_bytes()))
}

/// Sign `params` in place.
///
/// Any previous signature is dropped first so the digest always covers
/// the container without its own signature key.
pub fn apply_signature(params: &mut Params) -> String {
    params.remove(SIGNATURE_KEY);
    let signature = sign(&params.serialize());
    params.add(SIGNATURE_KEY, signature.clone());
    signature
}

/// Check that a signed container still matches its signature
pub fn verify(params: &Params) -> bool {
    let Some(signature) = params.get_str(SIGNATURE_KEY) else {
        return false;
    };
    let mut unsigned = params.clone();
    unsigned.remove(SIGNATURE_KEY);
    sign(&unsigned.serialize()) == signature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_known_digest() {
        assert_eq!(sign(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(sign("{}"), "99914b932bd37a50b983c5e7c90ae93b");
    }

    #[test]
    fn test_apply_signature_excludes_itself() {
        let mut params = Params::new().with("name", "clip");
        let expected = sign(r#"{"name":"clip"}"#);

        let signature = apply_signature(&mut params);
        assert_eq!(signature, expected);
        assert_eq!(params.get_str(SIGNATURE_KEY), Some(expected.as_str()));

        // re-signing a signed container yields the same digest
        assert_eq!(apply_signature(&mut params), expected);
        assert!(verify(&params));
    }

    #[test]
    fn test_verify_detects_mutation() {
        let mut params = Params::new().with("name", "clip");
        apply_signature(&mut params);
        params.add("name", "changed");
        assert!(!verify(&params));
        assert!(!verify(&Params::new()));
    }
}
