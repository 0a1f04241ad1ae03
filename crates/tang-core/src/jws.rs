//! JWS advertisement signing (General JSON Serialization)
//!
//! One payload, the advertised JWK set, signed independently by every
//! signing key. Each signature is raw `r || s` (132 bytes for P-521), not DER.

use p521::ecdsa::{signature::Signer, Signature};
use serde::{Deserialize, Serialize};

use crate::codec::base64url_encode;
use crate::error::Result;
use crate::jwk::{PrivateJwk, PublicJwk, ALG_ES512};

/// Content type of the advertised payload
pub const JWK_SET_CONTENT_TYPE: &str = "jwk-set+json";

/// Protected header shared by every advertisement signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedHeader {
    pub alg: String,
    pub cty: String,
}

impl Default for ProtectedHeader {
    fn default() -> Self {
        Self {
            alg: ALG_ES512.into(),
            cty: JWK_SET_CONTENT_TYPE.into(),
        }
    }
}

/// JWK set as carried in the advertisement payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<PublicJwk>,
}

/// One entry of `signatures`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsSignature {
    pub protected: String,
    pub signature: String,
}

/// Signed advertisement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jws {
    pub payload: String,
    pub signatures: Vec<JwsSignature>,
}

/// Sign the advertisement payload with every key in `signing_keys`.
///
/// `payload_keys` are [`PublicJwk`]s, a type with no private member, so
/// the payload cannot carry a scalar.
pub fn sign_advertisement(payload_keys: &[PublicJwk], signing_keys: &[PrivateJwk]) -> Result<Jws> {
    let set = JwkSet {
        keys: payload_keys.to_vec(),
    };
    let payload = base64url_encode(serde_json::to_vec(&set)?);
    let protected = base64url_encode(serde_json::to_vec(&ProtectedHeader::default())?);
    let signing_input = format!("{}.{}", protected, payload);

    let signatures = signing_keys
        .iter()
        .map(|key| {
            let signature: Signature = key.signing_key()?.try_sign(signing_input.as_bytes())?;
            Ok(JwsSignature {
                protected: protected.clone(),
                signature: base64url_encode(signature.to_bytes()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Jws { payload, signatures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::base64url_decode;
    use crate::keygen::{generate_exchange_key, generate_signing_key};
    use p521::ecdsa::{signature::Verifier, VerifyingKey};

    fn verifying_key(key: &PrivateJwk) -> VerifyingKey {
        let point = key.public().to_affine().unwrap();
        VerifyingKey::from_affine(point).unwrap()
    }

    fn advertise(signers: &[PrivateJwk]) -> Jws {
        let exchange = generate_exchange_key().unwrap();
        let mut payload: Vec<PublicJwk> = signers.iter().map(PublicJwk::from).collect();
        payload.push(exchange.public().clone());
        sign_advertisement(&payload, signers).unwrap()
    }

    #[test]
    fn test_signature_verifies() {
        let signer = generate_signing_key().unwrap();
        let jws = advertise(std::slice::from_ref(&signer));

        let entry = &jws.signatures[0];
        let input = format!("{}.{}", entry.protected, jws.payload);
        let raw = base64url_decode(&entry.signature).unwrap();
        let signature = Signature::from_slice(&raw).unwrap();

        assert!(verifying_key(&signer).verify(input.as_bytes(), &signature).is_ok());
    }

    #[test]
    fn test_signature_fails_for_other_key() {
        let signer = generate_signing_key().unwrap();
        let other = generate_signing_key().unwrap();
        let jws = advertise(std::slice::from_ref(&signer));

        let entry = &jws.signatures[0];
        let input = format!("{}.{}", entry.protected, jws.payload);
        let signature = Signature::from_slice(&base64url_decode(&entry.signature).unwrap()).unwrap();

        assert!(verifying_key(&other).verify(input.as_bytes(), &signature).is_err());
    }

    #[test]
    fn test_signature_is_raw_132_bytes() {
        let jws = advertise(&[generate_signing_key().unwrap()]);
        let raw = base64url_decode(&jws.signatures[0].signature).unwrap();
        assert_eq!(raw.len(), 132);
    }

    #[test]
    fn test_one_entry_per_signer() {
        let signers: Vec<PrivateJwk> = (0..3).map(|_| generate_signing_key().unwrap()).collect();
        let jws = advertise(&signers);
        assert_eq!(jws.signatures.len(), 3);

        // Every entry verifies against its own key over the shared payload
        for (signer, entry) in signers.iter().zip(&jws.signatures) {
            let input = format!("{}.{}", entry.protected, jws.payload);
            let signature =
                Signature::from_slice(&base64url_decode(&entry.signature).unwrap()).unwrap();
            assert!(verifying_key(signer).verify(input.as_bytes(), &signature).is_ok());
        }
    }

    #[test]
    fn test_protected_header() {
        let jws = advertise(&[generate_signing_key().unwrap()]);
        let header: serde_json::Value =
            serde_json::from_slice(&base64url_decode(&jws.signatures[0].protected).unwrap())
                .unwrap();
        assert_eq!(header, serde_json::json!({"alg": "ES512", "cty": "jwk-set+json"}));
    }

    #[test]
    fn test_payload_is_public_jwk_set() {
        let signer = generate_signing_key().unwrap();
        let jws = advertise(std::slice::from_ref(&signer));

        let payload: serde_json::Value =
            serde_json::from_slice(&base64url_decode(&jws.payload).unwrap()).unwrap();
        let keys = payload["keys"].as_array().unwrap();

        assert_eq!(keys.len(), 2);
        for key in keys {
            assert!(key.get("d").is_none());
            assert_eq!(key["kty"], "EC");
            assert_eq!(key["crv"], "P-521");
        }
        assert!(!jws.payload.contains('='));
    }

    #[test]
    fn test_no_signers_no_signatures() {
        let exchange = generate_exchange_key().unwrap();
        let jws = sign_advertisement(&[exchange.public().clone()], &[]).unwrap();
        assert!(jws.signatures.is_empty());
    }
}
