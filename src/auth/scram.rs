//! Client side of the SCRAM-SHA-256 exchange (RFC 5802, RFC 7677).
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes drawn for the client nonce before base64 encoding.
const NONCE_LEN: usize = 18;

/// Phases of the exchange; sub-messages arriving in any other order are
/// fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingChallenge,
    AwaitingFinal,
    Done,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Self::AwaitingChallenge => "awaiting the server-first challenge",
            Self::AwaitingFinal => "awaiting the server-final signature",
            Self::Done => "already complete",
        }
    }
}

/// Client state of one SCRAM-SHA-256 authentication exchange.
///
/// Driven by the `AuthenticationSASL*` sub-messages:
///
/// 1. Send [`initial_response`][Self::initial_response] inside
///    `SASLInitialResponse`.
/// 2. Feed the `AuthenticationSASLContinue` payload to
///    [`process_server_first`][Self::process_server_first], send the result
///    inside `SASLResponse`.
/// 3. Feed the `AuthenticationSASLFinal` payload to
///    [`process_server_final`][Self::process_server_final], which verifies
///    that the server itself knows the password.
///
/// The username attribute of client-first is left empty: postgres takes the
/// username from the startup message and ignores the SCRAM one.
#[derive(Debug)]
pub struct ScramAuthenticator {
    password: String,
    client_nonce: String,
    client_first_bare: String,
    auth_message: String,
    salted_password: [u8; 32],
    phase: Phase,
}

impl ScramAuthenticator {
    /// The mechanism this client implements.
    pub const MECHANISM: &'static str = "SCRAM-SHA-256";

    /// Start an exchange with a fresh random nonce.
    pub fn new(user: &str, password: &str) -> ScramAuthenticator {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        Self::with_nonce(user, password, BASE64.encode(nonce))
    }

    /// Start an exchange with a caller provided nonce.
    ///
    /// This exists so tests can drive the exchange deterministically
    /// against published vectors; [`new`][Self::new] draws the nonce from
    /// the OS random source and is what connection code should use.
    pub fn with_nonce(_user: &str, password: &str, nonce: impl Into<String>) -> ScramAuthenticator {
        let client_nonce = nonce.into();
        let client_first_bare = format!("n=,r={client_nonce}");
        ScramAuthenticator {
            password: password.to_owned(),
            client_nonce,
            client_first_bare,
            auth_message: String::new(),
            salted_password: [0; 32],
            phase: Phase::AwaitingChallenge,
        }
    }

    /// The client-first message, with the `n,,` gs2 header for no channel
    /// binding.
    pub fn initial_response(&self) -> Bytes {
        format!("n,,{}", self.client_first_bare).into_bytes().into()
    }

    /// Process the server-first message `r=<nonce>,s=<salt>,i=<iterations>`
    /// and produce the client-final message carrying the proof.
    pub fn process_server_first(&mut self, data: &[u8]) -> Result<Bytes, AuthError> {
        if self.phase != Phase::AwaitingChallenge {
            return Err(AuthError::OutOfOrder(self.phase.name()));
        }

        let server_first = std::str::from_utf8(data)
            .map_err(|_| AuthError::Malformed("server-first is not UTF-8".into()))?;

        let mut server_nonce = None;
        let mut salt = None;
        let mut iterations = None;
        for attr in server_first.split(',') {
            if let Some(value) = attr.strip_prefix("r=") {
                server_nonce = Some(value);
            } else if let Some(value) = attr.strip_prefix("s=") {
                salt = Some(BASE64.decode(value).map_err(|_| {
                    AuthError::Malformed("salt is not valid base64".into())
                })?);
            } else if let Some(value) = attr.strip_prefix("i=") {
                iterations = Some(value.parse::<u32>().map_err(|_| {
                    AuthError::Malformed("iteration count is not a number".into())
                })?);
            }
        }

        let server_nonce = server_nonce
            .ok_or_else(|| AuthError::Malformed("server-first misses nonce".into()))?;
        let salt = salt.ok_or_else(|| AuthError::Malformed("server-first misses salt".into()))?;
        let iterations = iterations
            .ok_or_else(|| AuthError::Malformed("server-first misses iterations".into()))?;
        if iterations == 0 {
            return Err(AuthError::Malformed("zero iteration count".into()));
        }

        // the server appends its nonce to ours; anything else is a replay
        if !server_nonce.starts_with(self.client_nonce.as_str()) {
            return Err(AuthError::NonceMismatch);
        }

        pbkdf2_hmac::<Sha256>(
            self.password.as_bytes(),
            &salt,
            iterations,
            &mut self.salted_password,
        );

        let client_key = hmac_sha256(&self.salted_password, b"Client Key");
        let stored_key: [u8; 32] = Sha256::digest(client_key).into();

        // "biws" is base64("n,,"), the gs2 header repeated as channel binding
        let client_final_without_proof = format!("c=biws,r={server_nonce}");
        self.auth_message = format!(
            "{},{},{}",
            self.client_first_bare, server_first, client_final_without_proof,
        );

        let client_signature = hmac_sha256(&stored_key, self.auth_message.as_bytes());
        let client_proof: Vec<u8> = client_key
            .iter()
            .zip(client_signature)
            .map(|(key, sig)| key ^ sig)
            .collect();

        self.phase = Phase::AwaitingFinal;
        let client_final =
            format!("{client_final_without_proof},p={}", BASE64.encode(client_proof));
        Ok(client_final.into_bytes().into())
    }

    /// Verify the server-final message `v=<signature>`.
    ///
    /// The comparison runs in constant time through [`Mac::verify_slice`].
    pub fn process_server_final(&mut self, data: &[u8]) -> Result<(), AuthError> {
        if self.phase != Phase::AwaitingFinal {
            return Err(AuthError::OutOfOrder(self.phase.name()));
        }

        let server_final = std::str::from_utf8(data)
            .map_err(|_| AuthError::Malformed("server-final is not UTF-8".into()))?;
        let signature = server_final
            .split(',')
            .find_map(|attr| attr.strip_prefix("v="))
            .ok_or_else(|| AuthError::Malformed("server-final misses signature".into()))?;
        let signature = BASE64
            .decode(signature)
            .map_err(|_| AuthError::Malformed("server signature is not valid base64".into()))?;

        let server_key = hmac_sha256(&self.salted_password, b"Server Key");
        let mut mac = HmacSha256::new_from_slice(&server_key).expect("any key size is valid");
        mac.update(self.auth_message.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::ServerSignatureMismatch)?;

        self.phase = Phase::Done;
        Ok(())
    }

    /// Whether the server signature has been verified.
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("any key size is valid");
    mac.update(data);
    mac.finalize().into_bytes().into()
}
