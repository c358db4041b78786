//! Relaxed TLS client configuration for HTTPS probes.
//!
//! HTTPS probes check reachability, not transport security: a self-signed or
//! expired certificate, or one issued for another name, must not fail the
//! probe. [`ProbeTlsConfig::relaxed`] builds a client config that accepts any
//! server certificate and enables every protocol version and cipher suite
//! the `ring` provider ships.
//!
//! # Warning
//!
//! This configuration authenticates nobody. Use it for health probes only.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};

use crate::error::ProbeResult;

/// Immutable TLS client configuration shared by all HTTPS probes.
///
/// Only [`ProbeTlsConfig::relaxed`] constructs one.
#[derive(Clone)]
pub struct ProbeTlsConfig {
    client_config: Arc<rustls::ClientConfig>,
}

impl std::fmt::Debug for ProbeTlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeTlsConfig")
            .field("alpn", &self.client_config.alpn_protocols)
            .finish_non_exhaustive()
    }
}

impl ProbeTlsConfig {
    /// Build the relaxed probe configuration.
    pub fn relaxed() -> ProbeResult<Self> {
        let mut provider = rustls::crypto::ring::default_provider();
        provider.cipher_suites = rustls::crypto::ring::ALL_CIPHER_SUITES.to_vec();
        let provider = Arc::new(provider);

        let config = rustls::ClientConfig::builder_with_provider(provider.clone())
            .with_protocol_versions(rustls::ALL_VERSIONS)?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert { provider }))
            .with_no_client_auth();

        Ok(Self {
            client_config: Arc::new(config),
        })
    }

    /// Connector for one probe connection.
    pub fn connector(&self) -> tokio_rustls::TlsConnector {
        tokio_rustls::TlsConnector::from(Arc::clone(&self.client_config))
    }

    pub fn client_config(&self) -> &Arc<rustls::ClientConfig> {
        &self.client_config
    }
}

// ── Certificate verifier that accepts everything ─────────────────────

/// Skips chain, expiry and hostname checks. Handshake signatures are not
/// checked either.
#[derive(Debug)]
struct AcceptAnyCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
