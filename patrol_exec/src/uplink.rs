//! # Uplink client
//!
//! Delivers captured tag identifiers to the remote collection endpoint as one-shot HTTPS POSTs.
//! Uploads are fire and forget: a single attempt is made per identifier, and a failed attempt is
//! reported to the caller for logging but never retried, queued or persisted.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use serde::{Deserialize, Serialize};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the uplink client.
#[derive(Debug, Clone, Deserialize)]
pub struct UplinkParams {
    /// URL of the collection endpoint
    pub endpoint: String,

    /// Maximum duration of a single upload attempt.
    ///
    /// Units: seconds
    pub request_timeout_s: f64,

    /// Maximum duration of a single link probe.
    ///
    /// Units: seconds
    pub link_probe_timeout_s: f64,
}

/// The wire payload of a single upload, a JSON object with exactly one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UplinkPayload {
    /// The formatted tag identifier
    pub uid: String,
}

/// Uplink client speaking HTTPS to the configured endpoint.
///
/// The deployed endpoint sits behind a redirecting script host whose certificate chain the
/// vehicle does not carry, so certificate validation is switched off and redirects are followed.
/// This is a known weakness of the deployment, kept as-is.
pub struct HttpUplink {
    agent: ureq::Agent,
    endpoint: String,
    probe_host: String,
    probe_port: u16,
    probe_timeout: Duration,
}

/// Simulated uplink used on the bench and in tests.
///
/// Records every attempted payload in order, and can be made to fail every attempt while still
/// recording it.
#[derive(Debug, Default)]
pub struct SimUplink {
    /// Every uploaded identifier, in attempt order
    pub uploads: Vec<String>,

    /// When set, every upload attempt fails with a transport error
    pub fail_uploads: bool,

    /// Value returned by the link probe
    pub connected: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors associated with the uplink client.
#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("The endpoint URL is invalid: {0}")]
    EndpointParseError(url::ParseError),

    #[error("The endpoint URL has no host")]
    EndpointNoHost,

    #[error("Parameter `{0}` is out of range")]
    InvalidParam(&'static str),

    #[error("Cannot build the TLS connector: {0}")]
    TlsInitError(native_tls::Error),

    #[error("Cannot serialise the payload: {0}")]
    PayloadSerialiseError(serde_json::Error),

    #[error("The endpoint returned HTTP status {0}")]
    HttpStatus(u16),

    #[error("Transport error during upload: {0}")]
    TransportError(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait providing a unified API for uplink delivery.
pub trait Uplink {
    /// Upload the given formatted identifier in a single fire-and-forget attempt.
    ///
    /// An error means the identifier has been dropped. The caller may log it but there is
    /// nothing to retry, the uplink keeps no record of the attempt.
    fn upload(&mut self, uid: &str) -> Result<(), UplinkError>;

    /// True if the link to the endpoint is currently usable.
    fn is_connected(&self) -> bool;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl UplinkParams {
    /// Check that the loaded parameters are usable.
    ///
    /// Both timeouts are fed into [`Duration`] values, so they must be finite and non-negative.
    pub fn validate(&self) -> Result<(), UplinkError> {
        let durations = [
            ("request_timeout_s", self.request_timeout_s),
            ("link_probe_timeout_s", self.link_probe_timeout_s),
        ];

        for (name, value) in durations.iter() {
            if !value.is_finite() || *value < 0.0 {
                return Err(UplinkError::InvalidParam(name));
            }
        }

        Ok(())
    }
}

impl HttpUplink {
    /// Build the uplink client from the given parameters.
    pub fn new(params: &UplinkParams) -> Result<Self, UplinkError> {
        params.validate()?;

        let url = Url::parse(&params.endpoint).map_err(UplinkError::EndpointParseError)?;
        let probe_host = match url.host_str() {
            Some(h) => h.to_string(),
            None => return Err(UplinkError::EndpointNoHost),
        };
        let probe_port = url.port_or_known_default().unwrap_or(443);

        let tls_connector = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()
            .map_err(UplinkError::TlsInitError)?;

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs_f64(params.request_timeout_s))
            .redirects(5)
            .tls_connector(Arc::new(tls_connector))
            .build();

        Ok(Self {
            agent,
            endpoint: params.endpoint.clone(),
            probe_host,
            probe_port,
            probe_timeout: Duration::from_secs_f64(params.link_probe_timeout_s),
        })
    }
}

impl Uplink for HttpUplink {
    fn upload(&mut self, uid: &str) -> Result<(), UplinkError> {
        let payload = serde_json::to_string(&UplinkPayload {
            uid: uid.to_string(),
        })
        .map_err(UplinkError::PayloadSerialiseError)?;

        debug!("POST {} ({} bytes)", self.endpoint, payload.len());

        match self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_string(&payload)
        {
            Ok(response) => {
                debug!("Endpoint responded with status {}", response.status());
                Ok(())
            }
            Err(ureq::Error::Status(code, _)) => Err(UplinkError::HttpStatus(code)),
            Err(e) => Err(UplinkError::TransportError(e.to_string())),
        }
    }

    fn is_connected(&self) -> bool {
        let addrs = match (self.probe_host.as_str(), self.probe_port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(_) => return false,
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.probe_timeout).is_ok() {
                return true;
            }
        }

        false
    }
}

impl SimUplink {
    pub fn new() -> Self {
        Self {
            uploads: Vec::new(),
            fail_uploads: false,
            connected: true,
        }
    }
}

impl Uplink for SimUplink {
    fn upload(&mut self, uid: &str) -> Result<(), UplinkError> {
        self.uploads.push(uid.to_string());

        if self.fail_uploads {
            Err(UplinkError::TransportError(
                "simulated transport failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
