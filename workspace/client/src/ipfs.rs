//! IPFS content-store client (`§4.4`): `add` during publish,
//! `cat_stream` during install, and a reachability probe used by config
//! checks.
use std::io::Cursor;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;
use ipfs_api_backend_hyper::{IpfsApi, IpfsClient as RawIpfsClient, TryFromUri};
use url::Url;

use crate::error::Kind;
use crate::{Error, Result};

/// Thin wrapper around the HTTP IPFS API client, built once per command
/// from the effective network configuration.
pub struct IpfsClient {
    inner: RawIpfsClient<HttpsConnector<HttpConnector>>,
}

impl IpfsClient {
    /// Connect to the IPFS HTTP API at `url`.
    pub fn connect(url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| Error::classified(Kind::Validation, format!("invalid IPFS API URL: {url}")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::classified(Kind::Validation, format!("invalid IPFS API URL: {url}")))?;
        let scheme = match url.scheme() {
            "http" => hyper::http::uri::Scheme::HTTP,
            "https" => hyper::http::uri::Scheme::HTTPS,
            other => {
                return Err(Error::classified(
                    Kind::Validation,
                    format!("unsupported IPFS API scheme: {other}"),
                ))
            }
        };
        let inner = RawIpfsClient::<HttpsConnector<HttpConnector>>::from_host_and_port(scheme, host, port)
            .map_err(|e| Error::classified(Kind::IpfsUnreachable, format!("could not build IPFS client: {e}")))?;
        Ok(IpfsClient { inner })
    }

    /// Confirm the IPFS daemon is reachable (`version`). Called once,
    /// before any other IPFS operation, by every command that actually
    /// touches IPFS (`install`, `publish`); failure there is fatal
    /// (`§4.4`).
    pub async fn probe(&self) -> Result<String> {
        let version = self
            .inner
            .version()
            .await
            .map_err(|e| Error::classified(Kind::IpfsUnreachable, format!("IPFS daemon unreachable: {e}")))?;
        Ok(version.version)
    }

    /// Add a tarball's bytes to IPFS, returning its CID.
    pub async fn add(&self, data: Vec<u8>) -> Result<String> {
        let cursor = Cursor::new(data);
        let response = self
            .inner
            .add(cursor)
            .await
            .map_err(|e| Error::classified(Kind::IpfsUnreachable, format!("IPFS add failed: {e}")))?;
        Ok(response.hash)
    }

    /// Stream the bytes behind a CID as they arrive over HTTP, without
    /// buffering the whole object. Used by the installer (`§4.3`) so a
    /// large archive is never fully resident in memory before extraction
    /// begins. A stream error (e.g. a DAG node not found partway through)
    /// surfaces as an `io::Error` whose message still carries the
    /// underlying cause, for the caller to reclassify.
    pub fn cat_stream<'a>(&'a self, cid: &'a str) -> impl Stream<Item = std::io::Result<Bytes>> + 'a {
        self.inner
            .cat(cid)
            .map_err(move |e| std::io::Error::new(std::io::ErrorKind::Other, format!("could not fetch {cid}: {e}")))
    }
}
