//! Local responders and job builders for probe integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use healthprobe_core::*;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub fn job(check: CheckDefinition, port: u16) -> HealthCheckJob {
    HealthCheckJob {
        run_spec: RunSpecRef {
            id: "/test/app".to_string(),
            version: "2026-10-01T00:00:00Z".to_string(),
        },
        instance: Instance {
            id: "test_app.instance-1".to_string(),
            effective_ip: Some("127.0.0.1".parse().unwrap()),
            host_ports: vec![port],
        },
        check,
    }
}

pub fn http_check(protocol: Protocol, path: Option<&str>, ignore_http1xx: bool) -> CheckDefinition {
    CheckDefinition::Http(HttpCheck {
        path: path.map(str::to_string),
        protocol,
        port: PortReference::Index(0),
        timeout: Duration::from_secs(2),
        ignore_http1xx,
    })
}

pub fn tcp_check(timeout: Duration) -> CheckDefinition {
    CheckDefinition::Tcp(TcpCheck {
        port: PortReference::Index(0),
        timeout,
    })
}

/// Port nothing is listening on.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Accept one connection, answer with `status_line`, and return the
/// request head that was received.
pub async fn http_responder(status_line: &'static str) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        respond(stream, status_line).await
    });
    (addr, handle)
}

/// Like [`http_responder`] but over TLS with a self-signed certificate for
/// a name that does not match the probed address.
pub async fn https_responder(status_line: &'static str) -> (SocketAddr, JoinHandle<String>) {
    let acceptor = tokio_rustls::TlsAcceptor::from(self_signed_server_config());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let stream = acceptor.accept(stream).await.unwrap();
        respond(stream, status_line).await
    });
    (addr, handle)
}

/// Accept one connection and write a plaintext HTTP response without
/// reading anything first.
pub async fn eager_http_responder() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = stream
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
            .await;
        let _ = stream.shutdown().await;
    });
    (addr, handle)
}

/// Accept one connection and answer with `102 Processing`. Then either send
/// `final_status` or hold the socket until the client hangs up. Resolves to
/// `true` once the client has closed its side.
pub async fn interim_responder(
    final_status: Option<&'static str>,
) -> (SocketAddr, JoinHandle<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        respond_interim(stream, final_status).await
    });
    (addr, handle)
}

/// [`interim_responder`] over TLS, without a final response.
pub async fn https_interim_responder() -> (SocketAddr, JoinHandle<bool>) {
    let acceptor = tokio_rustls::TlsAcceptor::from(self_signed_server_config());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let stream = acceptor.accept(stream).await.unwrap();
        respond_interim(stream, None).await
    });
    (addr, handle)
}

/// Accept connections and never answer.
pub async fn silent_listener() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    (addr, handle)
}

async fn read_head<S: AsyncRead + Unpin>(stream: &mut S) -> Vec<u8> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    head
}

async fn respond<S>(mut stream: S, status_line: &str) -> String
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let head = read_head(&mut stream).await;

    let response =
        format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.ok();
    String::from_utf8_lossy(&head).into_owned()
}

async fn respond_interim<S>(mut stream: S, final_status: Option<&str>) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    read_head(&mut stream).await;
    stream
        .write_all(b"HTTP/1.1 102 Processing\r\n\r\n")
        .await
        .unwrap();
    stream.flush().await.unwrap();

    if let Some(status_line) = final_status {
        let response =
            format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
    }

    let mut buf = [0u8; 64];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return true,
            Ok(_) => continue,
        }
    }
}

fn self_signed_server_config() -> Arc<rustls::ServerConfig> {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["probe-target.invalid".to_string()]).unwrap();
    let cert_der: CertificateDer<'static> = cert.der().clone();
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(vec![cert_der], key_der)
    .unwrap();
    Arc::new(config)
}
