// Integration tests: the client against an in-process mock udp_cfgd on loopback.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::sync::Mutex;

use udp_cfg_client::client::{DeviceClient, Endpoint};
use udp_cfg_client::error::AppError;
use udp_cfg_client::protocol::{Command, Response, StreamSettings};

/// Spawns a mock daemon that answers every datagram with `reply(request)`.
/// `None` means stay silent. Received request lines are recorded.
async fn spawn_mock_daemon<F>(reply: F) -> (SocketAddr, Arc<Mutex<Vec<String>>>)
where
    F: Fn(&str) -> Option<String> + Send + 'static,
{
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    tokio::spawn(async move {
        let mut buf = [0u8; 2048];
        loop {
            let (len, src) = match socket.recv_from(&mut buf).await {
                Ok(v) => v,
                Err(_) => break,
            };
            let request = String::from_utf8_lossy(&buf[..len]).to_string();
            seen_clone.lock().await.push(request.clone());
            if let Some(answer) = reply(&request) {
                let _ = socket.send_to(answer.as_bytes(), src).await;
            }
        }
    });

    (addr, seen)
}

/// Replies like the real daemon: stores SET values and returns them on GET.
fn stateful_daemon() -> impl Fn(&str) -> Option<String> + Send + 'static {
    let current = std::sync::Mutex::new((1280u32, 720u32, 8000u32, 120u32));
    move |request: &str| {
        let words: Vec<&str> = request.split_whitespace().collect();
        let mut current = current.lock().unwrap();
        match words.as_slice() {
            ["GET"] => Some(format!("OK {} {} {} {}\n", current.0, current.1, current.2, current.3)),
            ["SET", w, h, b, f] => {
                *current = (w.parse().ok()?, h.parse().ok()?, b.parse().ok()?, f.parse().ok()?);
                Some("OK\n".to_string())
            }
            _ => Some("ERR bad command\n".to_string()),
        }
    }
}

fn client_for(addr: SocketAddr, timeout_ms: u64) -> DeviceClient {
    let endpoint = Endpoint::new(addr.ip().to_string(), addr.port()).unwrap();
    DeviceClient::new(endpoint, Duration::from_millis(timeout_ms)).unwrap()
}

#[tokio::test]
async fn test_get_returns_current_settings() {
    let (addr, seen) = spawn_mock_daemon(|_| Some("OK 1920 1080 4000 30\n".to_string())).await;
    let client = client_for(addr, 2000);

    let response = client.send(&Command::Get).await.unwrap();
    assert_eq!(
        response,
        Response::Ok(Some(StreamSettings { width: 1920, height: 1080, bitrate: 4000, fps: 30 }))
    );
    assert_eq!(seen.lock().await.as_slice(), ["GET\n".to_string()]);
}

#[tokio::test]
async fn test_set_then_get_round_trip() {
    let (addr, seen) = spawn_mock_daemon(stateful_daemon()).await;
    let client = client_for(addr, 2000);

    let wanted = StreamSettings::new(1920, 1080, 4000, 30);
    client.set(wanted).await.unwrap();
    assert_eq!(client.get().await.unwrap(), wanted);

    let seen = seen.lock().await;
    assert_eq!(seen.as_slice(), ["SET 1920 1080 4000 30\n".to_string(), "GET\n".to_string()]);
}

#[tokio::test]
async fn test_identical_sets_get_independent_replies() {
    let (addr, seen) = spawn_mock_daemon(stateful_daemon()).await;
    let client = client_for(addr, 2000);
    let command = Command::set(StreamSettings::new(1280, 720, 8000, 60)).unwrap();

    let first = client.send(&command).await.unwrap();
    let second = client.send(&command).await.unwrap();
    assert_eq!(first, Response::Ok(None));
    assert_eq!(second, Response::Ok(None));
    assert_eq!(seen.lock().await.len(), 2);
}

#[tokio::test]
async fn test_device_err_surfaces_as_device_error() {
    let (addr, _) = spawn_mock_daemon(|_| Some("ERR busy\n".to_string())).await;
    let client = client_for(addr, 2000);

    let response = client.send(&Command::Get).await.unwrap();
    assert_eq!(response, Response::Err("busy".to_string()));

    match client.set(StreamSettings::new(640, 480, 1000, 30)).await {
        Err(AppError::DeviceError(reason)) => assert_eq!(reason, "busy"),
        other => panic!("expected DeviceError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_silent_device_times_out() {
    let (addr, seen) = spawn_mock_daemon(|_| None).await;
    let client = client_for(addr, 200);

    let started = Instant::now();
    let result = client.send(&Command::Get).await;
    let elapsed = started.elapsed();

    match result {
        Err(AppError::Timeout(after)) => assert_eq!(after, Duration::from_millis(200)),
        other => panic!("expected Timeout, got {:?}", other),
    }
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2), "timed out too late: {:?}", elapsed);
    // Exactly one datagram, no retry.
    assert_eq!(seen.lock().await.len(), 1);
}

#[tokio::test]
async fn test_malformed_replies_are_protocol_errors() {
    for answer in ["", "HELLO\n", "OK 1 2\n"] {
        let (addr, _) = spawn_mock_daemon(move |_| Some(answer.to_string())).await;
        let client = client_for(addr, 2000);
        match client.send(&Command::Get).await {
            Err(AppError::ProtocolError(_)) => {}
            other => panic!("{:?} should be a protocol error, got {:?}", answer, other),
        }
    }
}

#[tokio::test]
async fn test_get_without_values_is_protocol_error() {
    let (addr, _) = spawn_mock_daemon(|_| Some("OK\n".to_string())).await;
    let client = client_for(addr, 2000);
    assert!(matches!(client.get().await, Err(AppError::ProtocolError(_))));
}

#[tokio::test]
async fn test_invalid_settings_never_reach_the_wire() {
    let (addr, seen) = spawn_mock_daemon(stateful_daemon()).await;
    let client = client_for(addr, 200);

    let result = client.set(StreamSettings::new(0, 720, 8000, 30)).await;
    assert!(matches!(result, Err(AppError::InvalidCommand(_))));
    assert!(seen.lock().await.is_empty());
}

#[tokio::test]
async fn test_closed_port_is_not_a_protocol_error() {
    // Reserve a port then release it so nothing listens there.
    let addr = {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.local_addr().unwrap()
    };
    let client = client_for(addr, 300);

    // The socket is unconnected, so most platforms ignore the ICMP
    // port-unreachable and the call ends at the deadline.
    match client.send(&Command::Get).await {
        Err(AppError::TransportError(_)) | Err(AppError::Timeout(_)) => {}
        other => panic!("expected TransportError or Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unresolvable_host_is_transport_error() {
    let endpoint = Endpoint::new("nonexistent.invalid", 5600).unwrap();
    let client = DeviceClient::new(endpoint, Duration::from_secs(10)).unwrap();

    match client.send(&Command::Get).await {
        Err(AppError::TransportError(_)) => {}
        other => panic!("expected TransportError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reply_from_another_socket_is_accepted() {
    // The daemon receives on one socket and answers from a second one.
    let daemon = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = daemon.local_addr().unwrap();
    tokio::spawn(async move {
        let mut buf = [0u8; 2048];
        let (_, src) = daemon.recv_from(&mut buf).await.unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(b"OK 1920 1080 4000 30\n", src).await.unwrap();
    });

    let client = client_for(addr, 2000);
    let response = client.send(&Command::Get).await.unwrap();
    assert_eq!(response, Response::Ok(Some(StreamSettings::new(1920, 1080, 4000, 30))));
}

#[tokio::test]
async fn test_oversized_reply_is_protocol_error() {
    let (addr, _) = spawn_mock_daemon(|_| Some(format!("ERR {}\n", "x".repeat(3000)))).await;
    let client = client_for(addr, 2000);

    match client.send(&Command::Get).await {
        Err(AppError::ProtocolError(_)) => {}
        other => panic!("expected ProtocolError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reply_at_buffer_limit_is_accepted() {
    let reason = "x".repeat(2048 - "ERR \n".len());
    let expected = reason.clone();
    let (addr, _) = spawn_mock_daemon(move |_| Some(format!("ERR {}\n", reason))).await;
    let client = client_for(addr, 2000);

    assert_eq!(client.send(&Command::Get).await.unwrap(), Response::Err(expected));
}

#[tokio::test]
async fn test_concurrent_calls_do_not_cross_replies() {
    // Echo the request keyword back so each caller can check it got its own reply.
    let (addr, _) = spawn_mock_daemon(|request| {
        if request.starts_with("GET") {
            Some("OK 1 1 1 1\n".to_string())
        } else {
            Some("ERR set\n".to_string())
        }
    })
    .await;
    let client = client_for(addr, 2000);

    let set_command = Command::Set(StreamSettings::new(2, 2, 2, 2));
    let (get, set) = tokio::join!(client.send(&Command::Get), client.send(&set_command));
    assert_eq!(get.unwrap(), Response::Ok(Some(StreamSettings::new(1, 1, 1, 1))));
    assert_eq!(set.unwrap(), Response::Err("set".to_string()));
}

#[test]
fn test_send_blocking_against_std_socket() {
    let daemon = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    let addr = daemon.local_addr().unwrap();
    let handle = std::thread::spawn(move || {
        let mut buf = [0u8; 2048];
        let (len, src) = daemon.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"SET 1280 720 8000 120\n");
        daemon.send_to(b"OK\n", src).unwrap();
    });

    let client = client_for(addr, 2000);
    let command = Command::set(StreamSettings::new(1280, 720, 8000, 120)).unwrap();
    assert_eq!(client.send_blocking(&command).unwrap(), Response::Ok(None));
    handle.join().unwrap();
}
