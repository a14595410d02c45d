// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dpm_core::FaultAttribution;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};

async fn connect_and_hello(socket: &std::path::Path, name: &str) -> UnixStream {
    let mut stream = UnixStream::connect(socket).await.unwrap();
    let hello = serde_json::to_vec(&serde_json::json!({"type": "hello", "slave": name})).unwrap();
    stream.write_all(&(hello.len() as u32).to_be_bytes()).await.unwrap();
    stream.write_all(&hello).await.unwrap();
    stream
}

async fn read_one_message(stream: &mut UnixStream) -> serde_json::Value {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await.unwrap();
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await.unwrap();
    serde_json::from_slice(&buf).unwrap()
}

#[tokio::test]
async fn hello_registers_the_connection_and_forwards_an_event() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("dpm.sock");
    let listener = UnixListener::bind(&socket_path).unwrap();
    let channel = Arc::new(UnixRpcChannel::new());
    let (tx, mut rx) = mpsc::channel(8);

    tokio::spawn(run_accept_loop(listener, Arc::clone(&channel), tx));

    let _stream = connect_and_hello(&socket_path, "s1").await;

    match rx.recv().await.unwrap() {
        SlaveEvent::Hello(id) => assert_eq!(id.as_str(), "s1"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn send_pause_reaches_the_registered_slave() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("dpm.sock");
    let listener = UnixListener::bind(&socket_path).unwrap();
    let channel = Arc::new(UnixRpcChannel::new());
    let (tx, mut rx) = mpsc::channel(8);

    tokio::spawn(run_accept_loop(listener, Arc::clone(&channel), tx));

    let mut stream = connect_and_hello(&socket_path, "s1").await;
    assert!(matches!(rx.recv().await.unwrap(), SlaveEvent::Hello(_)));

    let id = SlaveId::new("s1");
    channel.send_pause(&id, 42.0).await.unwrap();

    let received = read_one_message(&mut stream).await;
    assert_eq!(received["type"], "pause");
    assert_eq!(received["timestamp"], 42.0);
}

#[tokio::test]
async fn send_pause_to_unknown_slave_fails() {
    let channel = UnixRpcChannel::new();
    let id = SlaveId::new("ghost");
    let err = channel.send_pause(&id, 0.0).await.unwrap_err();
    assert!(matches!(err, RpcError::ChannelClosed(_)));
}

#[tokio::test]
async fn broadcast_fault_reaches_every_registered_slave() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("dpm.sock");
    let listener = UnixListener::bind(&socket_path).unwrap();
    let channel = Arc::new(UnixRpcChannel::new());
    let (tx, mut rx) = mpsc::channel(8);

    tokio::spawn(run_accept_loop(listener, Arc::clone(&channel), tx));

    let mut a = connect_and_hello(&socket_path, "a").await;
    assert!(matches!(rx.recv().await.unwrap(), SlaveEvent::Hello(_)));
    let mut b = connect_and_hello(&socket_path, "b").await;
    assert!(matches!(rx.recv().await.unwrap(), SlaveEvent::Hello(_)));

    let attribution = FaultAttribution { package: "pkg".into(), file: "f.rs".into(), function: "run".into() };
    channel.broadcast_fault(&attribution).await.unwrap();

    let a_msg = read_one_message(&mut a).await;
    let b_msg = read_one_message(&mut b).await;
    assert_eq!(a_msg["package"], "pkg");
    assert_eq!(b_msg["package"], "pkg");
}

#[tokio::test]
async fn exit_notice_from_slave_is_forwarded_as_an_event() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("dpm.sock");
    let listener = UnixListener::bind(&socket_path).unwrap();
    let channel = Arc::new(UnixRpcChannel::new());
    let (tx, mut rx) = mpsc::channel(8);

    tokio::spawn(run_accept_loop(listener, channel, tx));

    let mut stream = connect_and_hello(&socket_path, "s1").await;
    assert!(matches!(rx.recv().await.unwrap(), SlaveEvent::Hello(_)));

    let exit_notice = serde_json::to_vec(&serde_json::json!({"type": "exit_notice", "slave": "s1"})).unwrap();
    stream.write_all(&(exit_notice.len() as u32).to_be_bytes()).await.unwrap();
    stream.write_all(&exit_notice).await.unwrap();

    match rx.recv().await.unwrap() {
        SlaveEvent::ExitNotice(id) => assert_eq!(id.as_str(), "s1"),
        other => panic!("unexpected event: {other:?}"),
    }
}
