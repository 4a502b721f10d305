use std::io::ErrorKind;

use comms::{Msg, PairReceiver, PairSender, Records, Serialize};
use tokio::io::{self, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};

/// Connects a sender on one end of an in-memory stream to a receiver on the other.
fn pair(
    size: usize,
) -> (
    PairSender<WriteHalf<DuplexStream>>,
    PairReceiver<ReadHalf<DuplexStream>>,
) {
    let (one, two) = io::duplex(size);

    let (one_rx, one_tx) = io::split(one);
    let (_, sender) = comms::channel(one_rx, one_tx);

    let (two_rx, two_tx) = io::split(two);
    let (receiver, _) = comms::channel(two_rx, two_tx);

    (sender, receiver)
}

#[test]
fn serialize_text_message() {
    let msg = Msg::Visualize(vec![0.5, -0.25]);
    let mut buf = Vec::new();

    assert!(msg.serialize(&mut buf).is_none());
    assert_eq!(buf, b"v 0.5,-0.25");
}

#[tokio::test]
async fn send_recv() {
    let (mut tx, mut rx) = pair(128);

    let msg = Msg::Records(Records::new([vec![1., 2., 3., 4.], vec![5., 6.]]));
    tx.send(&msg).await.unwrap();

    let mut buf = Vec::new();
    let received: Msg = rx.recv_into(&mut buf).await.unwrap();

    assert_eq!(received, msg);
}

#[tokio::test]
async fn frames_keep_message_boundaries() {
    let (mut tx, mut rx) = pair(16);

    let sender = tokio::spawn(async move {
        tx.send("s").await.unwrap();
        tx.send("s 1,2;3,4").await.unwrap();
        tx.send(&Msg::Visualize(vec![9.])).await.unwrap();
    });

    let mut buf = Vec::new();
    assert_eq!(rx.recv_into::<&str>(&mut buf).await.unwrap(), "s");
    assert_eq!(rx.recv_into::<&str>(&mut buf).await.unwrap(), "s 1,2;3,4");
    assert_eq!(rx.recv_into::<&str>(&mut buf).await.unwrap(), "v 9");

    sender.await.unwrap();
}

#[tokio::test]
async fn malformed_payload_is_invalid_data() {
    let (mut tx, mut rx) = pair(64);

    tx.send("1,2,x,4;1,2").await.unwrap();

    let mut buf = Vec::new();
    let err = rx.recv_into::<Msg>(&mut buf).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[tokio::test]
async fn invalid_utf8_is_invalid_data() {
    let (mut raw, two) = io::duplex(64);
    let (two_rx, two_tx) = io::split(two);
    let (mut rx, _) = comms::channel(two_rx, two_tx);

    raw.write_all(&2u64.to_be_bytes()).await.unwrap();
    raw.write_all(&[0xff, 0xfe]).await.unwrap();

    let mut buf = Vec::new();
    let err = rx.recv_into::<&str>(&mut buf).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[tokio::test]
async fn oversized_frame_is_rejected_before_reading_it() {
    let (mut raw, two) = io::duplex(64);
    let (two_rx, two_tx) = io::split(two);
    let (mut rx, _) = comms::channel(two_rx, two_tx);

    raw.write_all(&u64::MAX.to_be_bytes()).await.unwrap();

    let mut buf = Vec::new();
    let err = rx.recv_into::<&str>(&mut buf).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert!(buf.is_empty());
}

#[tokio::test]
async fn closed_peer_is_unexpected_eof() {
    let (tx, mut rx) = pair(64);
    drop(tx);

    let mut buf = Vec::new();
    let err = rx.recv_into::<&str>(&mut buf).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}
