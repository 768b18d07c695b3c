//! 통합 테스트 -- UDP 수신부터 SQLite 파티션 커밋까지 전체 흐름 검증

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use sylogd_ingest::config::{DropPolicy, IngestRuntimeConfig};
use sylogd_ingest::{BatchWriter, DatagramBuffer, RawDatagram, UdpReceiver};

fn template(dir: &tempfile::TempDir) -> String {
    dir.path()
        .join("syslog.sqlite3")
        .to_string_lossy()
        .into_owned()
}

/// UDP로 보낸 RFC5424 데이터그램이 실제 파티션 파일에 커밋되는지 확인한다.
#[tokio::test]
async fn datagram_flows_from_udp_to_partition_file() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Arc::new(Mutex::new(DatagramBuffer::new(100, DropPolicy::Oldest)));
    let notify = Arc::new(Notify::new());

    let receiver = UdpReceiver::bind("127.0.0.1:0", Arc::clone(&queue), Arc::clone(&notify))
        .await
        .unwrap();
    let bind_addr = receiver.local_addr().unwrap();

    let mut config = IngestRuntimeConfig::default();
    config.batch_size = 1;
    config.batch_timeout_secs = 3600;
    config.database_template = template(&dir);
    let writer = BatchWriter::new(config);

    let cancel = CancellationToken::new();
    let receiver_handle = tokio::spawn(receiver.run(cancel.clone()));
    let writer_handle =
        tokio::spawn(writer.run(Arc::clone(&queue), Arc::clone(&notify), cancel.clone()));

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender
        .send_to(
            b"<34>1 2026-06-15T08:00:00.000Z myhost sshd 1234 - - login failure",
            bind_addr,
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(2), receiver_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(2), writer_handle).await;

    let conn = rusqlite::Connection::open(dir.path().join("syslog_202606.sqlite3")).unwrap();
    let count: i64 = conn
        .query_row("SELECT count(*) FROM SystemEvents202606", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(count, 1);

    let tag: String = conn
        .query_row("SELECT SysLogTag FROM SystemEvents202606", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(tag, "sshd");
}

/// 여러 연월에 걸친 데이터그램이 각각의 파티션 파일로 분리되는지 확인한다.
#[tokio::test]
async fn records_spanning_months_land_in_separate_partition_files() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Arc::new(Mutex::new(DatagramBuffer::new(100, DropPolicy::Oldest)));
    let notify = Arc::new(Notify::new());
    {
        let mut q = queue.lock().unwrap();
        q.push(RawDatagram::new(
            bytes::Bytes::from_static(b"<34>1 2026-05-01T00:00:00.000Z h a 1 - - may"),
            "127.0.0.1:1".parse().unwrap(),
            chrono::Utc::now(),
        ));
        q.push(RawDatagram::new(
            bytes::Bytes::from_static(b"<34>1 2026-06-01T00:00:00.000Z h a 1 - - june"),
            "127.0.0.1:1".parse().unwrap(),
            chrono::Utc::now(),
        ));
    }
    notify.notify_one();

    let mut config = IngestRuntimeConfig::default();
    config.batch_size = 10;
    config.batch_timeout_secs = 3600;
    config.database_template = template(&dir);
    let writer = BatchWriter::new(config);

    let cancel = CancellationToken::new();
    cancel.cancel();
    writer.run(queue, notify, cancel).await;

    assert!(dir.path().join("syslog_202605.sqlite3").exists());
    assert!(dir.path().join("syslog_202606.sqlite3").exists());
}
