//! TCP batch forwarder.
//!
//! Each call opens a fresh connection, writes one JSON array terminated by a
//! newline and closes the write half. Nothing is read back.

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::collector::{CollectorError, Delivery, Forwarder};
use crate::exposition::MetricRecord;

/// Ships record batches as newline-terminated JSON over TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpForwarder;

impl TcpForwarder {
    pub fn new() -> Self {
        Self
    }
}

/// Serialize a batch the way it goes on the wire, without the newline.
pub fn encode(records: &[MetricRecord]) -> Result<String, CollectorError> {
    Ok(serde_json::to_string(records)?)
}

#[async_trait::async_trait]
impl Forwarder for TcpForwarder {
    async fn forward(
        &self,
        address: &str,
        records: &[MetricRecord],
    ) -> Result<Delivery, CollectorError> {
        let payload = encode(records)?;

        let mut stream = TcpStream::connect(address).await?;
        stream.write_all(payload.as_bytes()).await?;
        stream.write_all(b"\n").await?;
        stream.flush().await?;
        stream.shutdown().await?;

        tracing::debug!(
            target_addr = %address,
            records = records.len(),
            bytes = payload.len() + 1,
            "Batch forwarded"
        );
        Ok(Delivery { payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::Label;
    use std::io::ErrorKind;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn record(metric: &str, value: &str) -> MetricRecord {
        MetricRecord {
            job_type: "prometheus".to_string(),
            job_name: "node".to_string(),
            time: "09:05:02".to_string(),
            date: "03-07-2024".to_string(),
            metric: metric.to_string(),
            labels: vec![Label::new("instance", "a")],
            value: value.to_string(),
            help: String::new(),
            kind: String::new(),
        }
    }

    async fn bind() -> Option<TcpListener> {
        match TcpListener::bind("127.0.0.1:0").await {
            Ok(l) => Some(l),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => None,
            Err(e) => panic!("Failed to bind test listener: {e}"),
        }
    }

    #[test]
    fn test_encode_empty_batch() {
        assert_eq!(encode(&[]).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_forward_empty_batch_writes_array_and_newline() {
        let Some(listener) = bind().await else {
            return;
        };
        let addr = listener.local_addr().unwrap();

        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let delivery = TcpForwarder::new()
            .forward(&addr.to_string(), &[])
            .await
            .unwrap();

        assert_eq!(delivery.payload, "[]");
        assert_eq!(reader.await.unwrap(), b"[]\n");
    }

    #[tokio::test]
    async fn test_forward_batch_round_trips_as_json() {
        let Some(listener) = bind().await else {
            return;
        };
        let addr = listener.local_addr().unwrap();

        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = String::new();
            socket.read_to_string(&mut buf).await.unwrap();
            buf
        });

        let records = vec![record("up", "1"), record("down", "0")];
        let delivery = TcpForwarder::new()
            .forward(&addr.to_string(), &records)
            .await
            .unwrap();

        let received = reader.await.unwrap();
        assert!(received.ends_with('\n'));
        assert_eq!(received.matches('\n').count(), 1);
        assert_eq!(received.trim_end(), delivery.payload);

        let decoded: Vec<MetricRecord> = serde_json::from_str(&received).unwrap();
        assert_eq!(decoded, records);
    }

    #[tokio::test]
    async fn test_forward_opens_connection_per_call() {
        let Some(listener) = bind().await else {
            return;
        };
        let addr = listener.local_addr().unwrap();

        let reader = tokio::spawn(async move {
            let mut payloads = Vec::new();
            for _ in 0..2 {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = String::new();
                socket.read_to_string(&mut buf).await.unwrap();
                payloads.push(buf);
            }
            payloads
        });

        let forwarder = TcpForwarder::new();
        forwarder.forward(&addr.to_string(), &[]).await.unwrap();
        forwarder
            .forward(&addr.to_string(), &[record("up", "1")])
            .await
            .unwrap();

        let payloads = reader.await.unwrap();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0], "[]\n");
        assert!(payloads[1].contains("\"metric\":\"up\""));
    }

    #[tokio::test]
    async fn test_forward_connection_refused() {
        let Some(listener) = bind().await else {
            return;
        };
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = TcpForwarder::new().forward(&addr.to_string(), &[]).await;
        assert!(matches!(result, Err(CollectorError::Network(_))));
    }
}
