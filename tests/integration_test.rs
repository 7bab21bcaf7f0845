//! End-to-end test: boots the service binary on ephemeral ports, feeds
//! telemetry lines over the TCP ingest socket, and asserts the published
//! state through the HTTP read surface.

use std::collections::HashMap;
use std::process::{Child, Command};
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

// ---

#[derive(Debug, Deserialize)]
struct Snapshot {
    rescuees: HashMap<String, Rescuee>,
    rescuers: HashMap<String, Rescuer>,
    links: HashMap<String, Vec<Link>>,
    alerts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Rescuee {
    id: String,
    bpm: Option<u32>,
    avg: Option<u32>,
    contact: String,
    emergency: bool,
}

#[derive(Debug, Deserialize)]
struct Rescuer {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    rescuer_id: String,
    rssi: Option<i32>,
}

// ---

/// A running service instance, killed on drop.
struct Service {
    child: Child,
    http: String,
    ingest: String,
}

impl Drop for Service {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> u16 {
    // ---
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .expect("local addr")
        .port()
}

/// Spawn the service on ephemeral ports and wait until /health answers.
async fn start_service(client: &Client) -> Result<Service> {
    // ---
    let ingest = format!("127.0.0.1:{}", free_port());
    let http_addr = format!("127.0.0.1:{}", free_port());

    let child = Command::new(env!("CARGO_BIN_EXE_vibrasense-rescueflow"))
        .env("INGEST_ADDR", &ingest)
        .env("HTTP_ADDR", &http_addr)
        .env("RESCUEFLOW_LOG_LEVEL", "warn")
        .spawn()?;

    let service = Service {
        child,
        http: format!("http://{http_addr}"),
        ingest,
    };

    for _ in 0..100 {
        if let Ok(resp) = client.get(format!("{}/health", service.http)).send().await {
            if resp.status().is_success() {
                return Ok(service);
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Err(anyhow!("service did not become healthy"))
}

/// Write lines to the ingest socket on one connection (so they are
/// processed in order) and close it.
async fn feed_lines(service: &Service, lines: &[&str]) -> Result<()> {
    // ---
    let mut stream = TcpStream::connect(&service.ingest).await?;
    for line in lines {
        stream.write_all(format!("{line}\n").as_bytes()).await?;
    }
    stream.shutdown().await?;
    Ok(())
}

/// Poll /snapshot until the predicate holds or a timeout elapses.
async fn await_snapshot<F>(client: &Client, service: &Service, pred: F) -> Result<Snapshot>
where
    F: Fn(&Snapshot) -> bool,
{
    // ---
    let url = format!("{}/snapshot", service.http);
    for _ in 0..100 {
        let snap: Snapshot = client.get(&url).send().await?.json().await?;
        if pred(&snap) {
            return Ok(snap);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Err(anyhow!("snapshot never satisfied predicate"))
}

// ---

#[tokio::test]
async fn ingest_to_snapshot_pipeline_works() -> Result<()> {
    // ---
    let client = Client::new();
    let service = start_service(&client).await?;

    feed_lines(
        &service,
        &[
            "TYPE=RESCUEE,ID=R1,BPM=72,AVG=70,CONTACT=OK,EMERGENCY=0",
            "TYPE=RESCUER,ID=H1,TARGET=R1,RSSI=-65",
            // Noise the engine must survive without state changes:
            "TYPE=PING,ID=X",
            "TYPE=RESCUEE,BPM=99",
            // Same (rescuer, target) pair again: link replaced, not duplicated.
            "TYPE=RESCUER,ID=H1,TARGET=R1,RSSI=-50",
        ],
    )
    .await?;

    let snap = await_snapshot(&client, &service, |s| {
        s.links
            .get("R1")
            .is_some_and(|links| links.iter().any(|l| l.rssi == Some(-50)))
    })
    .await?;

    let r1 = snap.rescuees.get("R1").ok_or_else(|| anyhow!("R1 missing"))?;
    assert_eq!(r1.id, "R1");
    assert_eq!(r1.bpm, Some(72));
    assert_eq!(r1.avg, Some(70));
    assert_eq!(r1.contact, "OK");
    assert!(!r1.emergency);
    assert_eq!(snap.rescuees.len(), 1, "malformed records must not create entries");

    let links = &snap.links["R1"];
    assert_eq!(links.len(), 1, "re-reported pair must replace, not append");
    assert_eq!(links[0].rescuer_id, "H1");
    assert_eq!(links[0].rssi, Some(-50));

    let h1 = snap.rescuers.get("H1").ok_or_else(|| anyhow!("H1 missing"))?;
    assert_eq!(h1.id, "H1");
    assert_eq!(h1.status, "ENGAGED");

    assert!(snap.alerts.is_empty(), "healthy rescuee must not alert");

    Ok(())
}

#[tokio::test]
async fn alerts_and_export_reflect_state() -> Result<()> {
    // ---
    let client = Client::new();
    let service = start_service(&client).await?;

    feed_lines(
        &service,
        &[
            "TYPE=RESCUEE,ID=R1,BPM=72,AVG=70,CONTACT=OK,EMERGENCY=0",
            "TYPE=RESCUEE,ID=R2,BPM=110,AVG=95,CONTACT=LOST,EMERGENCY=1",
            "TYPE=RESCUER,ID=H1,TARGET=R2,RSSI=-58",
        ],
    )
    .await?;

    await_snapshot(&client, &service, |s| s.alerts == vec!["R2".to_string()]).await?;

    // /alerts agrees with the snapshot.
    let alerts: serde_json::Value = client
        .get(format!("{}/alerts", service.http))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(alerts["count"], 1);
    assert_eq!(alerts["alerts"][0], "R2");

    // CSV export: header, rescuee rows first, then link rows.
    let csv = client
        .get(format!("{}/export.csv", service.http))
        .send()
        .await?
        .text()
        .await?;
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows[0], "time,type,id,info1,info2");
    assert_eq!(rows.len(), 4);
    assert!(rows[1].contains("RESCUEE,R1,72,70,OK,EMERGENCY=0"));
    assert!(rows[2].contains("RESCUEE,R2,110,95,LOST,EMERGENCY=1"));
    assert!(rows[3].contains("RESCUER,H1,TARGET=R2,-58"));

    Ok(())
}
