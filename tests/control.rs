//! Control handle against a running orchestrator loop

use led_ticker::{DisplayOrchestrator, OrchestratorConfig};
use led_ticker_core::{ContentFeed, ProviderId, RotationPhase};
use led_ticker_render::{FontBook, MemorySink};
use led_ticker_sources::{CalendarProvider, TickerProvider};
use led_ticker_types::{
    CalendarEvent, CalendarProviderConfig, EventStart, Quote, QuoteKind, TickerProviderConfig,
};
use std::time::Duration;
use tokio::sync::watch;

fn ticker(fonts: &FontBook) -> TickerProvider {
    let feed = ContentFeed::preloaded(vec![Quote::new("BTC", QuoteKind::Crypto, Some(65000.0))]);
    TickerProvider::new(TickerProviderConfig::default(), feed, fonts)
}

fn calendar(fonts: &FontBook) -> CalendarProvider {
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    let events = ["Standup", "Review"]
        .iter()
        .map(|s| CalendarEvent {
            id: s.to_lowercase(),
            summary: s.to_string(),
            start: EventStart::AllDay(date),
        })
        .collect();
    CalendarProvider::new(CalendarProviderConfig::default(), ContentFeed::preloaded(events), fonts)
}

#[tokio::test(start_paused = true)]
async fn test_handle_mutates_running_rotation() {
    let fonts = FontBook::with_builtin();
    let sink = MemorySink::new();
    let frames = sink.handle();
    let orch = DisplayOrchestrator::new(OrchestratorConfig::default(), Box::new(sink));
    let (handle, commands) = DisplayOrchestrator::channel(8);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(orch.run(commands, shutdown_rx));

    let generated = handle
        .register_provider(None, Box::new(ticker(&fonts)), Duration::from_secs(5))
        .await
        .unwrap();
    let calendar_id = handle
        .register_provider(
            Some("calendar".into()),
            Box::new(calendar(&fonts)),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert_eq!(calendar_id, ProviderId::new("calendar"));

    tokio::time::sleep(Duration::from_secs(1)).await;
    let statuses = handle.statuses().await.unwrap();
    assert_eq!(statuses.len(), 2);
    assert!(statuses[0].selected && statuses[0].ready);
    assert_eq!(statuses[0].id, generated);
    assert_eq!(frames.last_frame().unwrap().text(), "BTC:65000.00");

    assert!(handle.force_advance(calendar_id.clone()).await.unwrap());
    let statuses = handle.statuses().await.unwrap();
    assert_eq!(statuses[1].phase, RotationPhase::Event(1));

    assert!(handle.deregister_provider(generated.clone()).await.unwrap());
    assert!(!handle.deregister_provider(generated).await.unwrap());
    tokio::time::sleep(Duration::from_secs(1)).await;
    let statuses = handle.statuses().await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].selected);
    assert_eq!(frames.last_frame().unwrap().text(), "Sat 10/17 All Day\nReview");

    handle.shutdown().await.unwrap();
    task.await.unwrap().unwrap();
    assert!(handle.statuses().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_watch_shutdown_stops_loop() {
    let orch = DisplayOrchestrator::new(OrchestratorConfig::default(), Box::new(MemorySink::new()));
    let (_handle, commands) = DisplayOrchestrator::channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(orch.run(commands, shutdown_rx));

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown_tx.send(true).unwrap();
    task.await.unwrap().unwrap();
}
