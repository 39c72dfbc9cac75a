use std::time::Duration;

use qrforge::config::RenderFile;
use qrforge::scheduler::RenderScheduler;
use qrforge::style::ModuleShape;
use qrforge::{ErrorCorrection, RenderConfig};

#[tokio::test(start_paused = true)]
async fn edits_within_debounce_window_collapse_into_one_render() {
    let (scheduler, mut outcomes) = RenderScheduler::spawn(Duration::from_millis(250));

    for size in [300, 320, 340, 360] {
        let config = RenderConfig {
            size,
            ..RenderConfig::with_content("debounce")
        };
        scheduler.submit(config).await.expect("scheduler running");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let outcome = outcomes.recv().await.expect("one outcome");
    assert_eq!(outcome.generation, 4);
    let image = outcome.result.expect("render ok").expect("image");
    assert_eq!(image.width(), 360);

    // A later edit after the quiet period renders again.
    tokio::time::sleep(Duration::from_secs(1)).await;
    scheduler
        .submit(RenderConfig::with_content("second"))
        .await
        .expect("scheduler running");
    let outcome = outcomes.recv().await.expect("second outcome");
    assert_eq!(outcome.generation, 5);

    scheduler.shutdown().await;
    assert!(outcomes.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_flushes_pending_config() {
    let (scheduler, mut outcomes) = RenderScheduler::spawn(Duration::from_secs(60));
    scheduler
        .submit(RenderConfig::with_content("pending"))
        .await
        .expect("scheduler running");
    scheduler.shutdown().await;

    let outcome = outcomes.recv().await.expect("flushed outcome");
    assert_eq!(outcome.generation, 1);
    assert!(outcome.result.expect("render ok").is_some());
}

#[tokio::test]
async fn render_file_feeds_the_scheduler() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("card.yaml");
    std::fs::write(
        &path,
        "module_shape: dots\nsize: 256\ntemplate:\n  kind: url\n  url: https://example.com\n",
    )
    .unwrap();

    let config = RenderFile::load(&path).unwrap().into_render_config();
    assert_eq!(config.content, "https://example.com");
    assert_eq!(config.module_shape, ModuleShape::Dots);
    assert_eq!(config.error_correction, ErrorCorrection::Medium);

    let (scheduler, mut outcomes) = RenderScheduler::spawn(Duration::from_millis(10));
    scheduler.submit(config).await.unwrap();
    let outcome = outcomes.recv().await.unwrap();
    let image = outcome.result.unwrap().unwrap();
    assert_eq!((image.width(), image.height()), (256, 256));
    scheduler.shutdown().await;
}
