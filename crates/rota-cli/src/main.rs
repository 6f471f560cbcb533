use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

use rota_core::app::{AutoTickLoop, Runtime};
use rota_core::domain::{Actor, CompletionSpec, RotaError, Shift, SourceKey, VenueId};
use rota_core::ports::{ActivitySignals, SignalUnavailable};
use rota_sqlite::SqliteStore;

/// デモ用の活動ログ。実運用では温度ログや納品ログの既存テーブルを
/// この port の後ろに適合させる。
struct DemoTempLog {
    facts: HashSet<(VenueId, SourceKey, NaiveDate)>,
}

#[async_trait]
impl ActivitySignals for DemoTempLog {
    async fn occurred(
        &self,
        venue: &VenueId,
        key: &SourceKey,
        day: NaiveDate,
    ) -> Result<bool, SignalUnavailable> {
        Ok(self.facts.contains(&(venue.clone(), key.clone(), day)))
    }
}

#[tokio::main]
async fn main() -> Result<(), RotaError> {
    // (A) tracing を初期化（RUST_LOG で上書き可能）
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rota_core=info,rota_sqlite=info")),
        )
        .init();

    // (B) ストアを開く（ROTA_DB が無ければ in-memory）
    let store = match std::env::var("ROTA_DB") {
        Ok(path) => Arc::new(SqliteStore::open(path)?),
        Err(_) => Arc::new(SqliteStore::open_in_memory()?),
    };

    // (C) 今日の温度記録を1件持つデモ活動ログと Runtime を組み立て
    let venue = VenueId::new("cafe-001");
    let today = chrono::Utc::now().date_naive();
    let temp_log = DemoTempLog {
        facts: HashSet::from([(venue.clone(), SourceKey::new("temp_check"), today)]),
    };

    let runtime = Arc::new(
        Runtime::builder()
            .definitions(store.clone())
            .completions(store)
            .signals(Arc::new(temp_log))
            .build()
            .expect("both stores supplied"),
    );

    // (D) 既定カタログを投入（再実行時は既存カタログで続行）
    match runtime.seed_defaults(&venue).await {
        Ok(seeded) => println!("seeded {} baseline tasks for {venue}", seeded.len()),
        Err(RotaError::AlreadySeeded(_)) => println!("catalog already present for {venue}"),
        Err(err) => return Err(err),
    }

    // (E) 今日のボードをシフト別に表示
    let board = runtime.day_board(&venue, today).await?;
    println!("\n-- board for {today} ({} tasks due) --", board.len());
    for (shift, tasks) in board.iter() {
        println!("{shift}:");
        for task in tasks {
            let time = task
                .scheduled_time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            let mut tags = String::new();
            if task.requires_reading {
                tags.push_str(" [reading]");
            }
            if task.auto_tick_source.is_some() {
                tags.push_str(" [auto]");
            }
            println!("  {time}  {}{tags}", task.name);
        }
    }

    // (F) 手動完了を1件記録（数値読み取り付き）
    let sanitizer = board
        .tasks(Shift::Opening)
        .iter()
        .find(|t| t.requires_reading && t.auto_tick_source.is_none())
        .expect("baseline catalog has a manual reading task")
        .clone();
    let record = runtime
        .record_completion(&sanitizer.id, today, CompletionSpec::by("alice").with_reading(198.5))
        .await?;
    println!(
        "\nrecorded: {:?} by {} (reading {:?})",
        sanitizer.name, record.completed_by, record.reading
    );

    // (G) ポーリングループを短い間隔で回し、温度記録からの自動完了を拾う
    let poll = AutoTickLoop::spawn(runtime.clone(), vec![venue.clone()], Duration::from_millis(100));
    sleep(Duration::from_millis(300)).await;
    poll.shutdown_and_join().await;

    let auto_count = runtime
        .day_records(&venue, today)
        .await?
        .iter()
        .filter(|r| r.is_auto)
        .count();
    println!("auto-ticked {auto_count} tasks from today's temperature log");

    // (H) マネージャーが今日のレコードをまとめてサインオフ
    let ids: Vec<_> = runtime
        .day_records(&venue, today)
        .await?
        .iter()
        .map(|r| r.id)
        .collect();
    let outcome = runtime.sign_off(&ids, &Actor::new("manager-dana")).await?;
    println!(
        "sign-off: matched={} newly_signed={}",
        outcome.matched, outcome.newly_signed
    );

    // (I) 日次ステータスを確認して終了
    let status = runtime.day_status(&venue, today).await?;
    println!("day status: {}", serde_json::to_string(&status).expect("status serializes"));
    if !status.is_complete() {
        println!("({} tasks still open)", status.total - status.done);
    }

    Ok(())
}
