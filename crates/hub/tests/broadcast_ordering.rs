use articlecrawler_core::types::Article;
use articlecrawler_hub::Hub;
use chrono::Utc;

fn article(url: &str) -> Article {
    Article {
        id: 1,
        url: url.to_string(),
        title: "T".to_string(),
        body: "B".to_string(),
        summary: "B".to_string(),
        content_hash: "hash".to_string(),
        language: "eng".to_string(),
        read_time_minutes: 1,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// For any subscriber, the subsequence of articles it actually receives is a
/// prefix-preserving subsequence of the publish sequence: it may skip entries
/// (dropped when its own buffer is full) but never sees them out of order.
#[tokio::test]
async fn subscriber_sees_a_order_preserving_subsequence() {
    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
    let (hub, _join) = Hub::spawn(shutdown_tx);
    let rx = hub.subscribe("observer");

    let published: Vec<String> = (0..20).map(|i| format!("https://example.com/{i}")).collect();
    for url in &published {
        hub.publish(article(url));
    }
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let mut received = Vec::new();
    while let Ok(article) = rx.try_recv() {
        received.push(article.url);
    }

    let mut cursor = 0;
    for url in &received {
        let found = published[cursor..]
            .iter()
            .position(|p| p == url)
            .expect("received article not found in remaining publish order");
        cursor += found + 1;
    }
}
