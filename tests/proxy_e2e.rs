//! End-to-end tests: real listener, real upstream, reqwest client.

use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use request_filter::config::{JsonRuleConfig, ListRuleConfig, ProxyConfig};
use request_filter::{HttpServer, Shutdown};

mod common;

struct Harness {
    base: String,
    shutdown: Shutdown,
    config_tx: mpsc::UnboundedSender<ProxyConfig>,
    client: reqwest::Client,
}

async fn start(config: ProxyConfig) -> Harness {
    let upstream = common::start_echo_backend().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let proxy_addr = listener.local_addr().unwrap();

    let mut config = config;
    config.listener.bind_address = proxy_addr.to_string();
    config.upstream.address = upstream.to_string();

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    Harness {
        base: format!("http://{}", proxy_addr),
        shutdown,
        config_tx,
        client,
    }
}

fn filtered_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.filter.headers.push(ListRuleConfig::new("X-Mode", "debug"));
    config.filter.query.push(ListRuleConfig::new("debug", "true"));
    config
        .filter
        .body
        .json
        .push(JsonRuleConfig::new("role", json!(["admin", "root"])));
    config
}

#[tokio::test]
async fn test_allowed_request_reaches_upstream() {
    let h = start(filtered_config()).await;
    let body = r#"{"role":"user","items":[1,2,3]}"#;

    let res = h
        .client
        .post(format!("{}/orders?page=1", h.base))
        .header("x-mode", "live")
        .body(body)
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()[common::ECHO_METHOD], "POST");
    assert_eq!(res.headers()[common::ECHO_URI], "/orders?page=1");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), body);

    h.shutdown.trigger();
}

#[tokio::test]
async fn test_rejections() {
    let h = start(filtered_config()).await;

    let res = h
        .client
        .get(format!("{}/", h.base))
        .header("X-Mode", "debug")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    let res = h
        .client
        .get(format!("{}/?debug=true", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    let res = h
        .client
        .post(format!("{}/", h.base))
        .body(r#"{"role":["root"]}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    let res = h
        .client
        .post(format!("{}/", h.base))
        .body("{oops")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    h.shutdown.trigger();
}

#[tokio::test]
async fn test_reload_replaces_rules() {
    let h = start(ProxyConfig::default()).await;
    let url = format!("{}/?debug=true", h.base);

    let res = h.client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), 200);

    h.config_tx.send(filtered_config()).unwrap();

    // the reload is applied asynchronously by the server
    let mut status = 200;
    for _ in 0..50 {
        status = h.client.get(&url).send().await.unwrap().status().as_u16();
        if status == 403 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status, 403);

    h.shutdown.trigger();
}
