//! Integration tests for the wishlist backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::api::RECONCILE_MESSAGE;
use crate::config::{Config, DEFAULT_LOOKUP_ENDPOINT};
use crate::db::{init_database, Repository};
use crate::lookup::{LookupError, PriceLookup};
use crate::{create_router, AppState};

const TEST_PIN: &str = "2468";

/// Lookup that answers every image with the same canned payload, or a rate limit.
struct CannedLookup {
    payload: Option<Value>,
}

#[async_trait]
impl PriceLookup for CannedLookup {
    async fn search_by_image(&self, _image_url: &str) -> Result<Value, LookupError> {
        match &self.payload {
            Some(payload) => Ok(payload.clone()),
            None => Err(LookupError::Upstream {
                status: 429,
                message: "rate limited".to_string(),
            }),
        }
    }
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_lookup(Some(json!({ "visual_matches": [] }))).await
    }

    async fn with_lookup(payload: Option<Value>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool.clone()));

        let config = Config {
            parent_pin: Some(TEST_PIN.to_string()),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            serpapi_key: None,
            lookup_endpoint: DEFAULT_LOOKUP_ENDPOINT.to_string(),
            lookup_timeout: Duration::from_secs(5),
        };

        let state = AppState {
            repo,
            lookup: Arc::new(CannedLookup { payload }),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-parent-pin", TEST_PIN.parse().unwrap());

        TestFixture {
            client: Client::builder().default_headers(headers).build().unwrap(),
            base_url,
            pool,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_child(&self, name: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/parents/children"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_gift(&self, child_id: &str, image_url: &str) -> Value {
        let resp = self
            .client
            .post(self.url(&format!("/api/children/{}/gifts", child_id)))
            .json(&json!({ "imageUrl": image_url }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    async fn list_gifts(&self, child_id: &str) -> Vec<Value> {
        let resp = self
            .client
            .get(self.url(&format!("/api/children/{}/gifts", child_id)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].as_array().unwrap().clone()
    }

    async fn reorder(&self, child_id: &str, from: usize, to: usize) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/children/{}/gifts/reorder", child_id)))
            .json(&json!({ "fromIndex": from, "toIndex": to }))
            .send()
            .await
            .unwrap()
    }

    async fn revision(&self) -> i64 {
        let resp = self
            .client
            .get(self.url("/api/revision"))
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        body["data"]["revisionId"].as_i64().unwrap()
    }
}

fn image_urls(gifts: &[Value]) -> Vec<&str> {
    gifts
        .iter()
        .map(|g| g["imageUrl"].as_str().unwrap())
        .collect()
}

fn priorities(gifts: &[Value]) -> Vec<i64> {
    gifts.iter().map(|g| g["priority"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_parents_area_requires_pin() {
    let fixture = TestFixture::new().await;
    let anonymous = Client::new();

    let resp = anonymous
        .get(fixture.url("/api/parents/gifts"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = anonymous
        .get(fixture.url("/api/parents/session"))
        .header("x-parent-pin", "0000")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = anonymous
        .get(fixture.url("/api/parents/session"))
        .bearer_auth(TEST_PIN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["authenticated"], true);
    assert_eq!(body["data"]["pinRequired"], true);

    // Children's pages stay open
    let resp = anonymous
        .get(fixture.url("/api/children"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_child_crud() {
    let fixture = TestFixture::new().await;

    let bruno = fixture.create_child("Bruno").await;
    fixture.create_child("Alma").await;

    let resp = fixture
        .client
        .get(fixture.url("/api/children"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alma", "Bruno"]);

    fixture.create_gift(&bruno, "https://img.test/kite.jpg").await;

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/parents/children/{}", bruno)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/children/{}/gifts", bruno)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .post(fixture.url("/api/parents/children"))
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_new_gifts_start_at_default_priority_and_list_newest_first() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;

    let first = fixture.create_gift(&child, "https://img.test/a.jpg").await;
    assert_eq!(first["priority"], 1);
    assert_eq!(first["isBought"], false);
    assert!(first.get("price").is_none());

    fixture.create_gift(&child, "https://img.test/b.jpg").await;
    fixture.create_gift(&child, "https://img.test/c.jpg").await;

    let gifts = fixture.list_gifts(&child).await;
    assert_eq!(
        image_urls(&gifts),
        vec![
            "https://img.test/c.jpg",
            "https://img.test/b.jpg",
            "https://img.test/a.jpg"
        ]
    );
}

#[tokio::test]
async fn test_create_gift_validation() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/children/nobody/gifts"))
        .json(&json!({ "imageUrl": "https://img.test/a.jpg" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let child = fixture.create_child("Alma").await;
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/children/{}/gifts", child)))
        .json(&json!({ "imageUrl": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_reorder_commits_descending_priorities() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    for name in ["a", "b", "c"] {
        fixture
            .create_gift(&child, &format!("https://img.test/{}.jpg", name))
            .await;
    }

    // Shown as [c, b, a]; drag a to the top
    let resp = fixture.reorder(&child, 2, 0).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["outcome"], "committed");
    // b already sits at priority 1
    assert_eq!(body["data"]["appliedUpdates"], 2);
    assert!(body["data"].get("message").is_none());

    let shown = body["data"]["gifts"].as_array().unwrap().clone();
    assert_eq!(
        image_urls(&shown),
        vec![
            "https://img.test/a.jpg",
            "https://img.test/c.jpg",
            "https://img.test/b.jpg"
        ]
    );
    assert_eq!(priorities(&shown), vec![3, 2, 1]);

    let stored = fixture.list_gifts(&child).await;
    assert_eq!(image_urls(&stored), image_urls(&shown));
    assert_eq!(priorities(&stored), vec![3, 2, 1]);

    // Swapping the bottom two only touches those two
    let resp = fixture.reorder(&child, 1, 2).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["outcome"], "committed");
    assert_eq!(body["data"]["appliedUpdates"], 2);
}

#[tokio::test]
async fn test_reorder_failed_write_returns_reconciled_list() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    let a = fixture.create_gift(&child, "https://img.test/a.jpg").await;
    fixture.create_gift(&child, "https://img.test/b.jpg").await;
    let c = fixture.create_gift(&child, "https://img.test/c.jpg").await;

    sqlx::query(&format!(
        "CREATE TRIGGER reject_priority BEFORE UPDATE OF priority ON gifts \
         WHEN NEW.id = '{}' BEGIN SELECT RAISE(ABORT, 'priority locked'); END",
        c["id"].as_str().unwrap()
    ))
    .execute(&fixture.pool)
    .await
    .unwrap();

    // Shown as [c, b, a]; a to the top writes a=3 then fails on c=2
    let resp = fixture.reorder(&child, 2, 0).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["outcome"], "reconciled");
    assert_eq!(body["data"]["appliedUpdates"], 1);
    assert_eq!(body["data"]["message"], RECONCILE_MESSAGE);

    let shown = body["data"]["gifts"].as_array().unwrap().clone();
    assert_eq!(
        image_urls(&shown),
        vec![
            "https://img.test/a.jpg",
            "https://img.test/c.jpg",
            "https://img.test/b.jpg"
        ]
    );
    assert_eq!(priorities(&shown), vec![3, 1, 1]);
    assert_eq!(shown[0]["id"], a["id"]);

    let stored = fixture.list_gifts(&child).await;
    assert_eq!(image_urls(&stored), image_urls(&shown));
}

#[tokio::test]
async fn test_reorder_same_index_is_unchanged() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    fixture.create_gift(&child, "https://img.test/a.jpg").await;
    fixture.create_gift(&child, "https://img.test/b.jpg").await;

    let before = fixture.revision().await;

    let resp = fixture.reorder(&child, 1, 1).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["outcome"], "unchanged");
    assert_eq!(body["data"]["appliedUpdates"], 0);

    assert_eq!(fixture.revision().await, before);
    assert_eq!(priorities(&fixture.list_gifts(&child).await), vec![1, 1]);
}

#[tokio::test]
async fn test_reorder_out_of_range_is_rejected() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    fixture.create_gift(&child, "https://img.test/a.jpg").await;

    let resp = fixture.reorder(&child, 0, 5).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = fixture.reorder("nobody", 0, 0).await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_delete_gift_keeps_remaining_priorities() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    for name in ["a", "b", "c"] {
        fixture
            .create_gift(&child, &format!("https://img.test/{}.jpg", name))
            .await;
    }
    fixture.reorder(&child, 2, 0).await;

    let middle = fixture.list_gifts(&child).await[1]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/parents/gifts/{}", middle)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let remaining = body["data"].as_array().unwrap().clone();
    assert_eq!(priorities(&remaining), vec![3, 1]);

    let stored = fixture.list_gifts(&child).await;
    assert_eq!(priorities(&stored), vec![3, 1]);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/parents/gifts/{}", middle)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_update_gift_annotations() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    let gift = fixture.create_gift(&child, "https://img.test/a.jpg").await;
    let gift_id = gift["id"].as_str().unwrap();

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/parents/gifts/{}", gift_id)))
        .json(&json!({
            "price": 24.5,
            "assignedTo": "Grandma",
            "isBought": true,
            "expectedVersion": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["price"], 24.5);
    assert_eq!(body["data"]["assignedTo"], "Grandma");
    assert_eq!(body["data"]["isBought"], true);
    assert_eq!(body["data"]["version"], 2);
    assert_eq!(body["data"]["priority"], 1);

    let resp = fixture
        .client
        .get(fixture.url("/api/parents/gifts"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"][0]["childName"], "Alma");
    assert_eq!(body["data"][0]["assignedTo"], "Grandma");

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/parents/gifts/{}", gift_id)))
        .json(&json!({ "price": -3.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/parents/gifts/{}", gift_id)))
        .json(&json!({ "price": null, "assignedTo": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].get("price").is_none());
    assert!(body["data"].get("assignedTo").is_none());
    assert_eq!(body["data"]["isBought"], true);
}

#[tokio::test]
async fn test_reorder_does_not_invalidate_annotation_version() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    let gift = fixture.create_gift(&child, "https://img.test/a.jpg").await;
    fixture.create_gift(&child, "https://img.test/b.jpg").await;
    let gift_id = gift["id"].as_str().unwrap();

    // a is shown last; move it to the top
    let resp = fixture.reorder(&child, 1, 0).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["outcome"], "committed");

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/parents/gifts/{}", gift_id)))
        .json(&json!({ "price": 15.0, "expectedVersion": gift["version"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["priority"], 2);
}

#[tokio::test]
async fn test_update_gift_version_conflict() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    let gift = fixture.create_gift(&child, "https://img.test/a.jpg").await;
    let gift_id = gift["id"].as_str().unwrap();

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/parents/gifts/{}", gift_id)))
        .json(&json!({ "price": 10.0, "expectedVersion": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/parents/gifts/{}", gift_id)))
        .json(&json!({ "price": 12.0, "expectedVersion": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VERSION_MISMATCH");
    assert_eq!(body["error"]["details"]["currentVersion"], 2);
}

#[tokio::test]
async fn test_apply_offer() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    let gift = fixture.create_gift(&child, "https://img.test/a.jpg").await;
    let gift_id = gift["id"].as_str().unwrap();

    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/parents/gifts/{}/apply-offer", gift_id)))
        .json(&json!({ "price": 19.99, "store": "Toy Barn" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["price"], 19.99);
    assert_eq!(body["data"]["assignedTo"], "Toy Barn");
    assert_eq!(body["data"]["isBought"], false);

    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/parents/gifts/{}/apply-offer", gift_id)))
        .json(&json!({ "price": 0.0, "store": "Toy Barn" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_price_lookup_normalizes_offers() {
    let fixture = TestFixture::with_lookup(Some(json!({
        "visual_matches": [{ "title": "Wooden train set" }],
        "shopping_results": [
            { "source": "Amazon", "price": "$34.99", "link": "https://shop.test/1" },
            { "source": "Toy Barn", "extracted_price": 29.5 },
            { "source": "Broken", "price": "call us" }
        ]
    })))
    .await;
    let child = fixture.create_child("Alma").await;
    let gift = fixture.create_gift(&child, "https://img.test/train.jpg").await;
    let gift_id = gift["id"].as_str().unwrap();

    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/parents/gifts/{}/price-lookup", gift_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["productName"], "Wooden train set");
    assert_eq!(data["source"], "shopping");
    assert_eq!(data["prices"].as_array().unwrap().len(), 2);
    assert_eq!(data["bestPrice"]["store"], "Toy Barn");
    assert_eq!(data["bestPrice"]["price"], 29.5);
    assert_eq!(data["prices"][1]["url"], "https://shop.test/1");
}

#[tokio::test]
async fn test_price_lookup_without_prices_has_message() {
    let fixture = TestFixture::new().await;
    let child = fixture.create_child("Alma").await;
    let gift = fixture.create_gift(&child, "https://img.test/blur.jpg").await;
    let gift_id = gift["id"].as_str().unwrap();

    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/parents/gifts/{}/price-lookup", gift_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["prices"], json!([]));
    assert!(body["data"]["bestPrice"].is_null());
    assert!(body["data"]["message"].as_str().unwrap().contains("No prices"));
}

#[tokio::test]
async fn test_price_lookup_failure_is_bad_gateway() {
    let fixture = TestFixture::with_lookup(None).await;
    let child = fixture.create_child("Alma").await;
    let gift = fixture.create_gift(&child, "https://img.test/a.jpg").await;
    let gift_id = gift["id"].as_str().unwrap();

    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/parents/gifts/{}/price-lookup", gift_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "LOOKUP_ERROR");

    let resp = fixture
        .client
        .post(fixture.url("/api/parents/gifts/missing/price-lookup"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_search_product_proxy() {
    let payload = json!({ "visual_matches": [{ "title": "Kite", "price": { "value": "$9" } }] });
    let fixture = TestFixture::with_lookup(Some(payload.clone())).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/parents/search-product"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "imageUrl is required");

    let resp = fixture
        .client
        .post(fixture.url("/api/parents/search-product"))
        .json(&json!({ "imageUrl": "https://img.test/kite.jpg" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, payload);
}

#[tokio::test]
async fn test_search_product_relays_upstream_status() {
    let fixture = TestFixture::with_lookup(None).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/parents/search-product"))
        .json(&json!({ "imageUrl": "https://img.test/kite.jpg" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 429);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "rate limited");
}

#[tokio::test]
async fn test_revision_increments_on_writes() {
    let fixture = TestFixture::new().await;

    let initial = fixture.revision().await;

    let child = fixture.create_child("Alma").await;
    let after_child = fixture.revision().await;
    assert!(after_child > initial);

    fixture.create_gift(&child, "https://img.test/a.jpg").await;
    let after_gift = fixture.revision().await;
    assert!(after_gift > after_child);

    fixture.create_gift(&child, "https://img.test/b.jpg").await;
    let before_reorder = fixture.revision().await;
    fixture.reorder(&child, 1, 0).await;
    assert!(fixture.revision().await > before_reorder);
}
