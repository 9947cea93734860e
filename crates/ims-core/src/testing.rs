//! In-memory stand-in for the inventory API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use reqwest::{Method, StatusCode};
use serde_json::{json, Map, Value};

use crate::api::{ApiError, ApiRequest, FormValue, RequestBody, Resource, Transport, TransportFuture};
use crate::notify::MEDIA_IN_USE_DETAIL;

const RESOURCES: [Resource; 4] = [
    Resource::Dealers,
    Resource::Products,
    Resource::Categories,
    Resource::Media,
];

#[derive(Default)]
struct FakeState {
    collections: HashMap<Resource, Vec<Value>>,
    log: Vec<String>,
    next_id: u64,
    latency: Duration,
    failure: Option<(StatusCode, String)>,
}

/// Serves every dashboard route from memory, logs each request as
/// `"METHOD /path"`, and can be told to fail writes.
#[derive(Clone, Default)]
pub(crate) struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Insert an item as the server would store it; returns the stored body
    pub fn seed(&self, resource: Resource, fields: Value) -> Value {
        let Value::Object(fields) = fields else {
            panic!("seed expects an object");
        };
        let mut state = self.lock();
        let item = create(&mut state, resource, fields);
        state.collections.entry(resource).or_default().push(item.clone());
        item
    }

    /// Make every non-GET request fail with `status` and `body` until `recover`
    pub fn fail_writes(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).unwrap();
        self.lock().failure = Some((status, body.to_string()));
    }

    pub fn recover(&self) {
        self.lock().failure = None;
    }

    pub fn requests(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    pub fn count(&self, request: &str) -> usize {
        self.lock().log.iter().filter(|r| r.as_str() == request).count()
    }

    pub fn writes(&self) -> usize {
        self.lock().log.iter().filter(|r| !r.starts_with("GET ")).count()
    }
}

impl Transport for FakeApi {
    fn send(&self, request: ApiRequest) -> TransportFuture {
        let latency = {
            let mut state = self.lock();
            state.log.push(format!("{} {}", request.method, request.path));
            state.latency
        };
        let api = self.clone();
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let mut state = api.lock();
            if request.method != Method::GET {
                if let Some((status, ref body)) = state.failure {
                    return Err(ApiError::from_status(status, body));
                }
            }
            handle(&mut state, &request)
        }
        .boxed()
    }
}

fn handle(state: &mut FakeState, request: &ApiRequest) -> Result<Option<Value>, ApiError> {
    let (resource, rest) = route(&request.path).ok_or_else(|| not_found("Route"))?;
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let body = body_fields(&request.body);

    match (&request.method, segments.as_slice()) {
        (&Method::GET, []) => Ok(Some(Value::Array(
            state.collections.get(&resource).cloned().unwrap_or_default(),
        ))),
        (&Method::POST, []) => {
            let item = create(state, resource, body);
            state.collections.entry(resource).or_default().push(item.clone());
            Ok(Some(item))
        }
        (&Method::GET, [key]) => find(state, resource, key).cloned().map(Some),
        (&Method::PUT, [key]) => {
            let item = find_mut(state, resource, key)?;
            let Value::Object(fields) = &mut *item else {
                return Err(not_found(resource.label()));
            };
            if body.contains_key("remove_image") {
                fields.insert("image_url".to_string(), json!(""));
            }
            for (name, value) in body {
                if name != "remove_image" {
                    fields.insert(name, value);
                }
            }
            Ok(Some(item.clone()))
        }
        (&Method::DELETE, [key]) => {
            let item = find(state, resource, key)?;
            if resource == Resource::Media && item["usage_count"].as_u64().unwrap_or(0) > 0 {
                return Err(rejected(400, MEDIA_IN_USE_DETAIL));
            }
            let id = item["id"].clone();
            if let Some(items) = state.collections.get_mut(&resource) {
                items.retain(|i| i["id"] != id);
            }
            Ok(Some(json!({"message": format!("{} deleted", resource.label())})))
        }
        (&Method::POST, [key, "stock"]) => {
            let quantity = body.get("quantity").and_then(Value::as_i64).unwrap_or(0);
            let item = find_mut(state, resource, key)?;
            item["stock"] = json!(item["stock"].as_i64().unwrap_or(0) + quantity);
            item["total_stock_received"] =
                json!(item["total_stock_received"].as_i64().unwrap_or(0) + quantity);
            Ok(Some(item.clone()))
        }
        (&Method::POST, [key, "sell"]) => {
            let quantity = body.get("quantity").and_then(Value::as_i64).unwrap_or(0);
            let item = find_mut(state, resource, key)?;
            let stock = item["stock"].as_i64().unwrap_or(0);
            if quantity > stock {
                return Err(rejected(400, "Insufficient stock"));
            }
            item["stock"] = json!(stock - quantity);
            item["total_sales"] = json!(item["total_sales"].as_i64().unwrap_or(0) + quantity);
            Ok(Some(item.clone()))
        }
        _ => Err(not_found("Route")),
    }
}

fn route(path: &str) -> Option<(Resource, &str)> {
    RESOURCES.iter().find_map(|resource| {
        let rest = path.strip_prefix(resource.collection())?;
        (rest.is_empty() || rest.starts_with('/')).then_some((*resource, rest))
    })
}

fn body_fields(body: &RequestBody) -> Map<String, Value> {
    match body {
        RequestBody::Empty => Map::new(),
        RequestBody::Json(Value::Object(map)) => map.clone(),
        RequestBody::Json(_) => Map::new(),
        RequestBody::Multipart(form) => form
            .fields()
            .iter()
            .flat_map(|field| match &field.value {
                FormValue::Text(text) => vec![(field.name.to_string(), json!(text))],
                FormValue::File(upload) => vec![
                    ("image_url".to_string(), json!(format!("https://cdn.test/{}", upload.file_name))),
                    ("file_type".to_string(), json!(upload.content_type)),
                    ("file_size".to_string(), json!(upload.bytes.len())),
                ],
            })
            .collect(),
    }
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn create(state: &mut FakeState, resource: Resource, mut fields: Map<String, Value>) -> Value {
    state.next_id += 1;
    let n = state.next_id;
    fields.insert("id".to_string(), json!(format!("id{}", n)));

    let name_field = match resource {
        Resource::Dealers => "company_name",
        Resource::Media => "filename",
        _ => "name",
    };
    let name = fields.get(name_field).and_then(Value::as_str).unwrap_or_default();
    let slug = slugify(name);
    fields.entry("slug").or_insert(json!(slug));

    let defaults = match resource {
        Resource::Dealers => json!({
            "dealer_code": format!("DLR{:03}", n),
            "dealer_status": "active",
            "images": [],
        }),
        Resource::Products => {
            let initial = fields.remove("initial_stock").unwrap_or(json!(0));
            fields.remove("stock_notes");
            json!({
                "product_code": format!("PRD{:03}", n),
                "stock": initial,
                "total_stock_received": initial,
                "total_sales": 0,
                "status": "in_stock",
            })
        }
        Resource::Categories => json!({"description": null, "status": "active"}),
        Resource::Media => json!({
            "image_url": "",
            "image_public_id": format!("media_center/{}", n),
            "usage_count": 0,
            "is_active": true,
        }),
    };
    if let Value::Object(defaults) = defaults {
        for (name, value) in defaults {
            fields.entry(name).or_insert(value);
        }
    }
    Value::Object(fields)
}

fn matches_key(resource: Resource, item: &Value, key: &str) -> bool {
    match resource {
        Resource::Media => item["id"] == key,
        _ => item["slug"] == key,
    }
}

fn find<'a>(state: &'a FakeState, resource: Resource, key: &str) -> Result<&'a Value, ApiError> {
    state
        .collections
        .get(&resource)
        .and_then(|items| items.iter().find(|i| matches_key(resource, i, key)))
        .ok_or_else(|| not_found(resource.label()))
}

fn find_mut<'a>(
    state: &'a mut FakeState,
    resource: Resource,
    key: &str,
) -> Result<&'a mut Value, ApiError> {
    state
        .collections
        .get_mut(&resource)
        .and_then(|items| items.iter_mut().find(|i| matches_key(resource, i, key)))
        .ok_or_else(|| not_found(resource.label()))
}

fn not_found(what: &str) -> ApiError {
    rejected(404, &format!("{} not found.", what))
}

fn rejected(status: u16, detail: &str) -> ApiError {
    ApiError::Rejected {
        status,
        detail: detail.to_string(),
    }
}
