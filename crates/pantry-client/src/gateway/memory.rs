//! # In-Memory Gateway
//!
//! A REST-shaped backend living in process memory.
//!
//! ## Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Path                          Treated as                               │
//! │  ───────────────────────────   ──────────────────────────────────────   │
//! │  /categories                   collection "/categories"                 │
//! │  /categories/7                 member 7 of "/categories"                │
//! │  /companies/3/stores           collection "/companies/3/stores"         │
//! │                                                                         │
//! │  GET    collection   → JSON array (unknown collections are empty)       │
//! │  POST   collection   → body + server id, appended                       │
//! │  GET    member       → record, 404 if absent                            │
//! │  PUT    member       → body fields merged into the record, 404 if absent│
//! │  DELETE member       → removed, 404 if absent                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids come from one counter shared by every collection, so they are unique
//! across the whole backend like database sequences would be.
//!
//! ## Accounts
//! `POST /auth/register` adds a user to `/users` and remembers its password.
//! `POST /auth/login` takes form fields `username` and `password` and answers
//! with an access token. `GET /users/me` returns whoever signed in last; the
//! bearer token itself is not checked.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::GatewayError;
use crate::gateway::{Encoding, Gateway, GatewayRequest, Method};

const USERS: &str = "/users";

#[derive(Debug, Clone)]
struct Account {
    email: String,
    password: String,
    user_id: i64,
}

#[derive(Debug, Default)]
struct Backend {
    collections: HashMap<String, Vec<Map<String, Value>>>,
    next_id: i64,
    accounts: Vec<Account>,
    signed_in: Option<i64>,
    fail_next: Option<GatewayError>,
    log: Vec<GatewayRequest>,
}

impl Backend {
    fn assign_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i64) -> Option<&Map<String, Value>> {
        let users = self.collections.get(USERS)?;
        position_of(users, id).map(|pos| &users[pos])
    }

    /// Stores the user record and its password. The password never lands in
    /// the record itself.
    fn register(&mut self, mut profile: Map<String, Value>) -> Result<Value, GatewayError> {
        let email = match profile.get("email").and_then(Value::as_str).map(str::trim) {
            Some(email) if !email.is_empty() => email.to_string(),
            _ => return Err(GatewayError::rejected(422, "email is required")),
        };
        let password = match profile.remove("password") {
            Some(Value::String(password)) => password,
            _ => return Err(GatewayError::rejected(422, "password is required")),
        };
        if self.accounts.iter().any(|account| account.email.eq_ignore_ascii_case(&email)) {
            return Err(GatewayError::rejected(400, "A user with this email already exists."));
        }

        let id = self.assign_id();
        profile.insert("id".to_string(), json!(id));
        profile.insert("email".to_string(), json!(email));
        profile.entry("is_active").or_insert(json!(true));
        self.collections
            .entry(USERS.to_string())
            .or_default()
            .push(profile.clone());
        self.accounts.push(Account {
            email,
            password,
            user_id: id,
        });
        Ok(Value::Object(profile))
    }

    fn login(&mut self, request: &GatewayRequest) -> Result<Value, GatewayError> {
        if request.encoding != Encoding::Form {
            return Err(GatewayError::rejected(422, "Sign-in expects form fields"));
        }
        let (username, password) = (form_field(request, "username"), form_field(request, "password"));

        let user_id = self
            .accounts
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(username) && account.password == password)
            .map(|account| account.user_id)
            .ok_or_else(|| GatewayError::rejected(401, "Incorrect email or password"))?;

        let active = self
            .user(user_id)
            .and_then(|user| user.get("is_active"))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        if !active {
            return Err(GatewayError::rejected(400, "Inactive user"));
        }

        self.signed_in = Some(user_id);
        Ok(json!({
            "access_token": format!("memory-token-{}", user_id),
            "token_type": "bearer"
        }))
    }

    fn current_user(&self) -> Result<Value, GatewayError> {
        self.signed_in
            .and_then(|id| self.user(id))
            .map(|user| Value::Object(user.clone()))
            .ok_or_else(|| GatewayError::rejected(401, "Could not validate credentials"))
    }
}

/// Sign-in of the account [`InMemoryGateway::demo`] creates.
pub const DEMO_EMAIL: &str = "owner@crumb.example";
pub const DEMO_PASSWORD: &str = "croissant";

/// In-process stand-in for the console API.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    backend: Mutex<Backend>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends records to a collection. Records without an `id` get one.
    pub fn seed(&self, path: &str, records: Vec<Value>) {
        let mut backend = self.backend();
        for record in records {
            let Value::Object(mut record) = record else {
                continue;
            };
            match record.get("id").and_then(Value::as_i64) {
                Some(id) => backend.next_id = backend.next_id.max(id),
                None => {
                    let id = backend.assign_id();
                    record.insert("id".to_string(), json!(id));
                }
            }
            backend
                .collections
                .entry(path.to_string())
                .or_default()
                .push(record);
        }
    }

    /// Adds a user who can sign in with `email` and `password`. Returns the
    /// user's id.
    pub fn add_account(&self, email: &str, password: &str, profile: Value) -> Result<i64, GatewayError> {
        let mut profile = match profile {
            Value::Object(profile) => profile,
            _ => Map::new(),
        };
        profile.insert("email".to_string(), json!(email));
        profile.insert("password".to_string(), json!(password));
        let user = self.backend().register(profile)?;
        user["id"]
            .as_i64()
            .ok_or_else(|| GatewayError::Decode("user record has no id".to_string()))
    }

    /// Makes the next request fail with `error` without touching any data.
    pub fn fail_next(&self, error: GatewayError) {
        self.backend().fail_next = Some(error);
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.backend().log.clone()
    }

    /// Current records of a collection.
    pub fn records(&self, path: &str) -> Vec<Value> {
        self.backend()
            .collections
            .get(path)
            .map(|records| records.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// A backend preloaded with a small bakery.
    pub fn demo() -> Self {
        let gateway = InMemoryGateway::new();
        gateway.seed(
            "/categories",
            vec![
                json!({ "id": 1, "name": "Bread", "description": "Daily loaves", "parentId": null, "itemCount": 3 }),
                json!({ "id": 2, "name": "Rye", "description": "Dark and light rye", "parentId": 1, "itemCount": 1 }),
                json!({ "id": 3, "name": "Pastries", "description": "", "parentId": null, "itemCount": 0 }),
                json!({ "id": 4, "name": "Croissants", "description": "Butter and almond", "parentId": 3 }),
                json!({ "id": 5, "name": "Sourdough", "description": "", "parentId": 1 }),
                json!({ "id": 6, "name": "Seasonal", "description": "Retired range", "parentId": 99 }),
            ],
        );
        gateway.seed(
            "/inventory/items",
            vec![
                item("FLR-01", "Wheat Flour", "Raw Materials", 0.8, 120.0, "kg", 40.0),
                item("FLR-02", "Rye Flour", "Raw Materials", 1.1, 18.0, "kg", 20.0),
                item("BTR-01", "Butter", "Raw Materials", 7.5, 12.0, "kg", 5.0),
                item("YST-01", "Fresh Yeast", "Raw Materials", 4.2, 2.5, "kg", 1.0),
                item("BOX-S", "Pastry Box Small", "Packaging", 0.15, 600.0, "pc", 200.0),
                item("BOX-L", "Pastry Box Large", "Packaging", 0.25, 90.0, "pc", 100.0),
                item("BAG-P", "Paper Bag", "Packaging", 0.05, 1500.0, "pc", 500.0),
                item("CRS-01", "Croissant", "Finished Goods", 1.6, 48.0, "pc", 24.0),
                item("SRD-01", "Sourdough Loaf", "Finished Goods", 5.9, 14.0, "pc", 10.0),
                item("SCR-01", "Dough Scraper", "Tools", 3.0, 6.0, "pc", 2.0),
                item("SGR-01", "Caster Sugar", "Raw Materials", 1.3, 35.0, "kg", 10.0),
                item("MLK-01", "Whole Milk", "Raw Materials", 1.0, 20.0, "l", 12.0),
            ],
        );
        gateway.seed(
            "/companies",
            vec![json!({
                "id": 100,
                "name": "Crumb & Co",
                "email": "office@crumb.example",
                "phone": "+33 4 00 00 00 00",
                "address": { "street": "12 Rue du Four", "city": "Lyon" },
                "tax_number": "FR00123456789",
                "modules": { "bakery": true, "tools": false, "academy": false }
            })],
        );
        gateway.seed(
            "/companies/100/stores",
            vec![
                json!({ "id": 101, "company_id": 100, "parent_store_id": null, "name": "Main Bakery", "code": "MAIN", "store_type": "main" }),
                json!({ "id": 102, "company_id": 100, "parent_store_id": 101, "name": "Market Stall", "code": "MKT", "store_type": "sub" }),
                json!({ "id": 103, "company_id": 100, "parent_store_id": 101, "name": "Station Kiosk", "code": "KSK", "store_type": "sub", "is_active": false }),
            ],
        );
        let owner = json!({ "first_name": "Ada", "last_name": "Baker", "role": "admin", "company_id": 100 });
        if let Err(e) = gateway.add_account(DEMO_EMAIL, DEMO_PASSWORD, owner) {
            debug!(error = %e, "Demo account not added");
        }
        gateway
    }
}

fn item(
    code: &str,
    name: &str,
    category: &str,
    unit_price: f64,
    quantity: f64,
    unit: &str,
    reorder_point: f64,
) -> Value {
    json!({
        "code": code,
        "name": name,
        "category": category,
        "unitPrice": unit_price,
        "quantity": quantity,
        "unit": unit,
        "reorderPoint": reorder_point,
        "status": "active"
    })
}

fn form_field<'a>(request: &'a GatewayRequest, name: &str) -> &'a str {
    request
        .body
        .as_ref()
        .and_then(|body| body.get(name))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Splits `/categories/7` into (`/categories`, Some(7)).
fn route(path: &str) -> (String, Option<i64>) {
    let trimmed = path.trim_end_matches('/');
    if let Some((prefix, last)) = trimmed.rsplit_once('/') {
        if let Ok(id) = last.parse::<i64>() {
            return (prefix.to_string(), Some(id));
        }
    }
    (trimmed.to_string(), None)
}

fn not_found(id: i64) -> GatewayError {
    GatewayError::rejected(404, format!("Record {} not found", id))
}

fn position_of(records: &[Map<String, Value>], id: i64) -> Option<usize> {
    records
        .iter()
        .position(|record| record.get("id").and_then(Value::as_i64) == Some(id))
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn send(&self, request: GatewayRequest) -> Result<Value, GatewayError> {
        let mut backend = self.backend();
        backend.log.push(request.clone());

        if let Some(error) = backend.fail_next.take() {
            debug!(method = %request.method, path = %request.path, "Injected failure");
            return Err(error);
        }

        match (request.method, request.path.trim_end_matches('/')) {
            (Method::Post, "/auth/login") => return backend.login(&request),
            (Method::Post, "/auth/register") => {
                return match request.body {
                    Some(Value::Object(profile)) => backend.register(profile),
                    _ => Err(GatewayError::rejected(422, "Request body must be an object")),
                };
            }
            (Method::Get, "/users/me") => return backend.current_user(),
            _ => {}
        }

        let (collection, id) = route(&request.path);
        match (request.method, id) {
            (Method::Get, None) => Ok(Value::Array(
                backend
                    .collections
                    .get(&collection)
                    .map(|records| records.iter().cloned().map(Value::Object).collect())
                    .unwrap_or_default(),
            )),
            (Method::Get, Some(id)) => {
                let records = backend.collections.get(&collection).map(Vec::as_slice).unwrap_or(&[]);
                position_of(records, id)
                    .map(|pos| Value::Object(records[pos].clone()))
                    .ok_or_else(|| not_found(id))
            }
            (Method::Post, None) => {
                let Some(Value::Object(mut record)) = request.body else {
                    return Err(GatewayError::rejected(422, "Request body must be an object"));
                };
                let id = backend.assign_id();
                record.insert("id".to_string(), json!(id));
                backend
                    .collections
                    .entry(collection)
                    .or_default()
                    .push(record.clone());
                Ok(Value::Object(record))
            }
            (Method::Put, Some(id)) => {
                let Some(Value::Object(changes)) = request.body else {
                    return Err(GatewayError::rejected(422, "Request body must be an object"));
                };
                let records = backend.collections.entry(collection).or_default();
                let pos = position_of(records, id).ok_or_else(|| not_found(id))?;
                let record = &mut records[pos];
                for (key, value) in changes {
                    if key != "id" {
                        record.insert(key, value);
                    }
                }
                Ok(Value::Object(record.clone()))
            }
            (Method::Delete, Some(id)) => {
                let records = backend.collections.entry(collection).or_default();
                let pos = position_of(records, id).ok_or_else(|| not_found(id))?;
                records.remove(pos);
                Ok(Value::Null)
            }
            (method, _) => Err(GatewayError::rejected(
                405,
                format!("{} is not allowed on {}", method, request.path),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_crud_cycle() {
        let gw = InMemoryGateway::new();

        let created = gw
            .send(GatewayRequest::post("/categories", json!({ "name": "Pastries" })))
            .await
            .unwrap();
        let id = created["id"].as_i64().unwrap();

        let updated = gw
            .send(GatewayRequest::put(
                format!("/categories/{}", id),
                json!({ "description": "Flaky" }),
            ))
            .await
            .unwrap();
        assert_eq!(updated["name"], "Pastries");
        assert_eq!(updated["description"], "Flaky");

        let list = gw.send(GatewayRequest::get("/categories")).await.unwrap();
        assert_eq!(list.as_array().map(Vec::len), Some(1));

        gw.send(GatewayRequest::delete(format!("/categories/{}", id)))
            .await
            .unwrap();
        assert!(gw.records("/categories").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_member_is_404() {
        let gw = InMemoryGateway::new();
        let err = gw
            .send(GatewayRequest::delete("/categories/42"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let gw = InMemoryGateway::new();
        gw.fail_next(GatewayError::Transport("cable unplugged".into()));

        assert!(gw.send(GatewayRequest::get("/categories")).await.is_err());
        assert!(gw.send(GatewayRequest::get("/categories")).await.is_ok());
        assert_eq!(gw.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_ids_continue_after_seeded_records() {
        let gw = InMemoryGateway::new();
        gw.seed("/categories", vec![json!({ "id": 10, "name": "Bread" })]);
        let created = gw
            .send(GatewayRequest::post("/categories", json!({ "name": "Rye" })))
            .await
            .unwrap();
        assert_eq!(created["id"], 11);
    }

    #[test]
    fn test_route() {
        assert_eq!(route("/categories"), ("/categories".to_string(), None));
        assert_eq!(route("/categories/7"), ("/categories".to_string(), Some(7)));
        assert_eq!(
            route("/companies/3/stores"),
            ("/companies/3/stores".to_string(), None)
        );
    }

    #[test]
    fn test_demo_has_every_collection() {
        let gw = InMemoryGateway::demo();
        assert_eq!(gw.records("/categories").len(), 6);
        assert_eq!(gw.records("/inventory/items").len(), 12);
        assert_eq!(gw.records("/companies").len(), 1);
        assert_eq!(gw.records("/companies/100/stores").len(), 3);
        assert_eq!(gw.records("/users").len(), 1);
    }

    #[tokio::test]
    async fn test_register_then_sign_in() {
        let gw = InMemoryGateway::new();
        let user = gw
            .send(GatewayRequest::post(
                "/auth/register",
                json!({ "email": "baker@crumb.example", "password": "longenough", "first_name": "Ada" }),
            ))
            .await
            .unwrap();
        assert_eq!(user["first_name"], "Ada");
        assert_eq!(user["is_active"], true);
        assert!(user.get("password").is_none());

        let err = gw.send(GatewayRequest::get("/users/me")).await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        let token = gw
            .send(GatewayRequest::post_form(
                "/auth/login",
                json!({ "username": "baker@crumb.example", "password": "longenough" }),
            ))
            .await
            .unwrap();
        assert_eq!(token["token_type"], "bearer");
        assert!(token["access_token"].is_string());

        let me = gw.send(GatewayRequest::get("/users/me")).await.unwrap();
        assert_eq!(me["id"], user["id"]);
    }

    #[tokio::test]
    async fn test_sign_in_rejections() {
        let gw = InMemoryGateway::demo();
        let form = json!({ "username": DEMO_EMAIL, "password": "wrong" });
        let err = gw
            .send(GatewayRequest::post_form("/auth/login", form))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));

        // Same fields as JSON are not what the endpoint reads
        let json_body = json!({ "username": DEMO_EMAIL, "password": DEMO_PASSWORD });
        let err = gw
            .send(GatewayRequest::post("/auth/login", json_body))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));

        let err = gw
            .send(GatewayRequest::post(
                "/auth/register",
                json!({ "email": DEMO_EMAIL, "password": "whatever1" }),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }
}
