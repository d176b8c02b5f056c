//! A small users service with contract-validated routes.
//!
//! ```text
//! cargo run -p accord --example users_api
//! curl -s localhost:8080/users?limit=5
//! curl -s -XPOST localhost:8080/users -H 'content-type: application/json' \
//!      -d '{"name":"Ada","email":"ada@example.com"}'
//! open http://localhost:8080/docs
//! ```
//!
//! Settings come from `accord.toml` when present and `ACCORD__*`
//! environment variables, e.g. `ACCORD__SERVER__HTTP_ADDR=127.0.0.1:3000`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use accord::prelude::*;
use anyhow::Context;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct UserPatch {
    name: Option<String>,
    email: Option<String>,
}

#[derive(Default)]
struct Store {
    next_id: AtomicU64,
    users: RwLock<Vec<User>>,
}

impl Store {
    fn insert(&self, new: NewUser) -> User {
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: new.name,
            email: new.email,
        };
        self.users.write().push(user.clone());
        user
    }
}

fn user_schema() -> Schema {
    Schema::object([
        ("id", Schema::integer()),
        ("name", Schema::string()),
        ("email", Schema::string().email()),
    ])
}

fn id_param() -> Schema {
    Schema::object([("id", Schema::integer().coerce().minimum(1.0))])
}

fn not_found(id: u64) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::NOT_FOUND,
        json!({"error": "User not found", "id": id}),
    )
}

fn routes(store: &Arc<Store>, config: &AccordConfig) -> TypedRouter {
    let mut router = TypedRouter::new();
    if let Some(mount) = config.docs.to_mount() {
        router = router.docs(mount);
    }

    let list = {
        let store = Arc::clone(store);
        move |request: ApiRequest| {
            let store = Arc::clone(&store);
            async move {
                let limit = request.query()["limit"].as_u64().unwrap_or(20);
                let users: Vec<User> = store
                    .users
                    .read()
                    .iter()
                    .take(usize::try_from(limit).unwrap_or(usize::MAX))
                    .cloned()
                    .collect();
                Json(users)
            }
        }
    };

    let fetch = {
        let store = Arc::clone(store);
        move |request: ApiRequest| {
            let store = Arc::clone(&store);
            async move {
                let id = request.params()["id"].as_u64().unwrap_or_default();
                let found = store.users.read().iter().find(|u| u.id == id).cloned();
                match found {
                    Some(user) => Ok(Json(user)),
                    None => Err(not_found(id)),
                }
            }
        }
    };

    let create = {
        let store = Arc::clone(store);
        move |request: ApiRequest| {
            let store = Arc::clone(&store);
            async move {
                match request.json::<NewUser>() {
                    Ok(new) => Ok((StatusCode::CREATED, Json(store.insert(new)))),
                    Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
                }
            }
        }
    };

    let update = {
        let store = Arc::clone(store);
        move |patch: UserPatch, request: ApiRequest| {
            let store = Arc::clone(&store);
            async move {
                let id = request.params()["id"].as_u64().unwrap_or_default();
                let mut users = store.users.write();
                let user = users.iter_mut().find(|u| u.id == id).ok_or_else(|| not_found(id))?;
                if let Some(name) = patch.name {
                    user.name = name;
                }
                if let Some(email) = patch.email {
                    user.email = email;
                }
                Ok::<_, (StatusCode, serde_json::Value)>(user.clone())
            }
        }
    };

    router
        .get_with(
            "/users",
            Contract::builder()
                .query(Schema::object([(
                    "limit",
                    Schema::integer()
                        .coerce()
                        .minimum(1.0)
                        .maximum(100.0)
                        .default(json!(20)),
                )]))
                .response(Schema::array(user_schema()))
                .summary("List users"),
            list,
        )
        .get_with(
            "/users/{id}",
            Contract::builder()
                .params(id_param())
                .response(user_schema())
                .summary("Fetch a user"),
            fetch,
        )
        .post_with(
            "/users",
            Contract::builder()
                .request(Schema::object([
                    ("name", Schema::string().min_length(1).max_length(80)),
                    ("email", Schema::string().email()),
                ]))
                .response(user_schema())
                .responses(201, user_schema())
                .summary("Create a user"),
            create,
        )
        .patch_with(
            "/users/{id}",
            Contract::builder()
                .params(id_param())
                .request(Schema::object([
                    ("name", Schema::string().min_length(1).optional()),
                    ("email", Schema::string().email().optional()),
                ]))
                .response(user_schema())
                .summary("Update a user"),
            typed(update),
        )
        .get("/health", |_request: ApiRequest| async {
            json!({"status": "ok"})
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_optional_file("accord.toml")?
        .with_dotenv()
        .with_env_prefix("ACCORD")
        .load()
        .context("loading configuration")?;

    init_logging(&config.logging.to_log_config())?;
    configure(config.validation.to_patch());

    let store = Arc::new(Store::default());
    let app = routes(&store, &config).build()?;

    tracing::info!(routes = app.route_count(), "users api ready");
    Server::new(config.server.to_server_config(), app)
        .run()
        .await?;
    Ok(())
}
