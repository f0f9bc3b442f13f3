//! Shell contexts wired to a mock spending backend.

use serde_json::json;
use spend_config::{Config, ConfigManager};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::cli::shell_context::{CliMode, ShellContext};

/// Keeps the mock server and config directory alive for one test.
pub(crate) struct Harness {
    pub server: MockServer,
    pub home: TempDir,
    _runtime: Runtime,
}

impl Harness {
    /// Serves food (#5) with groceries (#12) under it, and a catalog that
    /// also offers transport (#7) and housing (#3).
    pub(crate) fn start() -> Self {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/spendings/session"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": 1,
                    "categories": [
                        {"category_id": 12, "parent_categories_id": 5, "name": "groceries", "notes": ""},
                        {"category_id": 5, "parent_categories_id": null, "name": "food", "notes": "weekly shop"}
                    ]
                })))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/api/spendings/categories/form"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "choices": [[7, "transport"], [5, "food"], [12, "groceries"], [3, "housing"]]
                })))
                .mount(&server)
                .await;
            server
        });
        Self {
            server,
            home: TempDir::new().unwrap(),
            _runtime: runtime,
        }
    }

    pub(crate) fn context(&self) -> ShellContext {
        let config = Config {
            api_base_url: self.server.uri(),
            ..Config::default()
        };
        let manager = ConfigManager::with_base_dir(self.home.path().to_path_buf()).unwrap();
        ShellContext::new(CliMode::Script, config, manager).unwrap()
    }

    /// A context whose initial load completed.
    pub(crate) fn ready_context(&self) -> ShellContext {
        let mut context = self.context();
        context.load_view(CancellationToken::new()).unwrap();
        context
    }
}
