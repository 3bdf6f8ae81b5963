//! REST implementation of [`FlowDirectory`].
//!
//! Requests are issued with an async `reqwest` client and driven to
//! completion on a runtime owned by the directory, so callers stay blocking.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::config::Settings;
use crate::error::{FlowError, Result};
use crate::types::{ComponentRef, GroupHandle, RuntimeState, ServiceState};

use super::FlowDirectory;
use super::model::{
    ControllerServiceEntity, ControllerServicesEntity, GroupFlow, ProcessGroupEntity,
    ProcessGroupFlowEntity, ReferencingComponentEntity, Revision, TemplateEntity,
    TemplatesEntity,
};

static TEMPLATE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<template>.*?<id>([^<]+)</id>").expect("template id pattern is valid")
});

enum Payload {
    Empty,
    Json(Value),
    Form(Vec<(&'static str, String)>),
    Template { file_name: String, content: Vec<u8> },
}

/// Processors, ports and reporting tasks share this envelope.
#[derive(Debug, Deserialize)]
struct ScheduledEntity {
    #[serde(default)]
    revision: Revision,
    #[serde(default)]
    component: ScheduledComponent,
}

#[derive(Debug, Default, Deserialize)]
struct ScheduledComponent {
    #[serde(default)]
    state: Option<RuntimeState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupStatusEntity {
    #[serde(default)]
    revision: Revision,
    #[serde(default)]
    running_count: u32,
}

pub struct HttpFlowDirectory {
    base_url: Url,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    client_id: String,
    token: Option<String>,
}

impl std::fmt::Debug for HttpFlowDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFlowDirectory")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl HttpFlowDirectory {
    /// Build a client from settings, exchanging credentials for a token if configured.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let base_url = Url::parse(&settings.url)
            .map_err(|e| FlowError::Config(format!("invalid url '{}': {}", settings.url, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("flowctl/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(settings.connect_timeout())
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| FlowError::Config(format!("failed to build HTTP client: {e}")))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FlowError::Config(format!("failed to create tokio runtime: {e}")))?;

        let mut directory = Self {
            base_url,
            client,
            runtime,
            client_id: uuid::Uuid::new_v4().to_string(),
            token: settings.token.clone(),
        };

        if directory.token.is_none()
            && let (Some(username), Some(password)) = (&settings.username, &settings.password)
        {
            let token = directory.request(
                Method::POST,
                "access/token",
                &[],
                Payload::Form(vec![
                    ("username", username.clone()),
                    ("password", password.clone()),
                ]),
            )?;
            tracing::debug!(user = %username, "obtained access token");
            directory.token = Some(token.trim().to_string());
        }

        Ok(directory)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| FlowError::Config(format!("invalid endpoint '{raw}': {e}")))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Payload,
    ) -> Result<String> {
        let url = self.endpoint(path)?;
        let label = method.to_string();
        let mut builder = self.client.request(method, url.clone()).query(query);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::Form(fields) => builder.form(&fields),
            Payload::Template { file_name, content } => {
                let part = Part::bytes(content)
                    .file_name(file_name)
                    .mime_str("application/xml")
                    .map_err(|e| remote_error(&label, &url, None, e.to_string()))?;
                builder.multipart(Form::new().part("template", part))
            }
        };

        tracing::debug!(method = %label, url = %url, "request");
        self.runtime.block_on(async {
            let response = builder
                .send()
                .await
                .map_err(|e| remote_error(&label, &url, None, e.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| remote_error(&label, &url, Some(status), e.to_string()))?;

            if status == StatusCode::NOT_FOUND {
                return Err(FlowError::not_found(format!("{label} {url}")));
            }
            if !status.is_success() {
                return Err(remote_error(&label, &url, Some(status), format!("HTTP {status}: {body}")));
            }
            Ok(body)
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.request(Method::GET, path, &[], Payload::Empty)?;
        self.decode(&body, "GET", path)
    }

    fn send_json(&self, method: Method, path: &str, body: Value) -> Result<String> {
        self.request(method, path, &[], Payload::Json(body))
    }

    fn decode<T: DeserializeOwned>(&self, body: &str, method: &str, path: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| FlowError::RemoteAccess {
            method: method.to_string(),
            url: path.to_string(),
            status: None,
            message: format!("unexpected response body: {e}"),
        })
    }

    fn revision(&self, version: i64) -> Value {
        json!({ "version": version, "clientId": self.client_id })
    }

    fn scheduled_path(component: &ComponentRef) -> Option<String> {
        match component {
            ComponentRef::Group(_) => None,
            ComponentRef::Processor(id) => Some(format!("processors/{id}")),
            ComponentRef::ReportingTask(id) => Some(format!("reporting-tasks/{id}")),
            ComponentRef::InputPort(id) => Some(format!("input-ports/{id}")),
            ComponentRef::OutputPort(id) => Some(format!("output-ports/{id}")),
        }
    }

    fn controller_service(&self, service_id: &str) -> Result<ControllerServiceEntity> {
        self.get(&format!("controller-services/{service_id}"))
    }
}

impl FlowDirectory for HttpFlowDirectory {
    fn group_flow(&self, group_id: &str) -> Result<GroupFlow> {
        let entity: ProcessGroupFlowEntity = self.get(&format!("flow/process-groups/{group_id}"))?;
        Ok(entity.process_group_flow)
    }

    fn controller_services(&self, group_id: &str) -> Result<Vec<ControllerServiceEntity>> {
        let entity: ControllerServicesEntity =
            self.get(&format!("flow/process-groups/{group_id}/controller-services"))?;
        Ok(entity.controller_services)
    }

    fn referencers(&self, service_id: &str) -> Result<Vec<ReferencingComponentEntity>> {
        Ok(self.controller_service(service_id)?.component.referencing_components)
    }

    fn runtime_state(&self, component: &ComponentRef) -> Result<RuntimeState> {
        let Some(path) = Self::scheduled_path(component) else {
            let status: GroupStatusEntity =
                self.get(&format!("process-groups/{}", component.id()))?;
            return Ok(if status.running_count > 0 {
                RuntimeState::Running
            } else {
                RuntimeState::Stopped
            });
        };
        let entity: ScheduledEntity = self.get(&path)?;
        entity.component.state.ok_or_else(|| FlowError::RemoteAccess {
            method: "GET".to_string(),
            url: path,
            status: None,
            message: format!("{component} reported no state"),
        })
    }

    fn set_runtime_state(&self, component: &ComponentRef, target: RuntimeState) -> Result<()> {
        let Some(path) = Self::scheduled_path(component) else {
            // Scheduling a group cascades to every component beneath it.
            let id = component.id();
            self.send_json(
                Method::PUT,
                &format!("flow/process-groups/{id}"),
                json!({ "id": id, "state": target.to_string() }),
            )?;
            return Ok(());
        };
        let current: ScheduledEntity = self.get(&path)?;
        self.send_json(
            Method::PUT,
            &path,
            json!({
                "revision": self.revision(current.revision.version),
                "component": { "id": component.id(), "state": target.to_string() },
            }),
        )?;
        Ok(())
    }

    fn controller_service_state(&self, service_id: &str) -> Result<ServiceState> {
        let entity = self.controller_service(service_id)?;
        entity.component.state.ok_or_else(|| FlowError::RemoteAccess {
            method: "GET".to_string(),
            url: format!("controller-services/{service_id}"),
            status: None,
            message: "controller service reported no state".to_string(),
        })
    }

    fn set_controller_service_state(&self, service_id: &str, target: ServiceState) -> Result<()> {
        let current = self.controller_service(service_id)?;
        self.send_json(
            Method::PUT,
            &format!("controller-services/{service_id}"),
            json!({
                "revision": self.revision(current.revision.version),
                "component": { "id": service_id, "state": target.to_string() },
            }),
        )?;
        Ok(())
    }

    fn templates(&self) -> Result<Vec<TemplateEntity>> {
        let entity: TemplatesEntity = self.get("flow/templates")?;
        Ok(entity.templates)
    }

    fn delete_template(&self, template_id: &str) -> Result<()> {
        self.request(
            Method::DELETE,
            &format!("templates/{template_id}"),
            &[],
            Payload::Empty,
        )?;
        Ok(())
    }

    fn delete_group(&self, group_id: &str) -> Result<()> {
        let path = format!("process-groups/{group_id}");
        let current: GroupStatusEntity = self.get(&path)?;
        self.request(
            Method::DELETE,
            &path,
            &[
                ("version", current.revision.version.to_string()),
                ("clientId", self.client_id.clone()),
            ],
            Payload::Empty,
        )?;
        Ok(())
    }

    fn create_group(&self, parent_id: &str, name: &str) -> Result<GroupHandle> {
        let path = format!("process-groups/{parent_id}/process-groups");
        let body = self.send_json(
            Method::POST,
            &path,
            json!({
                "revision": self.revision(0),
                "component": { "name": name, "position": { "x": 0.0, "y": 0.0 } },
            }),
        )?;
        let created: ProcessGroupEntity = self.decode(&body, "POST", &path)?;
        Ok(GroupHandle::new(created.id, created.component.name))
    }

    fn upload_template(&self, group_id: &str, file_name: &str, content: Vec<u8>) -> Result<String> {
        let path = format!("process-groups/{group_id}/templates/upload");
        let body = self.request(
            Method::POST,
            &path,
            &[],
            Payload::Template {
                file_name: file_name.to_string(),
                content,
            },
        )?;
        parse_uploaded_template_id(&body).ok_or_else(|| FlowError::RemoteAccess {
            method: "POST".to_string(),
            url: path,
            status: None,
            message: "upload response carried no template id".to_string(),
        })
    }

    fn instantiate_template(
        &self,
        group_id: &str,
        template_id: &str,
        origin_x: f64,
        origin_y: f64,
    ) -> Result<()> {
        self.send_json(
            Method::POST,
            &format!("process-groups/{group_id}/template-instance"),
            json!({ "templateId": template_id, "originX": origin_x, "originY": origin_y }),
        )?;
        Ok(())
    }
}

/// The upload endpoint answers with XML; newer engines may answer with JSON.
fn parse_uploaded_template_id(body: &str) -> Option<String> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        return serde_json::from_str::<TemplateEntity>(trimmed)
            .ok()
            .map(|entity| entity.template.id)
            .filter(|id| !id.is_empty());
    }
    TEMPLATE_ID
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn remote_error(method: &str, url: &Url, status: Option<StatusCode>, message: String) -> FlowError {
    FlowError::RemoteAccess {
        method: method.to_string(),
        url: url.to_string(),
        status: status.map(|s| s.as_u16()),
        message,
    }
}
