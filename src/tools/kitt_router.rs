use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use serde::Deserialize;

use crate::clients::kitt::KittApi;
use crate::domain::{FindEmailRequest, JobResponse, JobStatusQuery, VerifyEmailRequest};
use crate::infra::runtime::mcp_transport::ServerHandler;

/// MCP handler exposing the TryKitt job endpoints as tools.
#[derive(Clone)]
pub struct KittSvc {
    api: Arc<dyn KittApi>,
}

impl KittSvc {
    pub fn new(api: Arc<dyn KittApi>) -> Self {
        Self { api }
    }
}

impl ServerHandler for KittSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "TryKitt.ai email tools: verify an address, find an address for a person, \
                 and inspect submitted jobs."
                    .into(),
            ),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct VerifyEmailArgs {
    /// The email address to verify
    pub email: String,
    /// Optional custom data to associate with the request
    #[serde(default)]
    pub custom_data: Option<String>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct FindEmailArgs {
    /// The full name of the person
    pub full_name: String,
    /// The company domain or website
    pub domain: String,
    /// Optional LinkedIn profile URL
    #[serde(default)]
    pub linkedin_url: Option<String>,
    /// Optional custom data to associate with the request
    #[serde(default)]
    pub custom_data: Option<String>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct JobStatusArgs {
    /// The ID of the job to check
    pub job_id: String,
}

/// Objects go out as structured content; any other JSON value as its text.
fn job_result(out: JobResponse) -> CallToolResult {
    if out.is_object() {
        CallToolResult::structured(out)
    } else {
        CallToolResult::success(vec![Content::text(out.to_string())])
    }
}

#[rmcp::tool_router]
impl KittSvc {
    #[rmcp::tool(name = "verify_email_send", description = "Verify an email using TryKitt.")]
    async fn verify_email_send(
        &self,
        Parameters(args): Parameters<VerifyEmailArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::debug!(args = ?args, "verify_email_send invoked");
        let req = VerifyEmailRequest::new(args.email, args.custom_data)?;
        let out = self.api.verify_email(&req).await?;
        Ok(job_result(out))
    }

    #[rmcp::tool(name = "find_email", description = "Find an email address for a person.")]
    async fn find_email(
        &self,
        Parameters(args): Parameters<FindEmailArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::debug!(args = ?args, "find_email invoked");
        let req = FindEmailRequest::new(args.full_name, args.domain, args.linkedin_url, args.custom_data)?;
        let out = self.api.find_email(&req).await?;
        Ok(job_result(out))
    }

    #[rmcp::tool(name = "get_job_status", description = "Get the status of a job.")]
    async fn get_job_status(
        &self,
        Parameters(args): Parameters<JobStatusArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let query = JobStatusQuery::new(args.job_id)?;
        tracing::debug!(job_id = query.id(), "get_job_status invoked");
        let out = self.api.job_status(&query).await?;
        Ok(job_result(out))
    }

    #[rmcp::tool(name = "list_jobs", description = "List jobs")]
    async fn list_jobs(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::debug!("list_jobs invoked");
        let out = self.api.list_jobs().await?;
        Ok(job_result(out))
    }
}

pub type KittRouter = ToolRouter<KittSvc>;

impl KittSvc {
    pub fn router() -> KittRouter {
        // Wrapper to expose the macro-generated private tool_router
        Self::tool_router()
    }
}

/// Factory shape required by the rmcp stdio and Streamable HTTP transports.
pub fn make_factory(
    api: Arc<dyn KittApi>,
) -> impl Fn() -> (KittSvc, KittRouter) + Send + Sync + Clone + 'static {
    move || (KittSvc::new(api.clone()), KittSvc::router())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::kitt::KittClient;
    use crate::core::KittError;
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Records what the tool layer hands to the backend.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Value>>,
    }

    #[async_trait::async_trait]
    impl KittApi for Recorder {
        async fn verify_email(&self, req: &VerifyEmailRequest) -> Result<JobResponse, KittError> {
            self.seen.lock().unwrap().push(serde_json::to_value(req).unwrap());
            Ok(json!({}))
        }
        async fn find_email(&self, req: &FindEmailRequest) -> Result<JobResponse, KittError> {
            self.seen.lock().unwrap().push(serde_json::to_value(req).unwrap());
            Ok(json!({}))
        }
        async fn job_status(&self, query: &JobStatusQuery) -> Result<JobResponse, KittError> {
            self.seen.lock().unwrap().push(json!({"id": query.id()}));
            Ok(json!({}))
        }
        async fn list_jobs(&self) -> Result<JobResponse, KittError> {
            self.seen.lock().unwrap().push(json!("list"));
            Ok(json!([{"id": "a"}]))
        }
    }

    fn svc_for(server: &MockServer) -> KittSvc {
        KittSvc::new(Arc::new(KittClient::new(server.base_url()).unwrap()))
    }

    fn input_schema(tool: &str) -> Value {
        let route = KittSvc::router()
            .into_iter()
            .find(|r| r.name() == tool)
            .unwrap_or_else(|| panic!("missing tool {tool}"));
        Value::Object((*route.attr.input_schema).clone())
    }

    fn property_names(schema: &Value) -> Vec<String> {
        let mut names: Vec<String> = schema["properties"]
            .as_object()
            .expect("properties object")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn as_json(result: &CallToolResult) -> Value {
        serde_json::to_value(result).unwrap()
    }

    #[test]
    fn tool_router_lists_all_four_tools() {
        let names: Vec<String> = KittSvc::router()
            .into_iter()
            .map(|r| r.name().to_string())
            .collect();
        for expected in ["verify_email_send", "find_email", "get_job_status", "list_jobs"] {
            assert!(names.iter().any(|n| n == expected), "missing tool {expected}, got: {names:?}");
        }
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn input_schemas_publish_argument_names_and_required_lists() {
        let verify = input_schema("verify_email_send");
        assert_eq!(property_names(&verify), ["custom_data", "email"]);
        assert_eq!(verify["required"], json!(["email"]));
        assert_eq!(verify["properties"]["email"]["type"], "string");
        assert!(verify["properties"]["email"]["description"].is_string());

        let find = input_schema("find_email");
        assert_eq!(
            property_names(&find),
            ["custom_data", "domain", "full_name", "linkedin_url"]
        );
        let mut required: Vec<String> =
            serde_json::from_value(find["required"].clone()).expect("required list");
        required.sort();
        assert_eq!(required, ["domain", "full_name"]);

        let status = input_schema("get_job_status");
        assert_eq!(property_names(&status), ["job_id"]);
        assert_eq!(status["required"], json!(["job_id"]));
    }

    #[test]
    fn missing_or_mistyped_arguments_do_not_deserialize() {
        assert!(serde_json::from_value::<VerifyEmailArgs>(json!({})).is_err());
        assert!(serde_json::from_value::<VerifyEmailArgs>(json!({"email": "a@b.co", "custom_data": 5})).is_err());
        assert!(serde_json::from_value::<FindEmailArgs>(json!({"full_name": "Jane"})).is_err());
        let args: FindEmailArgs =
            serde_json::from_value(json!({"full_name": "Jane", "domain": "acme.io"})).unwrap();
        assert!(args.linkedin_url.is_none() && args.custom_data.is_none());
    }

    #[test]
    fn server_info_advertises_tools() {
        let svc = KittSvc::new(Arc::new(Recorder::default()));
        assert!(svc.get_info().capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn verify_email_send_returns_upstream_json() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/job/verify_email")
                .json_body(json!({"email": "jane@acme.io", "realtime": true, "customData": "x"}));
            then.status(200).json_body(json!({"id": "job-9", "result": {"valid": true}}));
        });

        let args = VerifyEmailArgs { email: "jane@acme.io".into(), custom_data: Some("x".into()) };
        let out = svc_for(&server)
            .verify_email_send(Parameters(args))
            .await
            .expect("tool should succeed");
        m.assert();
        assert_eq!(as_json(&out)["structuredContent"]["result"]["valid"], true);
    }

    #[tokio::test]
    async fn find_email_maps_argument_names() {
        let rec = Arc::new(Recorder::default());
        let svc = KittSvc::new(rec.clone());
        let args = FindEmailArgs {
            full_name: "Jane Doe".into(),
            domain: "acme.io".into(),
            linkedin_url: Some("https://linkedin.com/in/jd".into()),
            custom_data: None,
        };
        svc.find_email(Parameters(args)).await.unwrap();

        let seen = rec.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            json!({
                "fullName": "Jane Doe",
                "domain": "acme.io",
                "realtime": true,
                "linkedinStandardProfileURL": "https://linkedin.com/in/jd"
            })
        );
    }

    #[tokio::test]
    async fn blank_required_fields_are_invalid_params() {
        let rec = Arc::new(Recorder::default());
        let svc = KittSvc::new(rec.clone());

        let args = VerifyEmailArgs { email: "  ".into(), custom_data: None };
        let err = match svc.verify_email_send(Parameters(args)).await {
            Err(e) => e,
            Ok(_) => panic!("expected invalid params error, got Ok"),
        };
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("missing required field: email"));

        let args = FindEmailArgs {
            full_name: "Jane".into(),
            domain: String::new(),
            linkedin_url: None,
            custom_data: None,
        };
        let err = match svc.find_email(Parameters(args)).await {
            Err(e) => e,
            Ok(_) => panic!("expected invalid params error, got Ok"),
        };
        assert!(err.message.contains("domain"));

        let args = JobStatusArgs { job_id: String::new() };
        let err = match svc.get_job_status(Parameters(args)).await {
            Err(e) => e,
            Ok(_) => panic!("expected invalid params error, got Ok"),
        };
        assert_eq!(err.code.0, -32602);

        assert!(rec.seen.lock().unwrap().is_empty(), "nothing should reach the backend");
    }

    #[tokio::test]
    async fn get_job_status_and_list_jobs_reach_backend() {
        let rec = Arc::new(Recorder::default());
        let svc = KittSvc::new(rec.clone());
        svc.get_job_status(Parameters(JobStatusArgs { job_id: "abc123".into() }))
            .await
            .unwrap();
        svc.list_jobs().await.unwrap();
        let seen = rec.seen.lock().unwrap();
        assert_eq!(seen[0], json!({"id": "abc123"}));
        assert_eq!(seen[1], json!("list"));
    }

    #[tokio::test]
    async fn array_response_is_returned_as_json_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/job");
            then.status(200).json_body(json!([{"id": "a"}]));
        });

        let out = as_json(&svc_for(&server).list_jobs().await.unwrap());
        assert!(out.get("structuredContent").is_none());
        let text = out["content"][0]["text"].as_str().expect("text content");
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!([{"id": "a"}]));
    }

    #[tokio::test]
    async fn decode_failure_surfaces_as_internal_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/job");
            then.status(200).body("not json");
        });
        let err = match svc_for(&server).list_jobs().await {
            Err(e) => e,
            Ok(_) => panic!("expected internal error, got Ok"),
        };
        assert_eq!(err.code.0, -32603);
    }

    #[tokio::test]
    async fn dropped_tool_call_does_not_wait_for_upstream() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/job").query_param("id", "slow");
            then.status(200)
                .json_body(json!({"id": "slow"}))
                .delay(std::time::Duration::from_secs(5));
        });

        let svc = svc_for(&server);
        let started = std::time::Instant::now();
        let res = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            svc.get_job_status(Parameters(JobStatusArgs { job_id: "slow".into() })),
        )
        .await;
        assert!(res.is_err(), "tool call should have been cancelled");
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn factory_builds_handler_and_router() {
        let factory = make_factory(Arc::new(Recorder::default()));
        let (_svc, router) = factory();
        assert_eq!(router.into_iter().count(), 4);
    }
}
