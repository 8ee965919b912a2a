//! GraphQL client for the work item backend.
//!
//! One POST fetches both lists:
//! - `workItems(where: ...)` with every field of the work item record
//! - `edges(where: ...)` with source, target and relationship type
//!
//! The body is the usual `{query, variables}` JSON. A bearer token is sent
//! when one is configured.

use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use crate::client::{Scope, WorkItemSource};
use crate::models::{Dataset, Edge, WorkItem};
use crate::{Error, Result};

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("workboard/", env!("CARGO_PKG_VERSION"));

/// Query for items and edges, filtered by the `$where` / `$edgeWhere` inputs.
pub const DATASET_QUERY: &str = r#"query Dataset($where: WorkItemWhere, $edgeWhere: EdgeWhere) {
  workItems(where: $where) {
    id
    title
    description
    type
    status
    priorityExec
    priorityIndiv
    priorityComm
    priorityComp
    createdAt
    updatedAt
    dueDate
    tags
    metadata
    owner { id name username }
    assignedTo { id name username }
    graph { id name }
    team { id name }
    contributors { id name username }
    dependencies { id title type status }
    dependents { id title type status }
  }
  edges(where: $edgeWhere) {
    id
    source
    target
    type
  }
}"#;

/// Request body for `scope`.
pub fn build_request(scope: &Scope) -> Value {
    let mut item_where = serde_json::Map::new();
    let mut edge_where = serde_json::Map::new();
    if let Some(graph) = &scope.graph {
        item_where.insert("graph".to_string(), json!({ "id": graph }));
        edge_where.insert("graph".to_string(), json!({ "id": graph }));
    }
    if let Some(team) = &scope.team {
        item_where.insert("team".to_string(), json!({ "id": team }));
    }

    json!({
        "query": DATASET_QUERY,
        "variables": {
            "where": Value::Object(item_where),
            "edgeWhere": Value::Object(edge_where),
        }
    })
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetData {
    #[serde(default)]
    work_items: Option<Vec<WorkItem>>,
    #[serde(default)]
    edges: Option<Vec<Edge>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<DatasetData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

/// Turn a response body into a dataset. A non-empty `errors` array fails
/// the whole fetch, even when partial data came back.
pub fn parse_response(body: Value) -> Result<Dataset> {
    let response: GraphqlResponse = serde_json::from_value(body)?;

    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(Error::Graphql(messages.join("; ")));
    }

    let data = response
        .data
        .ok_or_else(|| Error::Graphql("response contained no data".to_string()))?;

    Ok(Dataset::new(
        data.work_items.unwrap_or_default(),
        data.edges.unwrap_or_default(),
    ))
}

/// Blocking GraphQL client.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl GraphqlClient {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            endpoint: endpoint.into(),
            token,
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl WorkItemSource for GraphqlClient {
    fn fetch(&self, scope: &Scope) -> Result<Dataset> {
        tracing::debug!(endpoint = %self.endpoint, ?scope, "fetching dataset");

        let mut request = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        let body: Value = match request.send_json(build_request(scope)) {
            Ok(resp) => resp.into_json()?,
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(Error::Http(format!("HTTP {}: {}", code, body.trim())));
            }
            Err(e) => return Err(Error::Http(e.to_string())),
        };

        let dataset = parse_response(body)?;
        tracing::debug!(
            items = dataset.work_items.len(),
            edges = dataset.edges.len(),
            "dataset fetched"
        );
        Ok(dataset)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EdgeType, WorkItemStatus};

    #[test]
    fn test_build_request_unscoped() {
        let body = build_request(&Scope::default());
        assert_eq!(body["query"], DATASET_QUERY);
        assert_eq!(body["variables"]["where"], json!({}));
        assert_eq!(body["variables"]["edgeWhere"], json!({}));
    }

    #[test]
    fn test_build_request_scoped() {
        let scope = Scope::new(Some("g1".to_string()), Some("t1".to_string()));
        let body = build_request(&scope);
        assert_eq!(body["variables"]["where"]["graph"]["id"], "g1");
        assert_eq!(body["variables"]["where"]["team"]["id"], "t1");
        assert_eq!(body["variables"]["edgeWhere"]["graph"]["id"], "g1");
        assert!(body["variables"]["edgeWhere"].get("team").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "data": {
                "workItems": [
                    {"id": "a", "title": "A", "type": "TASK", "status": "BLOCKED", "createdAt": "2026-01-01T00:00:00Z"}
                ],
                "edges": [
                    {"id": "e1", "source": "a", "target": "b", "type": "DEPENDS_ON"}
                ]
            }
        });
        let dataset = parse_response(body).unwrap();
        assert_eq!(dataset.work_items.len(), 1);
        assert_eq!(dataset.work_items[0].status, WorkItemStatus::Blocked);
        assert_eq!(dataset.edges[0].edge_type, EdgeType::DependsOn);
    }

    #[test]
    fn test_parse_response_null_lists() {
        let body = json!({"data": {"workItems": null, "edges": null}});
        let dataset = parse_response(body).unwrap();
        assert!(dataset.work_items.is_empty());
        assert!(dataset.edges.is_empty());
    }

    #[test]
    fn test_parse_response_errors() {
        let body = json!({
            "data": null,
            "errors": [{"message": "Unauthorized"}, {"message": "Try again"}]
        });
        match parse_response(body) {
            Err(Error::Graphql(msg)) => assert_eq!(msg, "Unauthorized; Try again"),
            other => panic!("expected GraphQL error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_response_missing_data() {
        assert!(matches!(
            parse_response(json!({})),
            Err(Error::Graphql(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_http_error() {
        let client = GraphqlClient::new(
            "http://127.0.0.1:9/graphql",
            None,
            Duration::from_millis(500),
        );
        assert!(matches!(
            client.fetch(&Scope::default()),
            Err(Error::Http(_))
        ));
    }
}
