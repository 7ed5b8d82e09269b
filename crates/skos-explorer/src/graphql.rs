//! GraphQL concept repository
//!
//! Maps the repository calls onto three fixed queries POSTed as
//! `{"query", "variables"}` JSON. Partial responses (data plus errors) are
//! accepted with a warning; errors without data fail the call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skos_index::{ConceptRepository, RepositoryError};
use skos_model::wire::QueryData;
use skos_model::{ConceptNode, ConceptSchemeNode, Uri};

use crate::config::ExplorerConfig;

/// Scheme listing with top concepts and one level of their narrower
pub const CONCEPT_SCHEMES_QUERY: &str = r"
query conceptSchemes($limit: Int) {
  conceptSchemes(first: $limit) {
    __typename
    aantalBegrippen
    uri
    label
    type { uri label }
    hasTopConcept {
      __typename
      uri
      label
      type { uri label }
      narrower { __typename uri label type { uri label } }
    }
  }
}";

/// Concepts whose `broader` includes a parent, with their narrower
pub const CONCEPTS_BY_BROADER_QUERY: &str = r"
query conceptsByBroader($limit: Int, $filter_broader: ID) {
  concepts(first: $limit, where: {broader: {hasValue: $filter_broader}}) {
    __typename
    uri
    label
    type { uri label }
    broader { __typename uri label type { uri label } }
    narrower { __typename uri label type { uri label } }
  }
}";

/// Full concept record
pub const CONCEPT_DETAIL_QUERY: &str = r"
query concept($uri: ID) {
  concepts(uri: $uri) {
    __typename
    uri
    label
    type { uri label }
    definition { string lang }
    prefLabel { string lang }
    altLabel { string lang }
    note { string lang }
    scopeNote { string lang }
    example { string lang }
    editorialNote { string lang }
    source
    subject { uri label }
    related { __typename uri label type { uri label } }
    broader { __typename uri label type { uri label } }
    narrower { __typename uri label type { uri label } }
  }
}";

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    errors: Vec<GraphqlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorMessage {
    message: String,
}

/// Decode a GraphQL response body
///
/// # Errors
/// - [`RepositoryError::Decode`] if the body is not a GraphQL response
/// - [`RepositoryError::Graphql`] if it carries errors and no data
pub fn decode_response(body: &str) -> Result<QueryData, RepositoryError> {
    let response: GraphqlResponse =
        serde_json::from_str(body).map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();

    match response.data {
        Some(data) => {
            if !messages.is_empty() {
                tracing::warn!(errors = ?messages, "partial graphql response");
            }
            Ok(data)
        }
        None if !messages.is_empty() => Err(RepositoryError::Graphql(messages)),
        None => Err(RepositoryError::Decode("response carries no data".to_string())),
    }
}

/// Repository backed by a GraphQL endpoint
#[derive(Debug, Clone)]
pub struct GraphqlRepository {
    client: reqwest::Client,
    endpoint: String,
    root_limit: Option<u32>,
    child_limit: Option<u32>,
}

impl GraphqlRepository {
    /// Create repository for an endpoint with default timeout and no limits
    ///
    /// # Errors
    /// Returns [`RepositoryError::Unavailable`] if the HTTP client cannot
    /// be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RepositoryError> {
        Self::from_config(&ExplorerConfig::new().with_endpoint(endpoint))
    }

    /// Create repository from configuration
    ///
    /// # Errors
    /// Returns [`RepositoryError::Unavailable`] if no endpoint is configured
    /// or the HTTP client cannot be built.
    pub fn from_config(config: &ExplorerConfig) -> Result<Self, RepositoryError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| RepositoryError::Unavailable("no endpoint configured".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            root_limit: config.root_limit,
            child_limit: config.child_limit,
        })
    }

    /// Endpoint URL
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<QueryData, RepositoryError> {
        let request = GraphqlRequest { query, variables };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::Transport(format!(
                "{} returned HTTP {status}",
                self.endpoint
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;
        decode_response(&body)
    }
}

#[async_trait]
impl ConceptRepository for GraphqlRepository {
    async fn fetch_roots(&self) -> Result<Vec<ConceptSchemeNode>, RepositoryError> {
        let data = self
            .query(
                CONCEPT_SCHEMES_QUERY,
                serde_json::json!({ "limit": self.root_limit }),
            )
            .await?;

        Ok(data
            .concept_schemes
            .unwrap_or_default()
            .into_iter()
            .map(ConceptSchemeNode::from)
            .collect())
    }

    async fn fetch_children(&self, parent: &Uri) -> Result<Vec<ConceptNode>, RepositoryError> {
        let data = self
            .query(
                CONCEPTS_BY_BROADER_QUERY,
                serde_json::json!({ "limit": self.child_limit, "filter_broader": parent }),
            )
            .await?;

        Ok(data
            .concepts
            .unwrap_or_default()
            .into_iter()
            .map(ConceptNode::from)
            .collect())
    }

    async fn fetch_detail(&self, uri: &Uri) -> Result<Option<ConceptNode>, RepositoryError> {
        let data = self
            .query(CONCEPT_DETAIL_QUERY, serde_json::json!({ "uri": uri }))
            .await?;

        Ok(data
            .concepts
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(ConceptNode::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skos_model::NodeKind;

    #[test]
    fn decodes_scheme_listing() {
        let body = r#"{"data": {"conceptSchemes": [
            {"__typename": "ConceptScheme", "uri": "s", "label": "S", "aantalBegrippen": 2,
             "hasTopConcept": [
                {"__typename": "Concept", "uri": "c", "label": "C",
                 "narrower": [{"uri": "n", "label": "N", "type": [{"uri": "x", "label": "Concept"}]}]}
             ]}
        ]}}"#;

        let data = decode_response(body).unwrap();
        let schemes: Vec<ConceptSchemeNode> = data
            .concept_schemes
            .unwrap()
            .into_iter()
            .map(ConceptSchemeNode::from)
            .collect();

        assert_eq!(schemes[0].kind(), NodeKind::ConceptScheme);
        assert_eq!(schemes[0].concept_count, 2);
        let top = &schemes[0].has_top_concept[0];
        assert_eq!(top.kind(), NodeKind::Concept);
        assert_eq!(top.narrower[0].kind(), NodeKind::Concept);
    }

    #[test]
    fn errors_without_data_fail() {
        let body = r#"{"data": null, "errors": [{"message": "boom"}, {"message": "again"}]}"#;
        let err = decode_response(body).unwrap_err();
        assert_eq!(
            err,
            RepositoryError::Graphql(vec!["boom".to_string(), "again".to_string()])
        );
    }

    #[test]
    fn partial_response_keeps_data() {
        let body = r#"{"data": {"concepts": [{"uri": "c"}]}, "errors": [{"message": "field"}]}"#;
        let data = decode_response(body).unwrap();
        assert_eq!(data.concepts.unwrap().len(), 1);
    }

    #[test]
    fn missing_data_is_decode_error() {
        assert!(matches!(decode_response("{}"), Err(RepositoryError::Decode(_))));
        assert!(matches!(decode_response("<html>"), Err(RepositoryError::Decode(_))));
    }

    #[test]
    fn null_lists_decode_as_empty() {
        let body = r#"{"data": {"concepts": [{"uri": "c", "narrower": null, "definition": null}]}}"#;
        let concept = ConceptNode::from(decode_response(body).unwrap().concepts.unwrap().remove(0));
        assert!(concept.narrower.is_empty());
        assert!(concept.definition.is_empty());
    }

    #[test]
    fn request_body_shape() {
        let request = GraphqlRequest {
            query: CONCEPTS_BY_BROADER_QUERY,
            variables: serde_json::json!({ "limit": None::<u32>, "filter_broader": Uri::new("p") }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["variables"]["filter_broader"], "p");
        assert!(json["variables"]["limit"].is_null());
        assert!(json["query"].as_str().unwrap().contains("hasValue: $filter_broader"));
    }

    #[test]
    fn requires_endpoint() {
        let err = GraphqlRepository::from_config(&ExplorerConfig::new()).unwrap_err();
        assert!(matches!(err, RepositoryError::Unavailable(_)));

        let repo = GraphqlRepository::new("http://localhost:4000/graphql").unwrap();
        assert_eq!(repo.endpoint(), "http://localhost:4000/graphql");
    }
}
