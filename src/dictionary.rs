//! Crowd-sourced definition lookup
//!
//! [`DictionaryLookup`] abstracts the dictionary backend; [`UrbanDictionaryClient`]
//! talks to the Urban Dictionary v0 API. Responses are decoded into an explicit
//! schema: a body carrying an `error`/`errors` key is rejected, a missing or
//! empty `list` means "no definitions", and entries missing a required field
//! are reported as a malformed response.
//!
//! [`lookup_many`] builds the [`TermDefinitions`] map consumed by interpretation:
//! every requested term gets a value, either the first definition or
//! [`NO_DEFINITION`].

use crate::config::InterpreterConfig;
use crate::error::{InterpretError, InterpretResult};
use crate::literal::render_map;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Value recorded for a term the dictionary knows nothing about
pub const NO_DEFINITION: &str = "No definition found";

const SERVICE: &str = "Urban Dictionary";

/// One dictionary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(rename = "word")]
    pub term: String,
    pub definition: String,
    pub example: String,
    #[serde(rename = "thumbs_up", deserialize_with = "integer_like")]
    pub upvotes: i64,
    #[serde(rename = "thumbs_down", deserialize_with = "integer_like")]
    pub downvotes: i64,
}

impl std::fmt::Display for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Word: {}\nDefinition: {}\nExample: {}\nUpvotes: {}\nDownvotes: {}",
            self.term, self.definition, self.example, self.upvotes, self.downvotes
        )
    }
}

/// Vote counts arrive as numbers, occasionally as numeric strings
fn integer_like<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(n) if n.fract() == 0.0 => Ok(n as i64),
        Raw::Float(n) => Err(serde::de::Error::custom(format!("not an integer: {}", n))),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not an integer: {:?}", s))),
    }
}

#[derive(Debug, Deserialize)]
struct DefineResponse {
    #[serde(default)]
    list: Option<Vec<Definition>>,
}

/// Whether an absent `list` means "nothing found" or a broken response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListPolicy {
    MissingIsEmpty,
    Required,
}

/// Decode a dictionary response body
fn parse_definitions(body: &str, policy: ListPolicy) -> InterpretResult<Vec<Definition>> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| InterpretError::malformed(SERVICE, format!("invalid JSON: {}", e)))?;

    let object = json.as_object().ok_or_else(|| {
        InterpretError::DictionaryRejected("response is not a JSON object".to_string())
    })?;
    for key in ["error", "errors"] {
        if let Some(detail) = object.get(key) {
            return Err(InterpretError::DictionaryRejected(detail.to_string()));
        }
    }

    let response: DefineResponse = serde_json::from_value(json)
        .map_err(|e| InterpretError::malformed(SERVICE, e.to_string()))?;

    match (response.list, policy) {
        (Some(list), _) => Ok(list),
        (None, ListPolicy::MissingIsEmpty) => Ok(Vec::new()),
        (None, ListPolicy::Required) => Err(InterpretError::malformed(
            SERVICE,
            "missing 'list' array",
        )),
    }
}

/// Generic trait for definition sources
#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    /// Look up a term or phrase; results are in the source's relevance order
    async fn define(&self, term: &str) -> InterpretResult<Vec<Definition>>;

    /// Name of this dictionary, used in logs
    fn provider_name(&self) -> &str;
}

/// Urban Dictionary v0 API client
#[derive(Debug, Clone)]
pub struct UrbanDictionaryClient {
    client: reqwest::Client,
    base_url: String,
}

impl UrbanDictionaryClient {
    pub fn new(config: &InterpreterConfig) -> InterpretResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.dictionary_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the definition with the given id
    pub async fn define_by_id(&self, defid: u64) -> InterpretResult<Vec<Definition>> {
        let url = format!("{}/define?defid={}", self.base_url, defid);
        let body = self.fetch(&url).await?;
        parse_definitions(&body, ListPolicy::MissingIsEmpty)
    }

    /// Fetch a page of random definitions
    pub async fn random(&self) -> InterpretResult<Vec<Definition>> {
        let url = format!("{}/random", self.base_url);
        let body = self.fetch(&url).await?;
        parse_definitions(&body, ListPolicy::Required)
    }

    async fn fetch(&self, url: &str) -> InterpretResult<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InterpretError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl DictionaryLookup for UrbanDictionaryClient {
    async fn define(&self, term: &str) -> InterpretResult<Vec<Definition>> {
        let url = format!(
            "{}/define?term={}",
            self.base_url,
            urlencoding::encode(term)
        );
        let body = self.fetch(&url).await?;
        parse_definitions(&body, ListPolicy::MissingIsEmpty)
    }

    fn provider_name(&self) -> &str {
        SERVICE
    }
}

/// Term → definition text, in the order the terms were requested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermDefinitions(pub IndexMap<String, String>);

impl TermDefinitions {
    pub fn new() -> Self {
        TermDefinitions(IndexMap::new())
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.0.get(term).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Terms the dictionary had no entry for
    pub fn undefined_terms(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, v)| *v == NO_DEFINITION)
            .map(|(k, _)| k)
    }

    /// Render as a map literal for prompts
    pub fn render(&self) -> String {
        render_map(&self.0)
    }
}

/// Look up each term in turn and keep the top definition
///
/// A failed lookup aborts the whole operation; there is no per-term recovery.
/// A repeated term is looked up again and keeps its first position.
pub async fn lookup_many(
    dictionary: &dyn DictionaryLookup,
    terms: &[String],
) -> InterpretResult<TermDefinitions> {
    let mut definitions = TermDefinitions::new();

    for term in terms {
        let results = dictionary.define(term).await?;
        debug!(
            term = %term,
            results = results.len(),
            dictionary = dictionary.provider_name(),
            "Looked up term"
        );
        let text = results
            .into_iter()
            .next()
            .map(|d| d.definition)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| NO_DEFINITION.to_string());
        definitions.0.insert(term.clone(), text);
    }

    Ok(definitions)
}
