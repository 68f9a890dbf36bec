//! Shared in-memory collaborators for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use quorum_resolver::{
    federation::{Discovery, Selection},
    identity::{DidDocument, DocumentFetcher, Endpoint},
    ResolverError, ResolverResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What an endpoint does when asked for a document
#[derive(Clone)]
pub enum Answer {
    Doc(serde_json::Value),
    Fail(&'static str),
    Hang,
}

/// Fetcher answering per endpoint URL
#[derive(Default)]
pub struct ScriptedFetcher {
    answers: HashMap<String, Answer>,
    calls: AtomicUsize,
    created: Mutex<Vec<(String, serde_json::Value)>>,
}

impl ScriptedFetcher {
    pub fn new(answers: &[(&str, Answer)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(url, answer)| (url.to_string(), answer.clone()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<(String, serde_json::Value)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for ScriptedFetcher {
    async fn fetch_document(&self, endpoint: &Endpoint, _did: &str) -> ResolverResult<DidDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(&endpoint.url) {
            Some(Answer::Doc(doc)) => Ok(DidDocument::new(doc.clone())),
            Some(Answer::Fail(reason)) => Err(ResolverError::Internal(reason.to_string())),
            Some(Answer::Hang) => futures::future::pending().await,
            None => Err(ResolverError::NotFound(endpoint.url.clone())),
        }
    }

    async fn create_document(
        &self,
        endpoint: &Endpoint,
        request: &serde_json::Value,
    ) -> ResolverResult<DidDocument> {
        self.created
            .lock()
            .unwrap()
            .push((endpoint.url.clone(), request.clone()));
        Ok(DidDocument::new(serde_json::json!({"id": "did:bloc:example.com:created"})))
    }
}

/// Discovery returning a fixed list, or failing
pub struct FixedDiscovery(pub Result<Vec<String>, &'static str>);

#[async_trait]
impl Discovery for FixedDiscovery {
    async fn get_endpoints(&self, domain: &str) -> ResolverResult<Vec<Endpoint>> {
        match &self.0 {
            Ok(urls) => Ok(urls.iter().map(|u| Endpoint::new(u.clone(), domain)).collect()),
            Err(reason) => Err(ResolverError::Internal(reason.to_string())),
        }
    }
}

/// Selection that keeps nothing
pub struct EmptySelection;

impl Selection for EmptySelection {
    fn select_endpoints(&self, _endpoints: Vec<Endpoint>) -> ResolverResult<Vec<Endpoint>> {
        Ok(Vec::new())
    }
}

/// Selection that always errors
pub struct BrokenSelection;

impl Selection for BrokenSelection {
    fn select_endpoints(&self, _endpoints: Vec<Endpoint>) -> ResolverResult<Vec<Endpoint>> {
        Err(ResolverError::Validation("policy unavailable".to_string()))
    }
}

pub fn urls(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|u| u.to_string()).collect()
}
