//! In-memory sources for engine tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{DeploymentSource, RunSubmitter, StatusSource};
use crate::model::{Deployment, DeploymentLookup, RunAccepted, RunRequest, RunStatus};
use crate::{Error, Result};

/// A canned answer delivered after a delay
pub(crate) struct Scripted<T> {
    pub delay: Duration,
    pub result: Result<T>,
}

impl<T> Scripted<T> {
    pub fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(value),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(Error::Transport(message.to_string())),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

async fn play<T>(script: &Mutex<VecDeque<Scripted<T>>>, fallback: impl FnOnce() -> Result<T>) -> Result<T> {
    let next = script.lock().unwrap().pop_front();
    match next {
        Some(entry) => {
            tokio::time::sleep(entry.delay).await;
            entry.result
        }
        None => fallback(),
    }
}

/// Status source playing back a script, then repeating `fallback` (or failing)
#[derive(Default)]
pub(crate) struct FakeStatus {
    script: Mutex<VecDeque<Scripted<RunStatus>>>,
    fallback: Mutex<Option<RunStatus>>,
    calls: AtomicUsize,
}

impl FakeStatus {
    pub fn scripted(entries: Vec<Scripted<RunStatus>>) -> Self {
        Self {
            script: Mutex::new(entries.into()),
            ..Self::default()
        }
    }

    pub fn constant(status: RunStatus) -> Self {
        Self {
            fallback: Mutex::new(Some(status)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for FakeStatus {
    async fn fetch_status(&self) -> Result<RunStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fallback = self.fallback.lock().unwrap().clone();
        play(&self.script, || {
            fallback.ok_or_else(|| Error::Transport("connection refused".to_string()))
        })
        .await
    }
}

/// Deployment source playing back a script and recording its calls
#[derive(Default)]
pub(crate) struct FakeDeployments {
    script: Mutex<VecDeque<Scripted<DeploymentLookup>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeDeployments {
    pub fn scripted(entries: Vec<Scripted<DeploymentLookup>>) -> Self {
        Self {
            script: Mutex::new(entries.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeploymentSource for FakeDeployments {
    async fn lookup_deployment(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> Result<DeploymentLookup> {
        self.calls
            .lock()
            .unwrap()
            .push((repo_url.to_string(), token.map(str::to_string)));
        play(&self.script, || Ok(DeploymentLookup::NotFound)).await
    }
}

/// Submitter playing back a script and recording the requests it saw
#[derive(Default)]
pub(crate) struct FakeSubmitter {
    script: Mutex<VecDeque<Scripted<RunAccepted>>>,
    requests: Mutex<Vec<RunRequest>>,
}

impl FakeSubmitter {
    pub fn scripted(entries: Vec<Scripted<RunAccepted>>) -> Self {
        Self {
            script: Mutex::new(entries.into()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<RunRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunSubmitter for FakeSubmitter {
    async fn start_run(&self, request: &RunRequest) -> Result<RunAccepted> {
        self.requests.lock().unwrap().push(request.clone());
        play(&self.script, || {
            Ok(RunAccepted {
                message: "Autonomous Agent Started".to_string(),
            })
        })
        .await
    }
}

pub(crate) fn found(project: &str, logs: &[&str]) -> DeploymentLookup {
    DeploymentLookup::Found {
        deployment: Deployment {
            project_name: project.to_string(),
            state: "READY".to_string(),
        },
        logs: logs.iter().map(|l| l.to_string()).collect(),
    }
}

/// Let spawned tasks run and the paused clock move forward
pub(crate) async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}
