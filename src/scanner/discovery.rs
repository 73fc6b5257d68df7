//! Discovery pass
//!
//! Walks every scan root on blocking worker threads, resolves the candidates with a
//! bounded number of concurrent resolver processes and deduplicates the results
//! across all roots. The report is only returned once every worker has finished.
//!
//! A candidate whose resolver process fails to start or times out is not a miss.
//! The scan paths holding such candidates are reported as incomplete so that
//! reconciliation keeps what is already tracked below them.

use crate::command::error::CommandError;
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::resolver::RepoResolver;
use crate::scanner::types::{DiscoveryReport, RootSummary, ScanRoot};
use crate::scanner::walker::Scanner;
use futures::future::try_join_all;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Default number of concurrent resolver processes
pub const DEFAULT_JOBS: usize = 4;

pub struct Discovery {
    resolver: RepoResolver,
    jobs: usize,
}

/// Resolved repositories of one root before cross-root deduplication
struct RootResult {
    label: String,
    candidates: usize,
    resolved: BTreeSet<PathBuf>,
    /// Scan paths with at least one candidate that could not be resolved
    incomplete: Vec<PathBuf>,
    unresolved: usize,
    elapsed: Duration,
}

enum Resolution {
    Found(PathBuf),
    Miss,
    Failed(PathBuf, CommandError),
}

impl Discovery {
    pub fn new(resolver: RepoResolver, jobs: usize) -> Self {
        Self {
            resolver,
            jobs: jobs.max(1),
        }
    }

    pub async fn run(&self, roots: &[ScanRoot]) -> ScanResult<DiscoveryReport> {
        let started = Instant::now();
        let permits = Arc::new(Semaphore::new(self.jobs));

        let results = try_join_all(
            roots
                .iter()
                .map(|root| self.scan_root(root, Arc::clone(&permits))),
        )
        .await?;

        let mut seen = BTreeSet::new();
        let mut incomplete = BTreeSet::new();
        let mut summaries = Vec::with_capacity(results.len());
        for result in results {
            log::info!(
                "Found {} git repositories in {} in {:.1}s",
                result.resolved.len(),
                result.label,
                result.elapsed.as_secs_f64()
            );
            if result.unresolved > 0 {
                log::warn!(
                    "{} candidates in {} could not be resolved; keeping tracked repositories below {}",
                    result.unresolved,
                    result.label,
                    join_paths(&result.incomplete)
                );
            }

            summaries.push(RootSummary {
                label: result.label,
                candidates: result.candidates,
                repositories: result.resolved.len(),
                unresolved: result.unresolved,
                elapsed: result.elapsed,
            });
            seen.extend(result.resolved);
            incomplete.extend(result.incomplete);
        }

        log::info!(
            "Discovery found {} repositories in {:.1}s",
            seen.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(DiscoveryReport {
            repositories: seen.into_iter().collect(),
            roots: summaries,
            incomplete: incomplete.into_iter().collect(),
        })
    }

    async fn scan_root(&self, root: &ScanRoot, permits: Arc<Semaphore>) -> ScanResult<RootResult> {
        let started = Instant::now();
        let candidates = walk_root(root).await?;
        log::debug!("{} candidates in {}", candidates.len(), root.label);

        let resolutions: Vec<Resolution> = stream::iter(candidates.iter())
            .map(|candidate| {
                let permits = Arc::clone(&permits);
                async move {
                    // the semaphore is never closed
                    let _permit = permits.acquire().await.ok();
                    match self.resolver.resolve_top_level(candidate).await {
                        Ok(Some(top_level)) => Resolution::Found(top_level),
                        Ok(None) => Resolution::Miss,
                        Err(e) => Resolution::Failed(candidate.clone(), e),
                    }
                }
            })
            .buffer_unordered(self.jobs)
            .collect()
            .await;

        let mut resolved = BTreeSet::new();
        let mut failed = Vec::new();
        for resolution in resolutions {
            match resolution {
                Resolution::Found(top_level) => {
                    resolved.insert(top_level);
                }
                Resolution::Miss => {}
                Resolution::Failed(candidate, e) => {
                    log::warn!("could not resolve {}: {}", candidate.display(), e);
                    failed.push(candidate);
                }
            }
        }

        Ok(RootResult {
            label: root.label.clone(),
            candidates: candidates.len(),
            resolved,
            incomplete: incomplete_paths(root, &failed),
            unresolved: failed.len(),
            elapsed: started.elapsed(),
        })
    }
}

/// Scan paths of `root` holding any of `failed`, as configured and canonical
fn incomplete_paths(root: &ScanRoot, failed: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = BTreeSet::new();
    for path in &root.paths {
        if failed.iter().any(|candidate| candidate.starts_with(path)) {
            if let Ok(canonical) = std::fs::canonicalize(path) {
                paths.insert(canonical);
            }
            paths.insert(path.clone());
        }
    }
    paths.into_iter().collect()
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the walker for every path of `root` on a blocking thread
async fn walk_root(root: &ScanRoot) -> ScanResult<Vec<PathBuf>> {
    let scanner = Scanner::new(root.excludes.clone(), root.max_depth);
    let paths = root.paths.clone();
    tokio::task::spawn_blocking(move || {
        paths
            .iter()
            .flat_map(|path| scanner.scan(path).collect::<Vec<_>>())
            .collect()
    })
    .await
    .map_err(|e| ScanError::Worker {
        message: format!("walker for '{}' failed: {}", root.label, e),
    })
}
