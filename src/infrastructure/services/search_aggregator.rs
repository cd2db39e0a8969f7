//! Concurrent multi-criteria restaurant search

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveTime;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinError};
use tracing::{debug, error};

use crate::domain::discovery::{ProximityQuery, SearchCriterion};
use crate::domain::restaurant::{Restaurant, RestaurantId, RestaurantRepository};
use crate::domain::DomainError;

type BranchOutcome = Result<Result<Vec<Restaurant>, DomainError>, JoinError>;

/// Fans a search out into one task per criterion and merges the results.
///
/// Tasks run on the injected runtime. The merged list follows criterion rank,
/// never completion order, and holds each restaurant once at the position of
/// its first occurrence.
#[derive(Debug, Clone)]
pub struct SearchAggregator {
    repository: Arc<dyn RestaurantRepository>,
    runtime: Handle,
}

/// Aborts every branch still running when dropped
struct Branches(Vec<AbortHandle>);

impl Branches {
    fn abort_all(&self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

impl Drop for Branches {
    fn drop(&mut self) {
        self.abort_all();
    }
}

impl SearchAggregator {
    pub fn new(repository: Arc<dyn RestaurantRepository>, runtime: Handle) -> Self {
        Self {
            repository,
            runtime,
        }
    }

    /// Runs every criterion concurrently, keeping only open restaurants in range.
    ///
    /// Fails with [`DomainError::Aggregation`] as soon as any branch fails;
    /// the remaining branches are aborted and no partial result is returned.
    /// When several branches have already failed by then, the best-ranked
    /// criterion is reported. Dropping the future aborts all branches too.
    pub async fn search(
        &self,
        criteria: &[SearchCriterion],
        latitude: f64,
        longitude: f64,
        time: NaiveTime,
        radius_km: f64,
    ) -> Result<Vec<Restaurant>, DomainError> {
        let criteria = SearchCriterion::normalize(criteria);

        if criteria.is_empty() {
            return Ok(Vec::new());
        }

        let proximity = ProximityQuery::new(latitude, longitude, time, radius_km);

        debug!(criteria = criteria.len(), radius_km, "Spawning search branches");

        let mut abort_handles = Vec::with_capacity(criteria.len());
        let mut joined = FuturesUnordered::new();

        for (rank, criterion) in criteria.into_iter().enumerate() {
            let repository = self.repository.clone();
            let branch = criterion.clone();

            let handle = self.runtime.spawn(async move {
                let found = fetch(repository.as_ref(), &branch).await?;
                Ok::<_, DomainError>(proximity.retain(found))
            });

            abort_handles.push(handle.abort_handle());
            joined.push(async move { (rank, criterion, handle.await) });
        }

        let branches = Branches(abort_handles);
        let mut results: Vec<Option<Vec<Restaurant>>> = vec![None; branches.0.len()];
        let mut failure: Option<(usize, DomainError)> = None;

        while let Some((rank, criterion, outcome)) = joined.next().await {
            match branch_result(&criterion, outcome) {
                Ok(found) => results[rank] = Some(found),
                Err(e) => {
                    failure = Some((rank, e));
                    break;
                }
            }
        }

        let Some((mut rank, mut error)) = failure else {
            return Ok(merge(results.into_iter().flatten().collect()));
        };

        branches.abort_all();

        // Failures that landed alongside the first one are ordered by rank
        while let Some(Some((other, criterion, outcome))) = joined.next().now_or_never() {
            if other > rank || matches!(&outcome, Err(e) if e.is_cancelled()) {
                continue;
            }
            if let Err(e) = branch_result(&criterion, outcome) {
                rank = other;
                error = e;
            }
        }

        error!(error = %error, "Restaurant search failed");
        Err(error)
    }
}

fn branch_result(
    criterion: &SearchCriterion,
    outcome: BranchOutcome,
) -> Result<Vec<Restaurant>, DomainError> {
    match outcome {
        Ok(Ok(found)) => Ok(found),
        Ok(Err(e)) => Err(DomainError::aggregation(criterion.to_string(), e.to_string())),
        Err(e) => Err(DomainError::aggregation(
            criterion.to_string(),
            format!("search task failed: {}", e),
        )),
    }
}

async fn fetch(
    repository: &dyn RestaurantRepository,
    criterion: &SearchCriterion,
) -> Result<Vec<Restaurant>, DomainError> {
    let query = criterion.query();

    match criterion {
        SearchCriterion::ExactName(_) => Ok(repository
            .find_by_name_exact(query)
            .await?
            .unwrap_or_default()),
        SearchCriterion::PartialName(_) => repository.find_by_name_partial(query).await,
        SearchCriterion::Attribute(_) => repository.find_by_attributes(query).await,
        SearchCriterion::ItemName(_) => repository.find_by_item_name(query).await,
        SearchCriterion::ItemAttribute(_) => repository.find_by_item_attributes(query).await,
    }
}

/// Concatenates in order, keeping the first occurrence of each restaurant
fn merge(results: Vec<Vec<Restaurant>>) -> Vec<Restaurant> {
    let mut seen: HashSet<RestaurantId> = HashSet::new();

    results
        .into_iter()
        .flatten()
        .filter(|restaurant| seen.insert(restaurant.id().clone()))
        .collect()
}
