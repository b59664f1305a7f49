use std::time::Duration;

use serde::Serialize;
use storage::models::PickStatus;
use storage::repository::pick::PickRepository;
use tracing::{info, warn};

use crate::engine::PickResolver;
use crate::error::{ResolveError, Result};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Tally of one batch run over a season's unresolved picks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub living: usize,
    pub deceased: usize,
    pub not_found: usize,
    /// Lookups that failed transiently; they stay unresolved for the next run
    pub failed: usize,
}

/// Resolve every unresolved pick of a season, one lookup at a time with
/// `delay` between lookups to stay polite to the knowledge source.
///
/// A subject that cannot be found or a flaky upstream never aborts the run.
/// Storage failures do.
pub async fn resolve_unresolved(
    resolver: &PickResolver<'_>,
    season_year: i32,
    delay: Duration,
) -> Result<BatchReport> {
    let pending = PickRepository::new(resolver.pool())
        .list_unresolved(season_year)
        .await?;

    let mut report = BatchReport {
        total: pending.len(),
        ..Default::default()
    };
    info!(
        "Resolving {} pick(s) for season {} via {}",
        report.total,
        season_year,
        resolver.source_name()
    );

    for (i, pick) in pending.iter().enumerate() {
        info!("[{}/{}] Looking up: {}", i + 1, report.total, pick.subject_name);

        match resolver.resolve_pick(pick).await {
            Ok(resolution) => match resolution.status {
                PickStatus::Deceased => report.deceased += 1,
                _ => report.living += 1,
            },
            Err(ResolveError::UpstreamNotFound(_)) => report.not_found += 1,
            Err(ResolveError::UpstreamUnavailable(_)) => report.failed += 1,
            // Deleted while the batch was running
            Err(ResolveError::NotFound) => {
                warn!("Pick {} disappeared during the batch", pick.id);
                report.failed += 1;
            }
            Err(e) => return Err(e),
        }

        if i + 1 < report.total && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    info!(
        "Season {} batch done: {} living, {} deceased, {} not found, {} failed",
        season_year, report.living, report.deceased, report.not_found, report.failed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{Scripted, ScriptedSource, date, facts, setup};
    use storage::services::picks::add_pick;

    #[tokio::test]
    async fn test_batch_survives_failures() {
        let (db, jim, drew) = setup().await;
        let source = ScriptedSource::default()
            .with("Alive", facts(date(1950, 1, 1), None))
            .with("Dead", facts(date(1930, 1, 1), Some(date(2024, 3, 3))))
            .with("Flaky", Scripted::Down)
            .with("Ghost", Scripted::Missing);
        let resolver = PickResolver::new(db.pool(), &source);

        for name in ["Alive", "Flaky", "Ghost"] {
            add_pick(db.pool(), Some(jim), jim, name, 2024).await.unwrap();
        }
        add_pick(db.pool(), Some(drew), drew, "Dead", 2024).await.unwrap();

        let report = resolve_unresolved(&resolver, 2024, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(
            report,
            BatchReport {
                total: 4,
                living: 1,
                deceased: 1,
                not_found: 1,
                failed: 1,
            }
        );

        let left: Vec<String> = PickRepository::new(db.pool())
            .list_unresolved(2024)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.subject_name)
            .collect();
        assert_eq!(left, vec!["Flaky", "Ghost"]);
    }

    #[tokio::test]
    async fn test_resolved_picks_are_skipped() {
        let (db, jim, _) = setup().await;
        let source = ScriptedSource::default().with("Alive", facts(date(1950, 1, 1), None));
        let resolver = PickResolver::new(db.pool(), &source);
        add_pick(db.pool(), Some(jim), jim, "Alive", 2024).await.unwrap();

        resolve_unresolved(&resolver, 2024, Duration::ZERO).await.unwrap();
        let second = resolve_unresolved(&resolver, 2024, Duration::ZERO).await.unwrap();

        assert_eq!(second, BatchReport::default());
        assert_eq!(source.calls(), 1);
    }
}
