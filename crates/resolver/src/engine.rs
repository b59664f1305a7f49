use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use storage::{Tx, begin_write};
use storage::dto::pick::DateKind;
use storage::models::{Pick, PickStatus};
use storage::repository::pick::{DeathRecord, LivingFacts, PickRepository};
use storage::services::picks::{authorize, owned_pick};
use storage::services::{first_blood, scoring};
use tracing::{info, warn};

use crate::error::{ResolveError, Result};
use crate::traits::{KnowledgeSource, SubjectFacts};

/// Pick state after a resolution or manual correction
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    #[serde(flatten)]
    pub pick: Pick,
    pub status: PickStatus,
    /// False when the stored facts already matched and nothing was written
    pub changed: bool,
}

impl Resolution {
    fn new(pick: Pick, changed: bool) -> Self {
        Self {
            status: pick.status(),
            pick,
            changed,
        }
    }
}

/// Drives every pick state transition: lookups against a knowledge source,
/// manual death marking and date corrections. Each transition writes the
/// pick and reconciles first blood in one transaction.
pub struct PickResolver<'a> {
    pool: &'a SqlitePool,
    source: &'a dyn KnowledgeSource,
}

impl<'a> PickResolver<'a> {
    pub fn new(pool: &'a SqlitePool, source: &'a dyn KnowledgeSource) -> Self {
        Self { pool, source }
    }

    pub fn pool(&self) -> &'a SqlitePool {
        self.pool
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Look up a pick's subject and record what the source knows.
    pub async fn resolve(&self, pick_id: i64, requester: Option<i64>) -> Result<Resolution> {
        let pick = owned_pick(self.pool, requester, pick_id).await?;
        self.resolve_pick(&pick).await
    }

    /// Same as [`resolve`](Self::resolve) without the ownership check.
    /// Used by batch resolution.
    pub(crate) async fn resolve_pick(&self, pick: &Pick) -> Result<Resolution> {
        // No transaction is held across the lookup.
        let facts = self
            .source
            .resolve_subject(&pick.subject_name)
            .await
            .inspect_err(|e| {
                warn!(
                    "{} lookup failed for '{}': {}",
                    self.source.name(),
                    pick.subject_name,
                    e
                )
            })?;

        self.apply_facts(pick.id, &facts).await
    }

    async fn apply_facts(&self, pick_id: i64, facts: &SubjectFacts) -> Result<Resolution> {
        let picks = PickRepository::new(self.pool);

        let mut tx = begin_write(self.pool).await?;
        let pick = picks.find_by_id_in(&mut tx, pick_id).await?;

        let changed = match facts.death_date {
            Some(death_date) => {
                let death_age = checked_age_at_death(facts.birth_date, death_date).map_err(|_| {
                    ResolveError::UpstreamNotFound(format!(
                        "{} (death date {} precedes birth date {})",
                        pick.subject_name, death_date, facts.birth_date
                    ))
                })?;
                let record = DeathRecord {
                    birth_date: Some(facts.birth_date),
                    death_date,
                    death_age,
                    points: scoring::score(death_age),
                    source_url: Some(&facts.source_url),
                    description: Some(&facts.short_description),
                };
                self.record_death(&mut tx, &pick, &record).await?
            }
            None => {
                let living = LivingFacts {
                    birth_date: facts.birth_date,
                    age: scoring::current_age(facts.birth_date),
                    source_url: Some(&facts.source_url),
                    description: Some(&facts.short_description),
                };
                picks.record_living(&mut tx, pick.id, &living).await?
            }
        };

        self.finish(tx, pick_id, changed).await
    }

    /// Record a death by hand. The age at death comes from the birth date,
    /// or from the stored age when the birth date was never resolved.
    pub async fn mark_death(
        &self,
        pick_id: i64,
        requester: Option<i64>,
        death_date: NaiveDate,
    ) -> Result<Resolution> {
        let mut tx = begin_write(self.pool).await?;
        let pick = self.owned_in(&mut tx, pick_id, requester).await?;

        let death_age = match (pick.birth_date, pick.age) {
            (Some(birth_date), _) => checked_age_at_death(birth_date, death_date)?,
            (None, Some(age)) => age,
            (None, None) => {
                return Err(ResolveError::InvalidInput(
                    "Resolve the pick's birth date before marking a death".to_string(),
                ));
            }
        };

        let record = DeathRecord {
            birth_date: None,
            death_date,
            death_age,
            points: scoring::score(death_age),
            source_url: None,
            description: None,
        };
        let changed = self.record_death(&mut tx, &pick, &record).await?;

        info!("Marked '{}' deceased on {}", pick.subject_name, death_date);
        self.finish(tx, pick_id, changed).await
    }

    /// Revert a pick to living and hand first blood on if it held it.
    pub async fn unmark_death(&self, pick_id: i64, requester: Option<i64>) -> Result<Resolution> {
        let picks = PickRepository::new(self.pool);

        let mut tx = begin_write(self.pool).await?;
        let pick = self.owned_in(&mut tx, pick_id, requester).await?;

        if !pick.is_deceased() {
            return self.finish(tx, pick_id, false).await;
        }

        let age = pick.birth_date.map(scoring::current_age);
        picks.clear_death(&mut tx, pick.id, age).await?;
        first_blood::reconcile(self.pool, &mut tx, pick.season_year).await?;

        info!("Unmarked death of '{}'", pick.subject_name);
        self.finish(tx, pick_id, true).await
    }

    /// Correct the birth or death date of a pick, recomputing everything
    /// derived from it.
    pub async fn update_date(
        &self,
        pick_id: i64,
        requester: Option<i64>,
        kind: DateKind,
        new_date: NaiveDate,
    ) -> Result<Resolution> {
        let picks = PickRepository::new(self.pool);

        let mut tx = begin_write(self.pool).await?;
        let pick = self.owned_in(&mut tx, pick_id, requester).await?;

        let changed = match (kind, pick.death_date) {
            (DateKind::Birth, Some(death_date)) => {
                let death_age = checked_age_at_death(new_date, death_date)?;
                let record = DeathRecord {
                    birth_date: Some(new_date),
                    death_date,
                    death_age,
                    points: scoring::score(death_age),
                    source_url: None,
                    description: None,
                };
                self.record_death(&mut tx, &pick, &record).await?
            }
            (DateKind::Birth, None) => {
                let living = LivingFacts {
                    birth_date: new_date,
                    age: scoring::current_age(new_date),
                    source_url: pick.source_url.as_deref(),
                    description: pick.description.as_deref(),
                };
                picks.record_living(&mut tx, pick.id, &living).await?
            }
            (DateKind::Death, _) => {
                let birth_date = pick.birth_date.ok_or_else(|| {
                    ResolveError::InvalidInput(
                        "Cannot set a death date without a birth date".to_string(),
                    )
                })?;
                let death_age = checked_age_at_death(birth_date, new_date)?;
                let record = DeathRecord {
                    birth_date: None,
                    death_date: new_date,
                    death_age,
                    points: scoring::score(death_age),
                    source_url: None,
                    description: None,
                };
                self.record_death(&mut tx, &pick, &record).await?
            }
        };

        info!("Updated {:?} date of '{}' to {}", kind, pick.subject_name, new_date);
        self.finish(tx, pick_id, changed).await
    }

    async fn owned_in(
        &self,
        tx: &mut Tx<'_>,
        pick_id: i64,
        requester: Option<i64>,
    ) -> Result<Pick> {
        let pick = PickRepository::new(self.pool)
            .find_by_id_in(tx, pick_id)
            .await?;
        authorize(requester, pick.participant_id)?;
        Ok(pick)
    }

    async fn record_death(
        &self,
        tx: &mut Tx<'_>,
        pick: &Pick,
        record: &DeathRecord<'_>,
    ) -> Result<bool> {
        let changed = PickRepository::new(self.pool)
            .record_death(tx, pick.id, record)
            .await?;
        first_blood::reconcile(self.pool, tx, pick.season_year).await?;
        Ok(changed)
    }

    async fn finish(&self, mut tx: Tx<'_>, pick_id: i64, changed: bool) -> Result<Resolution> {
        let pick = PickRepository::new(self.pool)
            .find_by_id_in(&mut tx, pick_id)
            .await?;
        tx.commit().await?;
        Ok(Resolution::new(pick, changed))
    }
}

fn checked_age_at_death(birth_date: NaiveDate, death_date: NaiveDate) -> Result<i32> {
    if death_date < birth_date {
        return Err(ResolveError::InvalidInput(format!(
            "Death date {} is before birth date {}",
            death_date, birth_date
        )));
    }
    Ok(scoring::age_at_death(birth_date, death_date))
}
