use std::collections::BTreeMap;

use audiocare_audiometry::pure_tone::PureTone;
use audiocare_audiometry::speech::Speech;
use audiocare_core::ids::{CustomerId, VisitId};
use audiocare_protocol::session::{HaSession, PriorResults};

use crate::error::StorageError;

/// Where sessions are kept. Writes replace whatever is stored under the
/// same `(customer, visit)`; there is no conflict detection.
pub trait SessionRepository {
    fn load(&self, customer: &CustomerId, visit: &VisitId) -> Result<Option<HaSession>, StorageError>;

    fn save(&mut self, session: &HaSession) -> Result<(), StorageError>;

    /// Returns whether a session was removed.
    fn delete(&mut self, customer: &CustomerId, visit: &VisitId) -> Result<bool, StorageError>;

    /// Sessions of one customer, oldest visit first.
    fn list_for_customer(&self, customer: &CustomerId) -> Result<Vec<HaSession>, StorageError>;

    fn all(&self) -> Result<Vec<HaSession>, StorageError>;

    /// Remove every session.
    fn clear(&mut self) -> Result<(), StorageError>;

    /// The most recent pure-tone and speech results from the customer's other
    /// visits, for seeding a new session. Each is taken from the latest visit
    /// that has data of that kind.
    fn find_prior_results(
        &self,
        customer: &CustomerId,
        excluding: &VisitId,
    ) -> Result<Option<PriorResults>, StorageError> {
        let mut sessions: Vec<HaSession> = self
            .list_for_customer(customer)?
            .into_iter()
            .filter(|s| &s.visit_id != excluding)
            .collect();
        sort_by_visit(&mut sessions);

        let pure_tone = sessions
            .iter()
            .rev()
            .find_map(|s| s.results.pure_tone.clone().filter(PureTone::has_data));
        let speech = sessions
            .iter()
            .rev()
            .find_map(|s| s.results.speech.clone().filter(Speech::has_data));

        if pure_tone.is_none() && speech.is_none() {
            return Ok(None);
        }
        Ok(Some(PriorResults { pure_tone, speech }))
    }
}

/// Order sessions oldest visit first. Undated visits sort before dated ones.
pub(crate) fn sort_by_visit(sessions: &mut [HaSession]) {
    sessions.sort_by(|a, b| {
        (a.visit_date, a.updated_at, &a.visit_id).cmp(&(b.visit_date, b.updated_at, &b.visit_id))
    });
}

/// Sessions held in memory, for tests and short-lived tools.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    sessions: BTreeMap<(CustomerId, VisitId), HaSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionRepository for MemoryStore {
    fn load(&self, customer: &CustomerId, visit: &VisitId) -> Result<Option<HaSession>, StorageError> {
        Ok(self
            .sessions
            .get(&(customer.clone(), visit.clone()))
            .cloned())
    }

    fn save(&mut self, session: &HaSession) -> Result<(), StorageError> {
        self.sessions.insert(
            (session.customer_id.clone(), session.visit_id.clone()),
            session.clone(),
        );
        Ok(())
    }

    fn delete(&mut self, customer: &CustomerId, visit: &VisitId) -> Result<bool, StorageError> {
        Ok(self
            .sessions
            .remove(&(customer.clone(), visit.clone()))
            .is_some())
    }

    fn list_for_customer(&self, customer: &CustomerId) -> Result<Vec<HaSession>, StorageError> {
        let mut sessions: Vec<HaSession> = self
            .sessions
            .iter()
            .filter(|((c, _), _)| c == customer)
            .map(|(_, s)| s.clone())
            .collect();
        sort_by_visit(&mut sessions);
        Ok(sessions)
    }

    fn all(&self) -> Result<Vec<HaSession>, StorageError> {
        Ok(self.sessions.values().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.sessions.clear();
        Ok(())
    }
}
