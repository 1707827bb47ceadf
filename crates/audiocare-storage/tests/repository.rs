use audiocare_audiometry::speech::{SpeechCondition, SpeechMetric};
use audiocare_core::ids::{CustomerId, VisitId};
use audiocare_core::models::ear::Ear;
use audiocare_core::models::frequency::{Frequency, Modality};
use audiocare_protocol::session::{HaSession, SessionMutation};
use audiocare_protocol::stage::Stage;
use audiocare_storage::repository::{MemoryStore, SessionRepository};
use jiff::Timestamp;
use jiff::civil::{Date, date};

fn t(secs: i64) -> Timestamp {
    Timestamp::from_second(secs).unwrap()
}

fn visit(customer: &str, visit: &str, day: Date, stage: Stage) -> HaSession {
    HaSession::create(
        CustomerId::from(customer),
        VisitId::from(visit),
        stage,
        Some(day),
        None,
        t(1_000),
    )
}

fn with_ac(session: HaSession, value: i32) -> HaSession {
    session.apply(
        SessionMutation::SetThreshold {
            ear: Ear::Right,
            modality: Modality::Ac,
            frequency: Frequency::Hz1000,
            value: Some(value),
        },
        t(2_000),
    )
}

fn with_srt(session: HaSession, value: i32) -> HaSession {
    session.apply(
        SessionMutation::SetSpeechValue {
            condition: SpeechCondition::Right,
            metric: SpeechMetric::Srt,
            value: Some(value),
        },
        t(2_000),
    )
}

#[test]
fn save_replaces_the_same_visit() {
    let mut store = MemoryStore::new();
    let first = visit("c-1", "v-1", date(2024, 1, 10), Stage::Ha1);
    store.save(&first).unwrap();
    store.save(&with_ac(first.clone(), 40)).unwrap();

    assert_eq!(store.len(), 1);
    let loaded = store
        .load(&CustomerId::from("c-1"), &VisitId::from("v-1"))
        .unwrap()
        .unwrap();
    assert!(loaded.results.pure_tone.is_some());
}

#[test]
fn listing_is_per_customer_and_oldest_first() {
    let mut store = MemoryStore::new();
    store.save(&visit("c-1", "late", date(2024, 3, 1), Stage::Ha2)).unwrap();
    store.save(&visit("c-1", "early", date(2024, 1, 1), Stage::Ha1)).unwrap();
    store.save(&visit("c-2", "other", date(2024, 2, 1), Stage::Ha1)).unwrap();

    let visits: Vec<String> = store
        .list_for_customer(&CustomerId::from("c-1"))
        .unwrap()
        .into_iter()
        .map(|s| s.visit_id.to_string())
        .collect();
    assert_eq!(visits, ["early", "late"]);
    assert_eq!(store.all().unwrap().len(), 3);
}

#[test]
fn delete_reports_whether_anything_was_removed() {
    let mut store = MemoryStore::new();
    store.save(&visit("c-1", "v-1", date(2024, 1, 1), Stage::Ha1)).unwrap();
    let customer = CustomerId::from("c-1");
    assert!(store.delete(&customer, &VisitId::from("v-1")).unwrap());
    assert!(!store.delete(&customer, &VisitId::from("v-1")).unwrap());
    assert!(store.is_empty());
}

#[test]
fn prior_results_come_from_the_latest_visit_with_data() {
    let mut store = MemoryStore::new();
    store
        .save(&with_srt(with_ac(visit("c-1", "a", date(2024, 1, 1), Stage::Ha1), 40), 35))
        .unwrap();
    store
        .save(&with_ac(visit("c-1", "b", date(2024, 2, 1), Stage::Ha2), 50))
        .unwrap();
    // Latest visit, but nothing recorded.
    store.save(&visit("c-1", "c", date(2024, 3, 1), Stage::Ha3)).unwrap();

    let prior = store
        .find_prior_results(&CustomerId::from("c-1"), &VisitId::from("new"))
        .unwrap()
        .unwrap();
    let pure_tone = prior.pure_tone.unwrap();
    assert_eq!(
        pure_tone.thresholds(Ear::Right, Modality::Ac).get(Frequency::Hz1000),
        Some(50)
    );
    // Speech is only on the first visit; it is still found.
    let speech = prior.speech.unwrap();
    assert_eq!(speech.value(SpeechCondition::Right, SpeechMetric::Srt), Some(35));
}

#[test]
fn prior_results_skip_the_current_visit_and_other_customers() {
    let mut store = MemoryStore::new();
    store
        .save(&with_ac(visit("c-1", "current", date(2024, 5, 1), Stage::Ha1), 60))
        .unwrap();
    store
        .save(&with_ac(visit("c-2", "x", date(2024, 4, 1), Stage::Ha1), 30))
        .unwrap();

    let prior = store
        .find_prior_results(&CustomerId::from("c-1"), &VisitId::from("current"))
        .unwrap();
    assert!(prior.is_none());
}
