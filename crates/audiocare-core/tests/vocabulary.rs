use std::collections::BTreeMap;

use audiocare_core::ids::{CustomerId, VisitId};
use audiocare_core::keys;
use audiocare_core::models::ear::{Ear, EarPair};
use audiocare_core::models::frequency::{Frequency, Modality};
use audiocare_core::models::tri_state;

#[test]
fn frequency_labels_parse_and_reject_unknown() {
    assert_eq!(Frequency::from_label("1000"), Some(Frequency::Hz1000));
    assert_eq!(Frequency::from_label(" 8000 "), Some(Frequency::Hz8000));
    assert_eq!(Frequency::from_label("1200"), None);
    assert_eq!(Frequency::from_label("abc"), None);
    assert!("900".parse::<Frequency>().is_err());
}

#[test]
fn frequency_map_serializes_with_hz_keys_in_order() {
    let mut map = BTreeMap::new();
    map.insert(Frequency::Hz4000, Some(35));
    map.insert(Frequency::Hz500, Some(20));
    map.insert(Frequency::Hz1000, None::<i32>);

    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"500":20,"1000":null,"4000":35}"#);

    let back: BTreeMap<Frequency, Option<i32>> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, map);
}

#[test]
fn bone_and_sound_field_cover_only_mid_frequencies() {
    assert!(Modality::Ac.supports(Frequency::Hz125));
    assert!(Modality::Ac.supports(Frequency::Hz8000));
    for modality in [Modality::Bc, Modality::Sf] {
        assert!(!modality.supports(Frequency::Hz125));
        assert!(!modality.supports(Frequency::Hz6000));
        assert!(!modality.supports(Frequency::Hz8000));
        assert!(modality.supports(Frequency::Hz250));
        assert!(modality.supports(Frequency::Hz4000));
    }
}

#[test]
fn tri_state_cycle_returns_to_null_after_three_steps() {
    let first = tri_state::cycle(None);
    let second = tri_state::cycle(first);
    let third = tri_state::cycle(second);
    assert_eq!(first, Some(true));
    assert_eq!(second, Some(false));
    assert_eq!(third, None);
}

#[test]
fn session_key_round_trips() {
    let customer = CustomerId::from("c-17");
    let visit = VisitId::from("v-3");
    let key = keys::session(&customer, &visit);
    assert_eq!(key, "sessions/c-17/v-3.json");
    assert_eq!(keys::parse_session(&key), Some((customer, visit)));
    assert_eq!(keys::parse_session("backups/x.json"), None);
    assert_eq!(keys::parse_session("sessions/c-17/nested/v.json"), None);
}

#[test]
fn ids_with_path_separators_are_rejected() {
    assert!(VisitId::from("abc").validate().is_ok());
    assert!(VisitId::generate().validate().is_ok());
    assert!(VisitId::from("../etc").validate().is_err());
    assert!(CustomerId::from("").validate().is_err());
    assert!(CustomerId::from("..").validate().is_err());
}

#[test]
fn ear_pair_addresses_each_side() {
    let mut pair = EarPair::new(1, 2);
    *pair.get_mut(Ear::Left) += 10;
    assert_eq!(*pair.get(Ear::Right), 1);
    assert_eq!(*pair.get(Ear::Left), 12);
    assert_eq!(Ear::Right.other(), Ear::Left);
    let doubled = pair.map(|_, v| v * 2);
    assert_eq!(doubled, EarPair::new(2, 24));
}
