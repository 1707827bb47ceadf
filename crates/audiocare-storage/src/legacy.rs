//! Decoding of stored session records, including records written by earlier
//! versions of the clinic app.
//!
//! Older records differ from the current shape in a handful of ways:
//!
//! - the results sheet is called `results_detailed`;
//! - checklist notes are plain strings, optionally prefixed with a `[tag]`;
//! - speech values are arrays of trials (the first trial is kept);
//! - word-recognition notes live under `speech.wrs.notes`;
//! - no-response flags share one `right`/`left` set for AC and BC;
//! - sub-checklists sit at the top of the results sheet, with the otoscopy
//!   and tympanometry sheets nested under `middle_ear`;
//! - stored averages may be fractional and are recomputed anyway;
//! - satisfaction and COSI ratings may be fractional or out of range.
//!
//! Records are rewritten into the current shape as raw JSON, nulls are
//! dropped so every field falls back to its default, and the result is then
//! deserialized and re-derived.

use audiocare_audiometry::clinical::round_half_up;
use audiocare_core::models::frequency::Frequency;
use audiocare_protocol::checklist::{ItemNote, NoteTag};
use audiocare_protocol::session::{HaSession, MAX_SATISFACTION};
use serde_json::{Map, Value, json};

use crate::error::StorageError;

/// Top-level sub-checklist keys of older records and where they now live.
const FLAT_SUB_CHECKLISTS: [(&str, &str); 15] = [
    ("devicePlanChecklist", "device_plan"),
    ("expectationChecklist", "expectation"),
    ("listeningCheckChecklist", "listening_check"),
    ("eaaChecklist", "eaa"),
    ("fitComfortChecklist", "fit_comfort"),
    ("programmingChecklist", "programming"),
    ("remChecklist", "rem"),
    ("mpoChecklist", "mpo"),
    ("orientationCoreChecklist", "orientation_core"),
    ("adaptationScheduleChecklist", "adaptation_schedule"),
    ("commStrategiesChecklist", "comm_strategies"),
    ("deepCleaningChecklist", "deep_cleaning"),
    ("educationRefreshChecklist", "education_refresh"),
    ("dataloggingAdjChecklist", "datalogging_adjustment"),
    ("fineTuningChecklist", "fine_tuning"),
];

const THRESHOLD_TABLES: [&str; 3] = ["ac_dbhl", "bc_dbhl", "sf_dbhl"];

const SPEECH_METRICS: [&str; 3] = ["srt_dbhl", "mcl_dbhl", "ucl_dbhl"];

pub fn decode_session(bytes: &[u8]) -> Result<HaSession, StorageError> {
    let value: Value = serde_json::from_slice(bytes)?;
    decode_session_value(value)
}

pub fn decode_session_value(mut value: Value) -> Result<HaSession, StorageError> {
    let Some(record) = value.as_object_mut() else {
        return Err(StorageError::Malformed(
            "session record is not a JSON object".to_string(),
        ));
    };
    normalize_record(record);
    strip_nulls(&mut value);

    let mut session: HaSession = serde_json::from_value(value)?;
    session.rederive();
    Ok(session)
}

/// Split a stored note into its tag and text. Only `[tag]` prefixes naming a
/// known tag are recognized; anything else stays in the text.
pub fn parse_legacy_note(raw: &str) -> ItemNote {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix('[')
        && let Some((tag, text)) = rest.split_once(']')
        && let Some(tag) = NoteTag::parse(tag)
    {
        return ItemNote::tagged(tag, text.trim());
    }
    ItemNote::text(trimmed)
}

fn normalize_record(record: &mut Map<String, Value>) {
    if let Some(results) = record.remove("results_detailed") {
        record.entry("results").or_insert(results);
    }
    if let Some(date) = record.get_mut("visit_date") {
        normalize_date(date);
    }
    if let Some(Value::Object(checklist)) = record.get_mut("checklist") {
        for entry in checklist.values_mut() {
            normalize_checklist_entry(entry);
        }
    }
    if let Some(Value::Object(results)) = record.get_mut("results") {
        normalize_results(results);
    }
    if let Some(Value::Object(validation)) = record.get_mut("validation") {
        normalize_validation(validation);
    }
}

fn normalize_validation(validation: &mut Map<String, Value>) {
    if let Some(score) = validation.get_mut("satisfaction_0to10") {
        *score = match whole_db(score).as_i64() {
            Some(n) => json!(n.clamp(0, i64::from(MAX_SATISFACTION))),
            None => Value::Null,
        };
    }
    if let Some(Value::Object(review)) = validation.get_mut("cosi_top3_review") {
        for field in ["improvement_1", "improvement_2", "improvement_3"] {
            if let Some(value) = review.get_mut(field) {
                *value = whole_db(value);
            }
        }
    }
}

fn normalize_checklist_entry(entry: &mut Value) {
    let Some(entry) = entry.as_object_mut() else {
        return;
    };
    if let Some(note) = entry.get_mut("note")
        && let Some(parsed) = note.as_str().map(parse_legacy_note)
    {
        *note = json!({
            "tag": parsed.tag.map(NoteTag::as_str),
            "text": parsed.text,
        });
    }
}

fn normalize_results(results: &mut Map<String, Value>) {
    if let Some(Value::Object(pure_tone)) = results.get_mut("pure_tone") {
        normalize_pure_tone(pure_tone);
    }
    if let Some(Value::Object(speech)) = results.get_mut("speech") {
        normalize_speech(speech);
    }
    if let Some(Value::Object(sound_field)) = results.get_mut("sound_field")
        && let Some(Value::Object(pair)) = sound_field.get_mut("aided_thresholds")
    {
        for table in pair.values_mut() {
            normalize_threshold_table(table);
        }
    }

    let mut moved = Map::new();
    if let Some(Value::Object(middle_ear)) = results.get_mut("middle_ear") {
        if let Some(pair) = take_ear_checklists(middle_ear.get_mut("otoscopy")) {
            moved.insert("otoscopy".to_string(), pair);
        }
        if let Some(pair) = take_ear_checklists(middle_ear.get_mut("tympanometry")) {
            moved.insert("tympanometry".to_string(), pair);
        }
    }
    for (legacy, current) in FLAT_SUB_CHECKLISTS {
        if let Some(sheet) = results.remove(legacy) {
            moved.insert(current.to_string(), sheet);
        }
    }
    if moved.is_empty() {
        return;
    }

    let sub_checklists = results
        .entry("sub_checklists")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(sub_checklists) = sub_checklists.as_object_mut() {
        for (key, sheet) in moved {
            sub_checklists.entry(key).or_insert(sheet);
        }
    }
}

fn take_ear_checklists(section: Option<&mut Value>) -> Option<Value> {
    let section = section?.as_object_mut()?;
    let right = section.remove("checklistRight");
    let left = section.remove("checklistLeft");
    if right.is_none() && left.is_none() {
        return None;
    }
    let mut pair = Map::new();
    if let Some(right) = right {
        pair.insert("right".to_string(), right);
    }
    if let Some(left) = left {
        pair.insert("left".to_string(), left);
    }
    Some(Value::Object(pair))
}

fn normalize_pure_tone(pure_tone: &mut Map<String, Value>) {
    pure_tone.remove("derived");
    if let Some(date) = pure_tone.get_mut("test_date") {
        normalize_date(date);
    }
    for table in THRESHOLD_TABLES {
        if let Some(Value::Object(pair)) = pure_tone.get_mut(table) {
            for ear in pair.values_mut() {
                normalize_threshold_table(ear);
            }
        }
    }
    if let Some(Value::Object(nr)) = pure_tone.get_mut("nr") {
        normalize_no_response(nr);
    }
}

/// Keep only known frequencies, keyed by their canonical label, with whole
/// dB values.
fn normalize_threshold_table(table: &mut Value) {
    let Some(entries) = table.as_object() else {
        *table = Value::Object(Map::new());
        return;
    };
    let normalized: Map<String, Value> = entries
        .iter()
        .filter_map(|(key, value)| {
            Frequency::from_label(key).map(|f| (f.label().to_string(), whole_db(value)))
        })
        .collect();
    *table = Value::Object(normalized);
}

fn normalize_no_response(nr: &mut Map<String, Value>) {
    for (shared, targets) in [
        ("right", ["ac_right", "bc_right"]),
        ("left", ["ac_left", "bc_left"]),
    ] {
        if let Some(set) = nr.remove(shared) {
            for target in targets {
                nr.entry(target).or_insert_with(|| set.clone());
            }
        }
    }
    for set in nr.values_mut() {
        let frequencies: Vec<Value> = set
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(frequency_of)
                    .map(|f| Value::String(f.label().to_string()))
                    .collect()
            })
            .unwrap_or_default();
        *set = Value::Array(frequencies);
    }
}

fn normalize_speech(speech: &mut Map<String, Value>) {
    for metric in SPEECH_METRICS {
        if let Some(Value::Object(conditions)) = speech.get_mut(metric) {
            for value in conditions.values_mut() {
                *value = whole_db(first_trial(value));
            }
        }
    }

    let mut wrs_notes = None;
    if let Some(Value::Object(wrs)) = speech.get_mut("wrs") {
        wrs_notes = wrs.remove("notes").filter(|n| !n.is_null());
        for entry in wrs.values_mut() {
            if let Some(fields) = entry.as_object_mut() {
                for field in ["score_percent", "level_dbhl"] {
                    if let Some(value) = fields.get_mut(field) {
                        *value = whole_db(first_trial(value));
                    }
                }
            }
            if entry.as_object().is_some_and(|f| f.values().all(Value::is_null)) {
                *entry = Value::Null;
            }
        }
    }
    if let Some(notes) = wrs_notes {
        let slot = speech.entry("notes").or_insert(Value::Null);
        if slot.is_null() {
            *slot = notes;
        }
    }
}

fn normalize_date(value: &mut Value) {
    let normalized = match value.as_str().map(str::trim) {
        Some("") => Value::Null,
        Some(s) => Value::String(s.get(..10).unwrap_or(s).to_string()),
        None => return,
    };
    *value = normalized;
}

fn first_trial(value: &Value) -> &Value {
    match value {
        Value::Array(trials) => trials.first().unwrap_or(&Value::Null),
        other => other,
    }
}

/// A decibel or percent value as a whole number; anything unreadable is
/// treated as untested.
fn whole_db(value: &Value) -> Value {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => json!(round_half_up(n)),
        _ => Value::Null,
    }
}

fn frequency_of(value: &Value) -> Option<Frequency> {
    match value {
        Value::String(s) => Frequency::from_label(s),
        Value::Number(n) => n
            .as_u64()
            .and_then(|hz| u32::try_from(hz).ok())
            .and_then(Frequency::from_hz),
        _ => None,
    }
}

/// Drop `null` object members recursively so defaults apply.
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}
