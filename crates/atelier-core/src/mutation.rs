//! Collection transforms for create, update, delete, duplicate and favorite.
//!
//! Each function takes the current collection and returns the whole next
//! collection plus the affected record. Nothing here touches the store; the
//! caller persists the returned collection in one write. On error the input
//! collection is left as it was.

use crate::error::{StudioError, StudioResult};
use crate::record::{new_record_id, FormInput, FromForm, Record, COPY_SUFFIX};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Fields a patch may never change.
pub const IMMUTABLE_FIELDS: [&str; 2] = ["id", "createdAt"];

/// Next collection and the record the operation produced or removed.
pub type Mutated<R> = (Vec<R>, R);

/// Builds a record from the form with a fresh id and the current time, and appends it.
pub fn create<R: FromForm>(records: &[R], form: &FormInput) -> StudioResult<Mutated<R>> {
    create_with(records, form, new_record_id(), Utc::now())
}

/// [`create`] with a caller-chosen id and timestamp.
pub fn create_with<R: FromForm>(
    records: &[R],
    form: &FormInput,
    id: String,
    created_at: DateTime<Utc>,
) -> StudioResult<Mutated<R>> {
    if id.trim().is_empty() {
        return Err(StudioError::invalid("record id must not be empty"));
    }
    if records.iter().any(|r| r.id() == id) {
        return Err(StudioError::invalid(format!(
            "{} id '{}' already exists",
            R::KIND,
            id
        )));
    }
    let mut record = R::from_form(id, created_at, form)?;
    record.normalize();
    tracing::debug!(
        target: "atelier::mutation",
        kind = %R::KIND,
        id = record.id(),
        action = "CREATE",
        "created {} '{}'",
        R::KIND,
        record.title()
    );
    let mut next = records.to_vec();
    next.push(record.clone());
    Ok((next, record))
}

/// Shallow-merges `patch` into the record with `id`. Keys not in the patch keep
/// their values. Out-of-set enum labels, wrong field types and an emptied
/// title are rejected.
pub fn update<R: Record>(
    records: &[R],
    id: &str,
    patch: &Map<String, Value>,
) -> StudioResult<Mutated<R>> {
    let index = position(records, id)?;
    let mut merged = object_of(&records[index])?;
    for (key, value) in patch {
        if IMMUTABLE_FIELDS.contains(&key.as_str()) {
            if merged.get(key) != Some(value) {
                return Err(StudioError::invalid(format!("'{}' cannot be changed", key)));
            }
            continue;
        }
        merged.insert(key.clone(), value.clone());
    }

    let mut updated: R = serde_json::from_value(Value::Object(merged))
        .map_err(|e| StudioError::invalid(format!("invalid {} patch: {}", R::KIND, e)))?;
    if updated.title().trim().is_empty() {
        return Err(StudioError::invalid(format!("{} title/name is required", R::KIND)));
    }
    updated.normalize();

    tracing::debug!(
        target: "atelier::mutation",
        kind = %R::KIND,
        id = id,
        fields = patch.len(),
        action = "UPDATE",
        "updated {} '{}'",
        R::KIND,
        updated.title()
    );
    let mut next = records.to_vec();
    next[index] = updated.clone();
    Ok((next, updated))
}

/// Applies submitted form fields to the record with `id`. Each field is coerced
/// exactly as [`create`] coerces it, and only the fields present in the form
/// change. Unknown field names, identity changes and an emptied title are
/// rejected.
pub fn update_form<R: FromForm>(
    records: &[R],
    id: &str,
    form: &FormInput,
) -> StudioResult<Mutated<R>> {
    let index = position(records, id)?;
    let current = &records[index];

    let mut seed = form.clone();
    if !seed.has(R::TITLE_FIELD) {
        seed.set(R::TITLE_FIELD, current.title());
    }
    let coerced = object_of(&R::from_form(
        current.id().to_string(),
        current.created_at(),
        &seed,
    )?)?;

    let mut merged = object_of(current)?;
    for key in form.keys() {
        if IMMUTABLE_FIELDS.iter().any(|f| *f == key) {
            if merged.get(key).and_then(Value::as_str) != form.get(key).map(str::trim) {
                return Err(StudioError::invalid(format!("'{}' cannot be changed", key)));
            }
            continue;
        }
        let value = coerced
            .get(key)
            .ok_or_else(|| StudioError::invalid(format!("'{}' is not a {} field", key, R::KIND)))?;
        merged.insert(key.to_string(), value.clone());
    }

    let mut updated: R = serde_json::from_value(Value::Object(merged))?;
    updated.normalize();

    tracing::debug!(
        target: "atelier::mutation",
        kind = %R::KIND,
        id = id,
        fields = form.keys().count(),
        action = "UPDATE",
        "updated {} '{}' from form",
        R::KIND,
        updated.title()
    );
    let mut next = records.to_vec();
    next[index] = updated.clone();
    Ok((next, updated))
}

/// Removes the record with `id`. Dependent collections are handled by
/// [`crate::cascade`], never here.
pub fn delete<R: Record>(records: &[R], id: &str) -> StudioResult<Mutated<R>> {
    let index = position(records, id)?;
    let mut next = records.to_vec();
    let removed = next.remove(index);
    tracing::debug!(
        target: "atelier::mutation",
        kind = %R::KIND,
        id = id,
        action = "DELETE",
        "deleted {} '{}'",
        R::KIND,
        removed.title()
    );
    Ok((next, removed))
}

/// Copies a record with a fresh id and timestamp, a " (Copy)" title and
/// progress fields reset. The copy is placed right after its source.
pub fn duplicate<R: Record>(records: &[R], id: &str) -> StudioResult<Mutated<R>> {
    duplicate_with(records, id, new_record_id(), Utc::now())
}

/// [`duplicate`] with a caller-chosen id and timestamp.
pub fn duplicate_with<R: Record>(
    records: &[R],
    id: &str,
    new_id: String,
    created_at: DateTime<Utc>,
) -> StudioResult<Mutated<R>> {
    let index = position(records, id)?;
    if records.iter().any(|r| r.id() == new_id) {
        return Err(StudioError::invalid(format!(
            "{} id '{}' already exists",
            R::KIND,
            new_id
        )));
    }
    let mut copy = records[index].clone();
    copy.reassign(new_id, created_at);
    copy.set_title(format!("{}{}", records[index].title(), COPY_SUFFIX));
    copy.reset_progress();
    copy.normalize();

    tracing::debug!(
        target: "atelier::mutation",
        kind = %R::KIND,
        source = id,
        id = copy.id(),
        action = "DUPLICATE",
        "duplicated {} '{}'",
        R::KIND,
        records[index].title()
    );
    let mut next = records.to_vec();
    next.insert(index + 1, copy.clone());
    Ok((next, copy))
}

/// Flips the favorite flag. Collections without one reject the call.
pub fn toggle_favorite<R: Record>(records: &[R], id: &str) -> StudioResult<Mutated<R>> {
    if !R::PINNABLE {
        return Err(StudioError::invalid(format!("{} records cannot be favorited", R::KIND)));
    }
    let index = position(records, id)?;
    let mut next = records.to_vec();
    let pinned = !next[index].favorited();
    next[index].set_favorited(pinned);
    let record = next[index].clone();
    Ok((next, record))
}

fn object_of<R: Record>(record: &R) -> StudioResult<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(StudioError::invalid(format!("{} is not an object", R::KIND))),
    }
}

fn position<R: Record>(records: &[R], id: &str) -> StudioResult<usize> {
    records
        .iter()
        .position(|r| r.id() == id)
        .ok_or_else(|| StudioError::not_found(R::KIND, id))
}
