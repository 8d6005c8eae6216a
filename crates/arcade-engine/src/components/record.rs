//! Level persistence records.
//!
//! An actor serialises to `{ "type": ..., "x": ..., "y": ..., ...fields }`.
//! Only actors with a `record_type` are persisted; the file format and the
//! storage medium belong to the game.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::error::{EngineError, Result};
use crate::api::types::ActorId;
use crate::components::actor::Actor;
use crate::components::collider::{Collider, CollisionKind};
use crate::core::polygon::Polygon;
use crate::core::scene::Scene;

/// One persisted actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    /// Type-specific fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ActorRecord {
    pub fn new(kind: impl Into<String>, position: Vec2) -> Self {
        Self {
            kind: kind.into(),
            x: position.x,
            y: position.y,
            fields: Map::new(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn f32_field(&self, name: &str) -> Option<f32> {
        self.fields.get(name).and_then(Value::as_f64).map(|v| v as f32)
    }

    fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }
}

fn polygon_value(polygon: &Polygon) -> Value {
    let vertices = polygon
        .vertices()
        .iter()
        .map(|v| Value::Array(vec![Value::from(v.x), Value::from(v.y)]))
        .collect();
    let mut map = Map::new();
    map.insert("vertices".into(), Value::Array(vertices));
    if polygon.is_inverted() {
        map.insert("inverted".into(), Value::Bool(true));
    }
    Value::Object(map)
}

impl Actor {
    /// Snapshot for level files, or `None` if this actor is not persisted.
    pub fn to_record(&self) -> Option<ActorRecord> {
        let kind = self.record_type.as_ref()?;
        let mut record = ActorRecord::new(kind.clone(), self.position);

        if !self.tag.is_empty() {
            record.insert("tag", self.tag.clone());
        }
        if self.z_index != 0 {
            record.insert("z", self.z_index);
        }
        if let Some(collider) = &self.collider {
            record.insert("polygon", polygon_value(&collider.polygon));
            if !collider.enabled {
                record.insert("enabled", false);
            }
            if let CollisionKind::Sticky { stickiness } = collider.kind {
                record.insert("stickiness", stickiness);
            }
        } else {
            if self.velocity != Vec2::ZERO {
                record.insert("vx", self.velocity.x);
                record.insert("vy", self.velocity.y);
            }
            if self.restitution != 1.0 {
                record.insert("restitution", self.restitution);
            }
            if self.inverse_mass != 1.0 {
                record.insert("inverse_mass", self.inverse_mass);
            }
        }
        Some(record)
    }

    /// Rebuild an actor from a record.
    ///
    /// Collider records (`bounce`, `sticky`, `trigger`) become immovable
    /// fixtures; `actor` records become plain dynamic actors.
    pub fn from_record(id: ActorId, record: &ActorRecord) -> Result<Actor> {
        let mut actor = match record.kind.as_str() {
            "bounce" | "sticky" | "trigger" => {
                let polygon: Polygon = match record.fields.get("polygon") {
                    Some(value) => serde_json::from_value(value.clone())?,
                    None => return Err(EngineError::MalformedRecord(format!("`{}` record without polygon", record.kind))),
                };
                let mut collider = match record.kind.as_str() {
                    "bounce" => Collider::bounce(polygon),
                    "trigger" => Collider::trigger(polygon),
                    _ => {
                        let stickiness = record
                            .f32_field("stickiness")
                            .ok_or_else(|| EngineError::MalformedRecord("sticky record without stickiness".into()))?;
                        Collider::sticky(polygon, stickiness)
                    }
                };
                collider.enabled = record.fields.get("enabled").and_then(Value::as_bool).unwrap_or(true);
                Actor::fixture(id, collider)
            }
            "actor" => {
                let mut actor = Actor::new(id).with_position(record.position());
                actor.velocity = Vec2::new(
                    record.f32_field("vx").unwrap_or(0.0),
                    record.f32_field("vy").unwrap_or(0.0),
                );
                actor.restitution = record.f32_field("restitution").unwrap_or(1.0);
                actor.inverse_mass = record.f32_field("inverse_mass").unwrap_or(1.0);
                actor
            }
            other => return Err(EngineError::UnknownRecordType(other.to_string())),
        };

        if let Some(tag) = record.fields.get("tag").and_then(Value::as_str) {
            actor.tag = tag.to_string();
        }
        if let Some(z) = record.fields.get("z").and_then(Value::as_i64) {
            actor.z_index = z as i32;
        }
        actor.record_type = Some(record.kind.clone());
        Ok(actor)
    }
}

/// Serialise every persisted actor of a scene as a JSON array.
pub fn to_json(scene: &Scene) -> Result<String> {
    let records: Vec<ActorRecord> = scene.iter().filter_map(Actor::to_record).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Spawn the actors of a JSON level into `scene`, returning their ids.
///
/// Nothing is spawned if any record fails to load.
pub fn from_json(json: &str, scene: &mut Scene) -> Result<Vec<ActorId>> {
    let records: Vec<ActorRecord> = serde_json::from_str(json)?;
    let mut actors = Vec::with_capacity(records.len());
    for record in &records {
        let id = scene.next_id();
        actors.push(Actor::from_record(id, record)?);
    }
    Ok(actors.into_iter().map(|actor| scene.spawn(actor)).collect())
}
