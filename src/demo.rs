//! Demo object graph inspected by the `memscope` binary
//!
//! A small world of `#[repr(C)]` entities lives on the heap of the running
//! process. It contains everything the inspector has to cope with: a ring of
//! `next` pointers, back-pointers to the parent, fixed arrays (one long
//! enough to be windowed), a tagged union, a NUL-terminated name, text that
//! is not UTF-8, an opaque blob and a pointer into unmapped memory.

use crate::error::LoadError;
use crate::inspect::{DocIndex, Documentation};
use crate::layout::{EnumDef, FieldType, LayoutBuilder, LayoutCache, NativeLayout, ScalarKind};
use crate::memory::Address;
use crate::table::{Column, ColumnWidth, CustomColumn, NumericColumn, RowSource, SortKey, StructColumn, TextColumn};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::Style,
    text::{Line, Span},
};
use std::ffi::{c_char, CStr};
use std::mem::offset_of;
use std::sync::Arc;
use std::time::Duration;

/// Address nothing is mapped at
const DANGLING: usize = 0xdead_beef;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl NativeLayout for Vec2 {
    const NAME: &'static str = "Vec2";

    fn describe(layout: &mut LayoutBuilder) {
        layout
            .field("x", offset_of!(Vec2, x), FieldType::scalar(ScalarKind::F32))
            .field("y", offset_of!(Vec2, y), FieldType::scalar(ScalarKind::F32));
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union Payload {
    pub health: i32,
    pub speed: f32,
    pub raw: [u8; 4],
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player = 0,
    Monster = 1,
    Prop = 2,
}

impl EntityKind {
    fn name(self) -> &'static str {
        match self {
            EntityKind::Player => "Player",
            EntityKind::Monster => "Monster",
            EntityKind::Prop => "Prop",
        }
    }

    fn definition() -> EnumDef {
        EnumDef::new(
            "EntityKind",
            ScalarKind::U8,
            &[(0, "Player"), (1, "Monster"), (2, "Prop")],
        )
    }
}

#[repr(C)]
pub struct Entity {
    pub id: u32,
    pub alive: bool,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub payload: Payload,
    pub name: *const c_char,
    pub tag: [u8; 8],
    pub waypoints: [Vec2; 3],
    pub history: [u16; 100],
    pub blob: [u8; 24],
    pub target: *const Vec2,
    pub parent: *const Entity,
    pub next: *const Entity,
}

impl NativeLayout for Entity {
    const NAME: &'static str = "Entity";

    fn describe(layout: &mut LayoutBuilder) {
        let payload = offset_of!(Entity, payload);
        layout
            .field("id", offset_of!(Entity, id), FieldType::scalar(ScalarKind::U32))
            .field("alive", offset_of!(Entity, alive), FieldType::scalar(ScalarKind::Bool))
            .field(
                "kind",
                offset_of!(Entity, kind),
                FieldType::enumeration(EntityKind::definition()),
            )
            .field("pos", offset_of!(Entity, pos), FieldType::structure(Vec2::NAME))
            .field("health", payload, FieldType::scalar(ScalarKind::I32))
            .field("speed", payload, FieldType::scalar(ScalarKind::F32))
            .field("raw", payload, FieldType::Bytes { len: 4 })
            .field("name", offset_of!(Entity, name), FieldType::CString)
            .field("tag", offset_of!(Entity, tag), FieldType::InlineText { len: 8 })
            .field(
                "waypoints",
                offset_of!(Entity, waypoints),
                FieldType::array_of(FieldType::structure(Vec2::NAME), 3),
            )
            .field(
                "history",
                offset_of!(Entity, history),
                FieldType::array_of(FieldType::scalar(ScalarKind::U16), 100),
            )
            .field("blob", offset_of!(Entity, blob), FieldType::structure("Opaque"))
            .field(
                "target",
                offset_of!(Entity, target),
                FieldType::pointer_to(FieldType::structure(Vec2::NAME)),
            )
            .field(
                "parent",
                offset_of!(Entity, parent),
                FieldType::pointer_to(FieldType::structure(Entity::NAME)),
            )
            .field(
                "next",
                offset_of!(Entity, next),
                FieldType::pointer_to(FieldType::structure(Entity::NAME)),
            )
            .discriminant(payload, "kind", &[(0, "health"), (1, "speed"), (2, "raw")]);
    }
}

/// Opaque 24-byte handle shown as a hex dump
fn opaque_layout() -> LayoutBuilder {
    LayoutBuilder::new("Opaque", 24)
}

const DOCS: &str = r#"
["Entity"]
summary = "A simulated game object"
remarks = "Entities form a ring through `next`; `parent` points back."

["Entity.alive"]
summary = "Cleared when the entity is despawned"

["Entity.health"]
summary = "Hit points, valid when kind is Player"

["Entity.speed"]
summary = "Movement speed, valid when kind is Monster"

["Entity.target"]
summary = "Position the entity walks towards"
remarks = "Deliberately dangling in this demo"

["Vec2"]
summary = "2D position in world units"
"#;

/// Documentation of the demo types
pub fn docs() -> DocIndex {
    match DocIndex::from_toml_str(DOCS) {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!(error = %e, "demo documentation failed to parse");
            let mut index = DocIndex::new();
            index.insert(
                Entity::NAME,
                Documentation {
                    summary: "A simulated game object".to_string(),
                    ..Documentation::default()
                },
            );
            index
        }
    }
}

/// Register every demo layout
pub fn register_layouts(layouts: &LayoutCache) {
    layouts.register_native::<Vec2>();
    layouts.register_native::<Entity>();
    layouts.register(opaque_layout());
}

const NAMES: [&CStr; 4] = [c"alpha", c"bravo", c"\xff\xfebroken", c"delta"];

/// The live object graph. Heap storage never moves while this value lives.
pub struct DemoWorld {
    entities: Box<[Entity]>,
    positions: Box<[Vec2]>,
}

impl DemoWorld {
    /// Build a ring of four entities and `rows` standalone positions
    pub fn new(rows: usize) -> Self {
        let kinds = [
            EntityKind::Player,
            EntityKind::Monster,
            EntityKind::Prop,
            EntityKind::Monster,
        ];
        let mut entities: Box<[Entity]> = kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| {
                let payload = match kind {
                    EntityKind::Player => Payload { health: 87 },
                    EntityKind::Monster => Payload { speed: 2.5 + i as f32 },
                    EntityKind::Prop => Payload { raw: [0xca, 0xfe, 0xba, 0xbe] },
                };
                let mut tag = [0u8; 8];
                tag[..4].copy_from_slice(b"ent0");
                tag[3] += i as u8;
                Entity {
                    id: 100 + i as u32,
                    alive: i != 2,
                    kind,
                    pos: Vec2 {
                        x: i as f32 * 1.5,
                        y: -(i as f32),
                    },
                    payload,
                    name: NAMES[i].as_ptr(),
                    tag,
                    waypoints: [Vec2 { x: 0.0, y: 0.0 }, Vec2 { x: 4.0, y: 2.0 }, Vec2 { x: 8.0, y: i as f32 }],
                    history: std::array::from_fn(|h| (h * (i + 1)) as u16),
                    blob: std::array::from_fn(|b| (b * 7 + i) as u8),
                    target: std::ptr::null(),
                    parent: std::ptr::null(),
                    next: std::ptr::null(),
                }
            })
            .collect();

        let ptrs: Vec<*const Entity> = entities.iter().map(|e| e as *const Entity).collect();
        let n = ptrs.len();
        for (i, entity) in entities.iter_mut().enumerate() {
            entity.next = ptrs[(i + 1) % n];
            entity.parent = if i == 0 { std::ptr::null() } else { ptrs[0] };
        }
        entities[1].target = DANGLING as *const Vec2;
        entities[3].name = std::ptr::null();

        let positions: Box<[Vec2]> = (0..rows)
            .map(|i| Vec2 {
                x: (i % 97) as f32,
                y: (i / 97) as f32 * 0.5,
            })
            .collect();

        DemoWorld {
            entities,
            positions,
        }
    }

    /// Address of the first entity of the ring
    pub fn root(&self) -> Address {
        self.entities.as_ptr() as Address
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Row source for the entity table, loaded on a worker thread
    pub fn row_source(&self, delay: Duration) -> Arc<EntitySource> {
        let kinds = [EntityKind::Player, EntityKind::Monster, EntityKind::Prop];
        let rows = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, pos)| EntityRow {
                id: i as u32,
                name: (i % 5 != 4).then(|| format!("entity-{:04}", (i * 7919) % 10_000)),
                kind: kinds[i % kinds.len()],
                score: ((i * 37) % 1000) as f64 / 10.0,
                pos: pos as *const Vec2 as Address,
            })
            .collect();
        Arc::new(EntitySource { rows, delay })
    }
}

/// One row of the entity table
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    pub id: u32,
    pub name: Option<String>,
    pub kind: EntityKind,
    pub score: f64,
    /// Address of the row's live `Vec2`
    pub pos: Address,
}

pub struct EntitySource {
    rows: Vec<EntityRow>,
    delay: Duration,
}

impl RowSource<EntityRow> for EntitySource {
    fn is_async(&self) -> bool {
        true
    }

    fn fetch(&self) -> Result<Vec<EntityRow>, LoadError> {
        std::thread::sleep(self.delay);
        Ok(self.rows.clone())
    }
}

/// Columns of the entity table
pub fn entity_columns() -> Vec<Box<dyn Column<EntityRow>>> {
    vec![
        Box::new(
            NumericColumn::uint("id", |r: &EntityRow| u64::from(r.id))
                .with_width(ColumnWidth::Fixed(6))
                .as_primary(),
        ),
        Box::new(TextColumn::new("name", |r: &EntityRow| r.name.clone()).with_width(ColumnWidth::Proportional(2))),
        Box::new(
            CustomColumn::new("kind", |r: &EntityRow, _| {
                let color = match r.kind {
                    EntityKind::Player => DEFAULT_THEME.success,
                    EntityKind::Monster => DEFAULT_THEME.error,
                    EntityKind::Prop => DEFAULT_THEME.comment,
                };
                Line::from(Span::styled(r.kind.name(), Style::default().fg(color)))
            })
            .with_sort_key(|r| SortKey::UInt(r.kind as u64))
            .with_width(ColumnWidth::Fixed(8)),
        ),
        Box::new(NumericColumn::float("score", 1, |r: &EntityRow| r.score).with_width(ColumnWidth::Fixed(7))),
        Box::new(StructColumn::new("pos", Vec2::NAME, |r: &EntityRow| Some(r.pos))),
    ]
}
