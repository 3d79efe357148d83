//! Map persistence: the document model, the actor registry, and file
//! naming.
//!
//! Maps round-trip through a structured JSON document: header, wall list,
//! dynamic entity list, and an opaque misc section reserved for outer
//! layers. Dynamic entities are polymorphic, so their nodes carry a type
//! tag keyed into an injected [`ActorRegistry`] — a type-tag to decoder
//! table — rather than relying on open-ended subtype dispatch. Encoding is
//! the actor's own [`Actor::save`]; saving verifies the tag is registered
//! so the decode/encode pairing cannot silently diverge.
//!
//! # Failure model
//!
//! There is no partial success: a missing file, malformed document, or
//! unknown tag aborts the whole load or save with a [`MapError`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use loam::Rect;
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::entity::{CollisionMode, MapSlot};
use crate::error::MapError;
use crate::map::{Map, MapEvent};
use crate::wall::{BlockDirs, WallBody};

/// Fixed suffix of map files under the maps content directory.
pub const MAP_FILE_SUFFIX: &str = ".map.json";

// =============================================================================
// File naming
// =============================================================================

/// Positive integer identifying one map file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapIndex(u32);

impl MapIndex {
    /// Create a map index; zero is not a valid index.
    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// The raw index value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MapIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical file name for a map index.
#[must_use]
pub fn map_file_name(index: MapIndex) -> String {
    format!("{index}{MAP_FILE_SUFFIX}")
}

/// Canonical path of a map file under the maps content directory.
#[must_use]
pub fn map_path(maps_dir: &Path, index: MapIndex) -> PathBuf {
    maps_dir.join(map_file_name(index))
}

/// Parse a map file name back into its index.
///
/// The name must be exactly a positive decimal integer followed by
/// [`MAP_FILE_SUFFIX`]; anything else fails fast.
///
/// # Errors
///
/// [`MapError::InvalidFileName`] when the name does not match that form.
pub fn parse_map_index(file_name: &str) -> Result<MapIndex, MapError> {
    let invalid = || MapError::InvalidFileName(file_name.to_owned());
    let stem = file_name.strip_suffix(MAP_FILE_SUFFIX).ok_or_else(invalid)?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value: u32 = stem.parse().map_err(|_| invalid())?;
    MapIndex::new(value).ok_or_else(invalid)
}

// =============================================================================
// Actor registry
// =============================================================================

/// Decoder for one dynamic entity type: payload node in, boxed actor out.
pub type DecodeFn = fn(&serde_json::Value) -> Result<Box<dyn Actor>, MapError>;

/// Type-tag to decoder table for polymorphic dynamic entities.
///
/// Injected into load and save: load routes each dynamic node's tag
/// through it, save refuses actors whose tag it does not know.
///
/// # Example
///
/// ```
/// use emberfall_core::actor::Actor;
/// use emberfall_core::codec::ActorRegistry;
/// use emberfall_core::error::MapError;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Lantern {
///     lit: bool,
/// }
///
/// impl Actor for Lantern {
///     fn type_tag(&self) -> &'static str {
///         "lantern"
///     }
///     fn save(&self) -> Result<serde_json::Value, serde_json::Error> {
///         serde_json::to_value(self)
///     }
/// }
///
/// fn decode_lantern(node: &serde_json::Value) -> Result<Box<dyn Actor>, MapError> {
///     let lantern: Lantern = serde_json::from_value(node.clone())?;
///     Ok(Box::new(lantern))
/// }
///
/// let mut registry = ActorRegistry::new();
/// registry.register("lantern", decode_lantern);
/// assert!(registry.contains("lantern"));
/// ```
#[derive(Debug, Default)]
pub struct ActorRegistry {
    decoders: BTreeMap<&'static str, DecodeFn>,
}

impl ActorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: BTreeMap::new(),
        }
    }

    /// Register the decoder for a type tag.
    ///
    /// Re-registering a tag replaces the previous decoder; that is almost
    /// always a wiring mistake, so it is reported on the diagnostics
    /// channel.
    pub fn register(&mut self, tag: &'static str, decode: DecodeFn) {
        if self.decoders.insert(tag, decode).is_some() {
            tracing::warn!(tag, "actor decoder replaced an earlier registration");
        }
    }

    /// True if a decoder is registered for the tag.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Decode a dynamic entity payload by tag.
    ///
    /// # Errors
    ///
    /// [`MapError::UnknownActorTag`] for an unregistered tag; whatever the
    /// decoder raises for a malformed payload.
    pub fn decode(&self, tag: &str, data: &serde_json::Value) -> Result<Box<dyn Actor>, MapError> {
        let decode = self
            .decoders
            .get(tag)
            .ok_or_else(|| MapError::UnknownActorTag(tag.to_owned()))?;
        decode(data)
    }
}

// =============================================================================
// Document model
// =============================================================================

/// Header section of a map document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapHeader {
    /// Map name.
    pub name: String,
    /// Music reference (asset key; empty for silence).
    pub music: String,
    /// Playfield width.
    pub width: f32,
    /// Playfield height.
    pub height: f32,
}

/// One wall in the document's wall list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallNode {
    /// The wall's shape.
    pub rect: Rect,
    /// The wall's push directions.
    pub dirs: BlockDirs,
}

/// One dynamic entity in the document's dynamic list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicNode {
    /// Type tag keyed into the actor registry.
    pub tag: String,
    /// The map slot the entity held when saved; restored on load.
    pub slot: MapSlot,
    /// The entity's collision shape.
    pub rect: Rect,
    /// The entity's collision participation mode.
    pub mode: CollisionMode,
    /// The actor's polymorphic payload.
    pub data: serde_json::Value,
}

/// The complete persisted form of a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    /// Name, music, and playfield dimensions.
    pub header: MapHeader,
    /// Static geometry, in insertion order.
    pub walls: Vec<WallNode>,
    /// Dynamic entities, in insertion order.
    pub dynamics: Vec<DynamicNode>,
    /// Opaque extension data owned by outer layers.
    #[serde(default)]
    pub misc: serde_json::Value,
}

// =============================================================================
// Save / load
// =============================================================================

impl Map {
    /// Build the persisted form of this map.
    ///
    /// A dynamic entity whose actor is out on a callback cannot be
    /// serialized; it is reported on the diagnostics channel and skipped
    /// (saving mid-step is not supported).
    ///
    /// # Errors
    ///
    /// [`MapError::UnknownActorTag`] when a dynamic entity's tag is missing
    /// from the registry; [`MapError::Document`] when a payload fails to
    /// encode.
    pub fn to_document(&self, registry: &ActorRegistry) -> Result<MapDocument, MapError> {
        let mut walls = Vec::new();
        let mut dynamics = Vec::new();
        for entity in self.entities() {
            if let Some(body) = entity.as_wall() {
                walls.push(WallNode {
                    rect: entity.shape(),
                    dirs: body.dirs(),
                });
            } else if let Some(slot) = entity.slot() {
                let Some(actor) = entity.actor() else {
                    tracing::error!(id = %entity.id(), "actor out on a callback during save; entity skipped");
                    continue;
                };
                let tag = actor.type_tag();
                if !registry.contains(tag) {
                    return Err(MapError::UnknownActorTag(tag.to_owned()));
                }
                dynamics.push(DynamicNode {
                    tag: tag.to_owned(),
                    slot,
                    rect: entity.shape(),
                    mode: entity.mode(),
                    data: actor.save()?,
                });
            }
        }
        Ok(MapDocument {
            header: MapHeader {
                name: self.name().to_owned(),
                music: self.music().to_owned(),
                width: self.width(),
                height: self.height(),
            },
            walls,
            dynamics,
            misc: self.misc.clone(),
        })
    }

    /// Serialize this map to a writer and fire [`MapEvent::Saved`].
    ///
    /// # Errors
    ///
    /// Everything [`Map::to_document`] raises, plus [`MapError::Document`]
    /// when the writer fails.
    pub fn save_to<W: Write>(&mut self, writer: W, registry: &ActorRegistry) -> Result<(), MapError> {
        let document = self.to_document(registry)?;
        serde_json::to_writer_pretty(writer, &document)?;
        self.push_event(MapEvent::Saved);
        Ok(())
    }

    /// Serialize this map to a file and fire [`MapEvent::Saved`].
    ///
    /// # Errors
    ///
    /// [`MapError::File`] when the file cannot be created, plus everything
    /// [`Map::save_to`] raises.
    pub fn save_file(&mut self, path: &Path, registry: &ActorRegistry) -> Result<(), MapError> {
        let file = File::create(path).map_err(|source| MapError::File {
            path: path.to_owned(),
            source,
        })?;
        self.save_to(BufWriter::new(file), registry)
    }

    /// Rebuild a map from its persisted form.
    ///
    /// The header is applied first — the map, and with it the spatial
    /// index, exists at its final dimensions before any geometry lands.
    /// Walls are added immediately; dynamic entities only when
    /// `spawn_dynamics` is set, which lets callers inspect a map's static
    /// geometry without instantiating live content. Slots are restored
    /// explicitly through [`Map::add_dynamic_at`], so they survive the
    /// round trip.
    ///
    /// # Errors
    ///
    /// [`MapError::UnknownActorTag`] or [`MapError::Document`] when a
    /// dynamic node cannot be decoded.
    pub fn from_document(
        document: MapDocument,
        registry: &ActorRegistry,
        spawn_dynamics: bool,
    ) -> Result<Self, MapError> {
        let mut map = Self::new(document.header.name, document.header.width, document.header.height);
        map.set_music(document.header.music);
        for wall in document.walls {
            map.add_wall(wall.rect, WallBody::new(wall.dirs));
        }
        if spawn_dynamics {
            for node in document.dynamics {
                let actor = registry.decode(&node.tag, &node.data)?;
                map.add_dynamic_at(node.slot, node.rect, node.mode, actor);
            }
        }
        map.misc = document.misc;
        Ok(map)
    }

    /// Deserialize a map from a reader.
    ///
    /// # Errors
    ///
    /// [`MapError::Document`] for malformed content, plus everything
    /// [`Map::from_document`] raises.
    pub fn load_from<R: Read>(
        reader: R,
        registry: &ActorRegistry,
        spawn_dynamics: bool,
    ) -> Result<Self, MapError> {
        let document: MapDocument = serde_json::from_reader(reader)?;
        Self::from_document(document, registry, spawn_dynamics)
    }

    /// Deserialize a map from a file.
    ///
    /// # Errors
    ///
    /// [`MapError::File`] when the file cannot be opened, plus everything
    /// [`Map::load_from`] raises.
    pub fn load_file(
        path: &Path,
        registry: &ActorRegistry,
        spawn_dynamics: bool,
    ) -> Result<Self, MapError> {
        let file = File::open(path).map_err(|source| MapError::File {
            path: path.to_owned(),
            source,
        })?;
        Self::load_from(BufReader::new(file), registry, spawn_dynamics)
    }
}
