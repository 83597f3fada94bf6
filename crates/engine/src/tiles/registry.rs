use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::info;

use crate::app::is_valid_sheet_key;

use super::types::{SpriteFrames, TileAttribute, TileAttributes, TileTypeDef, TileTypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionErrorCode {
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateId,
    NonPositiveSize,
    UnknownAttribute,
}

#[derive(Debug, Error)]
pub enum TileTypeLoadError {
    #[error("failed to read tile definitions {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{code:?}: {message} (file={}{})", file_path.display(), format_location(location))]
    MalformedDefinition {
        code: DefinitionErrorCode,
        message: String,
        file_path: PathBuf,
        location: Option<SourceLocation>,
    },
}

impl TileTypeLoadError {
    pub fn code(&self) -> Option<DefinitionErrorCode> {
        match self {
            TileTypeLoadError::Read { .. } => None,
            TileTypeLoadError::MalformedDefinition { code, .. } => Some(*code),
        }
    }
}

fn format_location(location: &Option<SourceLocation>) -> String {
    location
        .map(|loc| format!(", {loc}"))
        .unwrap_or_default()
}

/// One past the largest id a tile type can carry.
const MAX_CYCLE_BOUND: u32 = u16::MAX as u32 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

/// Immutable table of tile types keyed by id. Sessions receive it by reference;
/// tiles only ever store ids into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileTypeRegistry {
    defs: BTreeMap<TileTypeId, TileTypeDef>,
    cycle_bound_override: Option<u32>,
}

impl TileTypeRegistry {
    /// Later definitions replace earlier ones with the same id; id 0 is dropped.
    pub fn from_defs(defs: impl IntoIterator<Item = TileTypeDef>) -> Self {
        let defs = defs
            .into_iter()
            .filter(|def| !def.id.is_empty())
            .map(|def| (def.id, def))
            .collect();
        Self {
            defs,
            cycle_bound_override: None,
        }
    }

    pub fn load_types(path: &Path) -> Result<Self, TileTypeLoadError> {
        let raw = fs::read_to_string(path).map_err(|source| TileTypeLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::parse(&raw, path)?;
        info!(
            path = %path.display(),
            tile_type_count = registry.len(),
            cycle_bound = registry.cycle_bound(),
            "tile_types_loaded"
        );
        Ok(registry)
    }

    /// Replaces every entry from `path`, or leaves the table untouched on error.
    pub fn reload(&mut self, path: &Path) -> Result<(), TileTypeLoadError> {
        *self = Self::load_types(path)?;
        Ok(())
    }

    pub fn parse(raw: &str, file_path: &Path) -> Result<Self, TileTypeLoadError> {
        let doc = Document::parse(raw).map_err(|error| TileTypeLoadError::MalformedDefinition {
            code: DefinitionErrorCode::XmlMalformed,
            message: format!("malformed XML: {error}"),
            file_path: file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: error.pos().row as usize,
                column: error.pos().col as usize,
            }),
        })?;
        let ctx = ParseContext {
            file_path,
            doc: &doc,
        };

        let root = doc.root_element();
        if root.tag_name().name() != "TileTypes" {
            return Err(ctx.error_at(
                DefinitionErrorCode::InvalidRoot,
                "root element must be <TileTypes>".to_string(),
                root,
            ));
        }
        let cycle_bound_override = match root.attribute("cycleBound") {
            Some(value) => Some(value.trim().parse::<u32>().map_err(|_| {
                ctx.error_at(
                    DefinitionErrorCode::InvalidValue,
                    format!("cycleBound '{value}' is not a non-negative integer"),
                    root,
                )
            })?),
            None => None,
        };
        if cycle_bound_override.is_some_and(|bound| bound > MAX_CYCLE_BOUND) {
            return Err(ctx.error_at(
                DefinitionErrorCode::InvalidValue,
                format!("cycleBound must be at most {MAX_CYCLE_BOUND}"),
                root,
            ));
        }

        let mut defs = BTreeMap::<TileTypeId, TileTypeDef>::new();
        for child in root.children().filter(|node| node.is_element()) {
            if child.tag_name().name() != "TileType" {
                return Err(ctx.error_at(
                    DefinitionErrorCode::UnknownDefType,
                    format!(
                        "unsupported element <{}>; expected <TileType>",
                        child.tag_name().name()
                    ),
                    child,
                ));
            }
            let def = ctx.parse_tile_type(child)?;
            if defs.contains_key(&def.id) {
                return Err(ctx.error_at(
                    DefinitionErrorCode::DuplicateId,
                    format!("duplicate tile type id {}", def.id),
                    child,
                ));
            }
            defs.insert(def.id, def);
        }

        Ok(Self {
            defs,
            cycle_bound_override,
        })
    }

    /// `None` for id 0 and any id without a definition.
    pub fn get_type(&self, id: TileTypeId) -> Option<&TileTypeDef> {
        self.defs.get(&id)
    }

    /// Lookup by an untrusted number; negative or oversized ids find nothing.
    pub fn get_type_by_number(&self, raw_id: i64) -> Option<&TileTypeDef> {
        let id = u16::try_from(raw_id).ok()?;
        self.get_type(TileTypeId(id))
    }

    pub fn contains(&self, id: TileTypeId) -> bool {
        self.defs.contains_key(&id)
    }

    /// Ascending ids of every loaded type. Call again to restart.
    pub fn all_type_ids(&self) -> impl Iterator<Item = TileTypeId> + Clone + '_ {
        self.defs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn max_type_id(&self) -> Option<TileTypeId> {
        self.defs.keys().next_back().copied()
    }

    pub fn first_with_attribute(&self, attribute: TileAttribute) -> Option<TileTypeId> {
        self.defs
            .values()
            .find(|def| def.has_attribute(attribute))
            .map(|def| def.id)
    }

    /// Wrap point for type cycling: one past the largest loaded id, or the
    /// file's `cycleBound` when that is larger.
    pub fn cycle_bound(&self) -> u32 {
        let derived = self
            .max_type_id()
            .map(|id| id.0 as u32 + 1)
            .unwrap_or(0);
        self.cycle_bound_override
            .map_or(derived, |bound| bound.max(derived))
            .min(MAX_CYCLE_BOUND)
    }

    /// Scans from `current` in `direction`, wrapping at `cycle_bound`, and
    /// returns the first loaded id. Visits each slot at most once, so the
    /// result may be `current` itself; `None` only when nothing is loaded.
    pub fn cycle(&self, current: TileTypeId, direction: CycleDirection) -> Option<TileTypeId> {
        let bound = self.cycle_bound();
        if bound == 0 || self.is_empty() {
            return None;
        }
        let start = current.0 as u32 % bound;
        (1..=bound)
            .map(|step| match direction {
                CycleDirection::Forward => (start + step) % bound,
                CycleDirection::Backward => (start + bound - step) % bound,
            })
            .filter_map(|candidate| u16::try_from(candidate).ok())
            .map(TileTypeId)
            .find(|candidate| self.contains(*candidate))
    }
}

struct ParseContext<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl ParseContext<'_, '_> {
    fn parse_tile_type(&self, node: Node<'_, '_>) -> Result<TileTypeDef, TileTypeLoadError> {
        let mut seen_fields = HashSet::<String>::new();
        let mut id: Option<TileTypeId> = None;
        let mut name: Option<String> = None;
        let mut width: Option<u32> = None;
        let mut height: Option<u32> = None;
        let mut attributes = TileAttributes::NONE;
        let mut sprite: Option<SpriteFrames> = None;

        for field in node.children().filter(|child| child.is_element()) {
            let field_name = field.tag_name().name().to_string();
            if !seen_fields.insert(field_name.clone()) {
                return Err(self.error_at(
                    DefinitionErrorCode::DuplicateField,
                    format!("duplicate field <{field_name}> in <TileType>"),
                    field,
                ));
            }

            match field_name.as_str() {
                "id" => {
                    let value = self.parse_integer(field, "id")?;
                    let parsed = u16::try_from(value)
                        .ok()
                        .filter(|parsed| *parsed != 0)
                        .ok_or_else(|| {
                            self.error_at(
                                DefinitionErrorCode::InvalidValue,
                                format!("id {value} must be in 1..=65535; 0 is reserved for empty"),
                                field,
                            )
                        })?;
                    id = Some(TileTypeId(parsed));
                }
                "name" => name = Some(self.required_text(field, "name")?),
                "width" => width = Some(self.parse_size(field, "width")?),
                "height" => height = Some(self.parse_size(field, "height")?),
                "attributes" => attributes = self.parse_attributes(field)?,
                "sprite" => sprite = Some(self.parse_sprite(field)?),
                _ => {
                    return Err(self.error_at(
                        DefinitionErrorCode::UnknownField,
                        format!("unknown field <{field_name}> in <TileType>"),
                        field,
                    ))
                }
            }
        }

        let Some(id) = id else {
            return Err(self.missing(node, "id"));
        };
        let Some(name) = name else {
            return Err(self.missing(node, "name"));
        };
        let Some(width) = width else {
            return Err(self.missing(node, "width"));
        };
        let Some(height) = height else {
            return Err(self.missing(node, "height"));
        };

        Ok(TileTypeDef {
            id,
            name,
            width,
            height,
            attributes,
            sprite,
        })
    }

    fn parse_attributes(&self, node: Node<'_, '_>) -> Result<TileAttributes, TileTypeLoadError> {
        let mut attributes = TileAttributes::NONE;
        for child in node.children().filter(|child| child.is_element()) {
            if child.tag_name().name() != "attribute" {
                return Err(self.error_at(
                    DefinitionErrorCode::UnknownField,
                    format!(
                        "unknown field <{}> in <attributes>; expected <attribute>",
                        child.tag_name().name()
                    ),
                    child,
                ));
            }
            let value = self.required_text(child, "attribute")?;
            let attribute = TileAttribute::from_name(&value).ok_or_else(|| {
                self.error_at(
                    DefinitionErrorCode::UnknownAttribute,
                    format!(
                        "unknown attribute '{value}'; allowed values: Solid, Spawn, Hazard, Finish, LightSource"
                    ),
                    child,
                )
            })?;
            attributes.insert(attribute);
        }
        Ok(attributes)
    }

    fn parse_sprite(&self, node: Node<'_, '_>) -> Result<SpriteFrames, TileTypeLoadError> {
        let mut seen_fields = HashSet::<String>::new();
        let mut sheet: Option<String> = None;
        let mut x: Option<u32> = None;
        let mut y: Option<u32> = None;
        let mut frames: Option<u32> = None;

        for field in node.children().filter(|child| child.is_element()) {
            let field_name = field.tag_name().name().to_string();
            if !seen_fields.insert(field_name.clone()) {
                return Err(self.error_at(
                    DefinitionErrorCode::DuplicateField,
                    format!("duplicate field <{field_name}> in <sprite>"),
                    field,
                ));
            }
            match field_name.as_str() {
                "sheet" => {
                    let value = self.required_text(field, "sheet")?;
                    if !is_valid_sheet_key(&value) {
                        return Err(self.error_at(
                            DefinitionErrorCode::InvalidValue,
                            format!("sheet '{value}' must be a lowercase relative key"),
                            field,
                        ));
                    }
                    sheet = Some(value);
                }
                "x" => x = Some(self.parse_unsigned(field, "x")?),
                "y" => y = Some(self.parse_unsigned(field, "y")?),
                "frames" => frames = Some(self.parse_size(field, "frames")?),
                _ => {
                    return Err(self.error_at(
                        DefinitionErrorCode::UnknownField,
                        format!("unknown field <{field_name}> in <sprite>"),
                        field,
                    ))
                }
            }
        }

        let Some(sheet) = sheet else {
            return Err(self.missing(node, "sheet"));
        };
        Ok(SpriteFrames {
            sheet,
            x: x.unwrap_or(0),
            y: y.unwrap_or(0),
            frame_count: frames.unwrap_or(1),
        })
    }

    fn parse_integer(&self, node: Node<'_, '_>, field_name: &str) -> Result<i64, TileTypeLoadError> {
        let value = self.required_text(node, field_name)?;
        value.parse::<i64>().map_err(|_| {
            self.error_at(
                DefinitionErrorCode::InvalidValue,
                format!("{field_name} '{value}' is not a valid integer"),
                node,
            )
        })
    }

    fn parse_unsigned(&self, node: Node<'_, '_>, field_name: &str) -> Result<u32, TileTypeLoadError> {
        let value = self.parse_integer(node, field_name)?;
        u32::try_from(value).map_err(|_| {
            self.error_at(
                DefinitionErrorCode::InvalidValue,
                format!("{field_name} must be >= 0, got {value}"),
                node,
            )
        })
    }

    fn parse_size(&self, node: Node<'_, '_>, field_name: &str) -> Result<u32, TileTypeLoadError> {
        let value = self.parse_integer(node, field_name)?;
        match u32::try_from(value) {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(self.error_at(
                DefinitionErrorCode::NonPositiveSize,
                format!("{field_name} must be > 0, got {value}"),
                node,
            )),
        }
    }

    fn required_text(&self, node: Node<'_, '_>, field_name: &str) -> Result<String, TileTypeLoadError> {
        let value = node.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(self.error_at(
                DefinitionErrorCode::MissingField,
                format!("field <{field_name}> must not be empty"),
                node,
            ));
        }
        Ok(value)
    }

    fn missing(&self, node: Node<'_, '_>, field_name: &str) -> TileTypeLoadError {
        self.error_at(
            DefinitionErrorCode::MissingField,
            format!(
                "missing required field <{field_name}> in <{}>",
                node.tag_name().name()
            ),
            node,
        )
    }

    fn error_at(
        &self,
        code: DefinitionErrorCode,
        message: String,
        node: Node<'_, '_>,
    ) -> TileTypeLoadError {
        let pos = self.doc.text_pos_at(node.range().start);
        TileTypeLoadError::MalformedDefinition {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn tile_type_xml(id: &str, name: &str, extra: &str) -> String {
        format!(
            "<TileType><id>{id}</id><name>{name}</name><width>64</width><height>64</height>{extra}</TileType>"
        )
    }

    fn parse(body: &str) -> Result<TileTypeRegistry, TileTypeLoadError> {
        TileTypeRegistry::parse(
            &format!("<TileTypes>{body}</TileTypes>"),
            Path::new("tiles.xml"),
        )
    }

    fn registry_with_ids(ids: &[u16]) -> TileTypeRegistry {
        let body = ids
            .iter()
            .map(|id| tile_type_xml(&id.to_string(), &format!("t{id}"), ""))
            .collect::<String>();
        parse(&body).expect("registry")
    }

    #[test]
    fn parses_full_definition() {
        let registry = parse(&tile_type_xml(
            "199",
            "Spawn",
            "<attributes><attribute>Spawn</attribute><attribute>LIGHT_SOURCE</attribute></attributes>\
             <sprite><sheet>tiles</sheet><x>64</x><y>128</y><frames>4</frames></sprite>",
        ))
        .expect("parse");
        let def = registry.get_type(TileTypeId(199)).expect("def");
        assert_eq!(def.name, "Spawn");
        assert_eq!((def.width, def.height), (64, 64));
        assert!(def.has_attribute(TileAttribute::Spawn));
        assert!(def.has_attribute(TileAttribute::LightSource));
        assert!(!def.has_attribute(TileAttribute::Solid));
        let sprite = def.sprite.as_ref().expect("sprite");
        assert_eq!((sprite.x, sprite.y, sprite.frame_count), (64, 128, 4));
    }

    #[test]
    fn duplicate_id_is_malformed() {
        let err = parse(&format!(
            "{}{}",
            tile_type_xml("3", "a", ""),
            tile_type_xml("3", "b", "")
        ))
        .expect_err("duplicate");
        assert_eq!(err.code(), Some(DefinitionErrorCode::DuplicateId));
    }

    #[test]
    fn non_positive_size_is_malformed() {
        let err = parse("<TileType><id>1</id><name>a</name><width>0</width><height>64</height></TileType>")
            .expect_err("zero width");
        assert_eq!(err.code(), Some(DefinitionErrorCode::NonPositiveSize));
        let err = parse("<TileType><id>1</id><name>a</name><width>64</width><height>-3</height></TileType>")
            .expect_err("negative height");
        assert_eq!(err.code(), Some(DefinitionErrorCode::NonPositiveSize));
    }

    #[test]
    fn unknown_attribute_is_malformed_with_location() {
        let err = parse(&tile_type_xml(
            "1",
            "a",
            "<attributes><attribute>Bouncy</attribute></attributes>",
        ))
        .expect_err("unknown attribute");
        assert_eq!(err.code(), Some(DefinitionErrorCode::UnknownAttribute));
        match err {
            TileTypeLoadError::MalformedDefinition { location, .. } => assert!(location.is_some()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn reserved_and_missing_fields_error() {
        let err = parse(&tile_type_xml("0", "empty", "")).expect_err("id 0");
        assert_eq!(err.code(), Some(DefinitionErrorCode::InvalidValue));
        let err = parse("<TileType><id>2</id><width>64</width><height>64</height></TileType>")
            .expect_err("no name");
        assert_eq!(err.code(), Some(DefinitionErrorCode::MissingField));
        let err = parse(&tile_type_xml("2", "a", "<mood>happy</mood>")).expect_err("field");
        assert_eq!(err.code(), Some(DefinitionErrorCode::UnknownField));
    }

    #[test]
    fn wrong_root_and_bad_xml_error() {
        let err = TileTypeRegistry::parse("<Defs/>", Path::new("tiles.xml")).expect_err("root");
        assert_eq!(err.code(), Some(DefinitionErrorCode::InvalidRoot));
        let err =
            TileTypeRegistry::parse("<TileTypes><TileType>", Path::new("tiles.xml")).expect_err("xml");
        assert_eq!(err.code(), Some(DefinitionErrorCode::XmlMalformed));
    }

    #[test]
    fn lookups_of_unknown_ids_find_nothing() {
        let registry = registry_with_ids(&[1, 7]);
        assert!(registry.get_type(TileTypeId::EMPTY).is_none());
        assert!(registry.get_type(TileTypeId(2)).is_none());
        assert!(registry.get_type_by_number(-1).is_none());
        assert!(registry.get_type_by_number(70_000).is_none());
        assert_eq!(
            registry.get_type_by_number(7).map(|def| def.name.as_str()),
            Some("t7")
        );
    }

    #[test]
    fn all_type_ids_is_sorted_and_restartable() {
        let registry = registry_with_ids(&[40, 2, 9]);
        let ids = registry.all_type_ids();
        let first = ids.clone().collect::<Vec<_>>();
        let second = ids.collect::<Vec<_>>();
        assert_eq!(first, vec![TileTypeId(2), TileTypeId(9), TileTypeId(40)]);
        assert_eq!(first, second);
    }

    #[test]
    fn cycling_skips_gaps_and_wraps() {
        let registry = registry_with_ids(&[1, 5, 199]);
        assert_eq!(registry.cycle_bound(), 200);
        let forward = |id| registry.cycle(TileTypeId(id), CycleDirection::Forward);
        let backward = |id| registry.cycle(TileTypeId(id), CycleDirection::Backward);
        assert_eq!(forward(1), Some(TileTypeId(5)));
        assert_eq!(forward(5), Some(TileTypeId(199)));
        assert_eq!(forward(199), Some(TileTypeId(1)));
        assert_eq!(backward(1), Some(TileTypeId(199)));
        assert_eq!(backward(0), Some(TileTypeId(199)));
        assert_eq!(forward(0), Some(TileTypeId(1)));
    }

    #[test]
    fn cycling_forward_then_backward_returns_to_start() {
        let registry = registry_with_ids(&[3, 4, 17, 250]);
        for start in registry.all_type_ids() {
            for steps in 1..=9 {
                let mut current = start;
                for _ in 0..steps {
                    current = registry
                        .cycle(current, CycleDirection::Forward)
                        .expect("forward");
                }
                for _ in 0..steps {
                    current = registry
                        .cycle(current, CycleDirection::Backward)
                        .expect("backward");
                }
                assert_eq!(current, start, "start={start} steps={steps}");
            }
        }
    }

    #[test]
    fn cycling_single_type_lands_on_itself_and_empty_registry_fails() {
        let registry = registry_with_ids(&[12]);
        assert_eq!(
            registry.cycle(TileTypeId(12), CycleDirection::Forward),
            Some(TileTypeId(12))
        );
        let empty = TileTypeRegistry::default();
        assert_eq!(empty.cycle(TileTypeId(12), CycleDirection::Backward), None);
    }

    #[test]
    fn cycle_bound_attribute_extends_but_never_shrinks() {
        let registry = TileTypeRegistry::parse(
            &format!("<TileTypes cycleBound=\"400\">{}</TileTypes>", tile_type_xml("9", "a", "")),
            Path::new("tiles.xml"),
        )
        .expect("parse");
        assert_eq!(registry.cycle_bound(), 400);
        let registry = TileTypeRegistry::parse(
            &format!("<TileTypes cycleBound=\"3\">{}</TileTypes>", tile_type_xml("9", "a", "")),
            Path::new("tiles.xml"),
        )
        .expect("parse");
        assert_eq!(registry.cycle_bound(), 10);
    }

    #[test]
    fn cycle_bound_past_id_range_is_rejected() {
        let xml = |bound: &str| {
            format!(
                "<TileTypes cycleBound=\"{bound}\">{}</TileTypes>",
                tile_type_xml("5", "a", "")
            )
        };
        let err = TileTypeRegistry::parse(&xml("4294967295"), Path::new("tiles.xml"))
            .expect_err("oversized bound");
        assert_eq!(err.code(), Some(DefinitionErrorCode::InvalidValue));

        let registry =
            TileTypeRegistry::parse(&xml("65536"), Path::new("tiles.xml")).expect("max bound");
        assert_eq!(registry.cycle_bound(), 65536);
        assert_eq!(
            registry.cycle(TileTypeId(5), CycleDirection::Backward),
            Some(TileTypeId(5))
        );
        assert_eq!(
            registry.cycle(TileTypeId(u16::MAX), CycleDirection::Forward),
            Some(TileTypeId(5))
        );
    }

    #[test]
    fn failed_reload_keeps_previous_table() {
        let temp = TempDir::new().expect("temp");
        let good = temp.path().join("good.xml");
        let bad = temp.path().join("bad.xml");
        fs::write(
            &good,
            format!("<TileTypes>{}</TileTypes>", tile_type_xml("1", "Grass", "")),
        )
        .expect("write good");
        fs::write(&bad, "<TileTypes><TileType></TileTypes>").expect("write bad");

        let mut registry = TileTypeRegistry::load_types(&good).expect("load");
        assert!(registry.reload(&bad).is_err());
        assert!(registry.reload(&temp.path().join("missing.xml")).is_err());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(TileTypeId(1)));
    }

    #[test]
    fn first_with_attribute_finds_lowest_id() {
        let registry = parse(&format!(
            "{}{}",
            tile_type_xml("9", "late", "<attributes><attribute>Spawn</attribute></attributes>"),
            tile_type_xml("4", "early", "<attributes><attribute>Spawn</attribute></attributes>")
        ))
        .expect("parse");
        assert_eq!(
            registry.first_with_attribute(TileAttribute::Spawn),
            Some(TileTypeId(4))
        );
        assert_eq!(registry.first_with_attribute(TileAttribute::Finish), None);
    }
}
