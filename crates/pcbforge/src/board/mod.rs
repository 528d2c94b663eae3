//! The board aggregate.
//!
//! A [`Board`] owns every component, layer, via, zone, hole and text record
//! of one design. Routing and fill operations are lowered into layer
//! instruction streams as soon as they are issued; nothing is removed once
//! added.

pub mod component;
pub mod items;
pub mod layer;

use std::io::Read;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use component::{Component, Pad, Pin};
pub use items::{Hole, TextAnnotation, Via, Zone};
pub use layer::{
    Feature, FeatureKind, Layer, BOTTOM_COPPER, BOTTOM_SILK, FALLBACK_TRACE_WIDTH, HOLES_LAYER,
    TOP_COPPER, TOP_SILK,
};

use crate::drc::{check_board, DrcThresholds};
use crate::error::{BoardError, ConfigError, DrcError};
use crate::geometry::{Point, Polygon};
use crate::rules::{Ruleset, DEFAULT_SERVICE, LAYER_SERVICE_RULES};

/// Number of sides used to approximate drill and annulus circles.
pub const HOLE_SEGMENTS: u32 = 12;

/// Construction parameters for a [`Board`], usually loaded from JSON.
///
/// ```json
/// { "name": "blinky", "width": 50, "height": 30,
///   "service": "2 Layer", "layers": ["GTL", "GBL", "GTO", "GBO"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Design name.
    pub name: String,
    /// Board width in millimetres.
    pub width: f64,
    /// Board height in millimetres.
    pub height: f64,
    /// Manufacturing service tier checked by DRC.
    pub service: String,
    /// Layers created up front, in stack order.
    pub layers: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Board".to_string(),
            width: 100.0,
            height: 80.0,
            service: DEFAULT_SERVICE.to_string(),
            layers: vec![TOP_SILK.to_string(), BOTTOM_SILK.to_string()],
        }
    }
}

impl BoardConfig {
    /// Parses a configuration document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration document from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on I/O or format errors.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// A complete board design.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    name: String,
    width: f64,
    height: f64,
    service: String,
    #[serde(skip)]
    ruleset: Ruleset,
    components: IndexMap<String, Component>,
    layers: IndexMap<String, Layer>,
    vias: Vec<Via>,
    zones: Vec<Zone>,
    holes: Vec<Hole>,
    texts: Vec<TextAnnotation>,
    outline: Polygon,
}

impl Board {
    /// Creates a board with the default silkscreen layers and a rectangular
    /// outline.
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        let mut board = Self {
            name: name.into(),
            width,
            height,
            service: DEFAULT_SERVICE.to_string(),
            ruleset: LAYER_SERVICE_RULES.clone(),
            components: IndexMap::new(),
            layers: IndexMap::new(),
            vias: Vec::new(),
            zones: Vec::new(),
            holes: Vec::new(),
            texts: Vec::new(),
            outline: Polygon::rectangle(width, height),
        };
        board.set_layer_stack([TOP_SILK, BOTTOM_SILK]);
        log::debug!("created board {} ({width} x {height} mm)", board.name);
        board
    }

    /// Creates a board from a loaded configuration.
    pub fn from_config(config: &BoardConfig) -> Self {
        let mut board = Self {
            service: config.service.clone(),
            ..Self::new(config.name.clone(), config.width, config.height)
        };
        board.set_layer_stack(config.layers.iter().cloned());
        board
    }

    /// Selects the manufacturing service tier.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Replaces the ruleset used to resolve service tiers.
    #[must_use]
    pub fn with_ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = ruleset;
        self
    }

    /// Design name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nominal width in millimetres.
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Nominal height in millimetres.
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Selected service tier.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Ruleset used for threshold resolution.
    pub const fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Adds every missing layer in `names`, keeping existing layers and
    /// their contents.
    pub fn set_layer_stack<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.layers.contains_key(&name) {
                log::debug!("{}: adding layer {name}", self.name);
                self.layers.insert(name.clone(), Layer::new(name));
            }
        }
    }

    /// Places a component.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::DuplicateReference`] when `reference` is
    /// already taken.
    pub fn add_component(
        &mut self,
        reference: impl Into<String>,
        kind: impl Into<String>,
        at: impl Into<Point>,
        rotation_deg: f64,
    ) -> Result<&mut Component, BoardError> {
        let reference = reference.into();
        if self.components.contains_key(&reference) {
            return Err(BoardError::DuplicateReference(reference));
        }
        let at = at.into();
        log::debug!(
            "{}: placing {reference} at ({:.3}, {:.3}) rotated {rotation_deg} deg",
            self.name,
            at.x,
            at.y
        );
        let component = Component::new(reference.clone(), kind, at, rotation_deg);
        Ok(self.components.entry(reference).or_insert(component))
    }

    /// Looks up a component by reference designator.
    pub fn component(&self, reference: &str) -> Option<&Component> {
        self.components.get(reference)
    }

    /// Mutable lookup, for adding pins and pads after placement.
    pub fn component_mut(&mut self, reference: &str) -> Option<&mut Component> {
        self.components.get_mut(reference)
    }

    /// Components in placement order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Resolves a `REF:PIN` string to a pin.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::MalformedPinReference`] without a `:`,
    /// [`BoardError::UnknownComponent`] or [`BoardError::UnknownPin`] when
    /// either half does not resolve.
    pub fn find_pin(&self, pin_ref: &str) -> Result<&Pin, BoardError> {
        let Some((reference, pin)) = pin_ref.split_once(':') else {
            return Err(BoardError::MalformedPinReference(pin_ref.to_string()));
        };
        let component = self
            .components
            .get(reference)
            .ok_or_else(|| BoardError::UnknownComponent(reference.to_string()))?;
        component.pin(pin).ok_or_else(|| BoardError::UnknownPin {
            reference: reference.to_string(),
            pin: pin.to_string(),
        })
    }

    /// Adds a straight trace between two points.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownLayer`] when `layer` is not in the stack.
    pub fn trace(
        &mut self,
        from: impl Into<Point>,
        to: impl Into<Point>,
        layer: &str,
        width: f64,
    ) -> Result<(), BoardError> {
        let target = self.layer_mut(layer)?;
        target.push_feature(
            FeatureKind::Trace,
            Some(width),
            vec![from.into(), to.into()],
        );
        Ok(())
    }

    /// Adds a polyline trace with a single width.
    ///
    /// Fewer than two points emit nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownLayer`] when `layer` is not in the stack.
    pub fn trace_path<I, P>(&mut self, points: I, layer: &str, width: f64) -> Result<(), BoardError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        let points: Vec<Point> = points.into_iter().map(Into::into).collect();
        let target = self.layer_mut(layer)?;
        if points.len() < 2 {
            log::warn!(
                "trace path on {layer} has {} point(s); nothing emitted",
                points.len()
            );
            return Ok(());
        }
        target.push_feature(FeatureKind::TracePath, Some(width), points);
        Ok(())
    }

    /// Routes a trace path between two `REF:PIN` references through `bends`.
    ///
    /// # Errors
    ///
    /// Propagates pin lookup failures from [`Board::find_pin`] and
    /// [`BoardError::UnknownLayer`].
    pub fn route_trace(
        &mut self,
        start: &str,
        end: &str,
        layer: &str,
        width: f64,
        bends: &[Point],
    ) -> Result<(), BoardError> {
        let first = self.find_pin(start)?.position();
        let last = self.find_pin(end)?.position();

        let mut points = Vec::with_capacity(bends.len() + 2);
        points.push(first);
        points.extend_from_slice(bends);
        points.push(last);

        log::debug!("{}: routing {start} -> {end} on {layer}", self.name);
        self.trace_path(points, layer, width)
    }

    /// Records a via. Vias do not emit layer instructions.
    pub fn add_via(
        &mut self,
        at: impl Into<Point>,
        from_layer: impl Into<String>,
        to_layer: impl Into<String>,
        diameter: f64,
        hole: f64,
    ) -> Via {
        let via = Via {
            position: at.into(),
            from_layer: from_layer.into(),
            to_layer: to_layer.into(),
            diameter,
            hole,
        };
        self.vias.push(via.clone());
        via
    }

    /// Records a zone without geometry.
    pub fn add_filled_zone(&mut self, net: Option<&str>, layer: impl Into<String>) -> Zone {
        let zone = Zone {
            net: net.map(str::to_string),
            layer: layer.into(),
            geometry: None,
        };
        self.zones.push(zone.clone());
        zone
    }

    /// Fills a closed copper region, creating the layer when needed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::DegeneratePolygon`] when `points` enclose no
    /// area.
    pub fn fill(
        &mut self,
        points: &[Point],
        layer: &str,
        net: Option<&str>,
    ) -> Result<Zone, BoardError> {
        let polygon = Polygon::new(points)?;
        self.layers
            .entry(layer.to_string())
            .or_insert_with(|| Layer::new(layer))
            .push_feature(FeatureKind::Region, None, polygon.exterior().to_vec());

        let zone = Zone {
            net: net.map(str::to_string),
            layer: layer.to_string(),
            geometry: Some(polygon),
        };
        self.zones.push(zone.clone());
        Ok(zone)
    }

    /// Records a drilled hole and draws its ring approximations on
    /// [`HOLES_LAYER`].
    pub fn hole(&mut self, at: impl Into<Point>, diameter: f64, annulus: Option<f64>) -> Hole {
        let hole = Hole {
            position: at.into(),
            diameter,
            annulus,
        };
        let rings = self
            .layers
            .entry(HOLES_LAYER.to_string())
            .or_insert_with(|| Layer::new(HOLES_LAYER));

        rings.push_feature(
            FeatureKind::Ring,
            None,
            Polygon::regular_ring(hole.position, hole.radius(), HOLE_SEGMENTS),
        );
        if let Some(annulus) = annulus {
            rings.push_feature(
                FeatureKind::Ring,
                None,
                Polygon::regular_ring(hole.position, hole.radius() + annulus, HOLE_SEGMENTS),
            );
        }

        self.holes.push(hole);
        hole
    }

    /// Replaces the board outline.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::DegeneratePolygon`] when `points` enclose no
    /// area.
    pub fn outline(&mut self, points: &[Point]) -> Result<&Polygon, BoardError> {
        self.outline = Polygon::new(points)?;
        Ok(&self.outline)
    }

    /// Grows the outline by `margin` millimetres on every side.
    pub fn oversize(&mut self, margin: f64) -> &Polygon {
        self.outline = self.outline.offset(margin);
        &self.outline
    }

    /// Appends literal content, such as flattened glyphs, to a layer.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownLayer`] when `layer` is not in the stack.
    pub fn add_raw(&mut self, layer: &str, literal: impl Into<String>) -> Result<(), BoardError> {
        self.layer_mut(layer)?.push_raw(literal);
        Ok(())
    }

    /// Records a silkscreen text placement.
    pub fn annotate(
        &mut self,
        text: impl Into<String>,
        at: impl Into<Point>,
        height: f64,
        thickness: f64,
        layer: impl Into<String>,
    ) -> TextAnnotation {
        let annotation = TextAnnotation {
            text: text.into(),
            position: at.into(),
            height,
            thickness,
            layer: layer.into(),
        };
        self.texts.push(annotation.clone());
        annotation
    }

    /// Looks up a layer by name.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Layers in stack order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// Vias in creation order.
    pub fn vias(&self) -> &[Via] {
        &self.vias
    }

    /// Zones in creation order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Holes in creation order.
    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    /// Text annotations in creation order.
    pub fn texts(&self) -> &[TextAnnotation] {
        &self.texts
    }

    /// Current outline.
    pub const fn board_outline(&self) -> &Polygon {
        &self.outline
    }

    /// Resolves DRC thresholds for this board's service tier.
    pub fn thresholds(
        &self,
        min_trace_width: Option<f64>,
        min_clearance: Option<f64>,
    ) -> DrcThresholds {
        self.ruleset
            .thresholds(&self.service, min_trace_width, min_clearance)
    }

    /// Runs the design rule check as a hard gate.
    ///
    /// # Errors
    ///
    /// Returns [`DrcError::Violations`] carrying every violation message
    /// when any rule fails.
    pub fn design_rule_check(
        &self,
        min_trace_width: Option<f64>,
        min_clearance: Option<f64>,
    ) -> Result<(), DrcError> {
        let thresholds = self.thresholds(min_trace_width, min_clearance);
        let violations = check_board(self, &thresholds);
        if violations.is_empty() {
            return Ok(());
        }
        Err(DrcError::Violations(
            violations.iter().map(ToString::to_string).collect(),
        ))
    }

    /// Serialises the board snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; plain board data does not produce one
    /// in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn layer_mut(&mut self, name: &str) -> Result<&mut Layer, BoardError> {
        self.layers
            .get_mut(name)
            .ok_or_else(|| BoardError::UnknownLayer(name.to_string()))
    }
}
