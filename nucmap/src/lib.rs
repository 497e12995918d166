pub mod model;
pub mod config;
pub mod error;
pub mod palette;
pub mod iso;
pub mod ingest;
pub mod interaction;
pub mod choropleth;
pub mod markers;
pub mod projector;
pub mod stats;
pub mod geometry {
    pub mod limits;
    pub mod math;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod color_scale;
    pub mod declutter;
    pub mod grouping;
    pub mod majority;
    pub mod picking;
}

use algorithms::color_scale::ColorScale;
use algorithms::grouping::{group, Grouping};
use algorithms::picking::MarkerPick;
use choropleth::{apply_search, fill_for, matches_query, ReportSelection};
use config::MapConfig;
use error::{IngestError, ScaleError};
use ingest::{Loaded, Mode};
use interaction::{GroupLookup, InteractionState, MapEvent, Transition};
use markers::MarkerGlyph;
use model::{
    Color, CountryRow, FeatureKind, FeatureRef, GroupRef, LocationGroup, LonLat, PointFeature,
    ReactorStatistic, ReportTable,
};
use projector::GeoProjector;
use serde::Serialize;
use serde_json::Value;

/// Outcome of one load call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
    /// Loaded rows that carry no usable position (point layers only).
    pub ungeolocated: usize,
}

/// Everything the renderer needs to paint one country.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountryStyle {
    pub iso3: String,
    pub fill: Color,
    pub hover: Color,
    pub pressed: Color,
    pub stroke: Color,
    pub matches_query: bool,
    /// The data source has a record for this country.
    pub has_data: bool,
    pub focused: bool,
}

struct Layers<'a> {
    plants: &'a Grouping,
    waste: &'a Grouping,
}

impl<'a> Layers<'a> {
    fn of(&self, layer: FeatureKind) -> &'a Grouping {
        match layer {
            FeatureKind::Plant => self.plants,
            FeatureKind::WasteFacility => self.waste,
        }
    }
}

impl GroupLookup for Layers<'_> {
    fn group(&self, r: GroupRef) -> Option<&LocationGroup> {
        self.of(r.layer).get(r.key)
    }
    fn has_feature(&self, f: FeatureRef) -> bool {
        self.of(f.kind).groups.iter().any(|g| g.members.iter().any(|m| m.id == f.id))
    }
}

/// One map session: loaded rows, their derived groupings, the active report
/// and the interaction state. Every reload rebuilds the derived data.
pub struct NuclearMap {
    pub(crate) config: MapConfig,
    pub(crate) scale: ColorScale,
    pub(crate) countries: Vec<CountryRow>,
    pub(crate) plants: Vec<PointFeature>,
    pub(crate) waste: Vec<PointFeature>,
    pub(crate) plant_groups: Grouping,
    pub(crate) waste_groups: Grouping,
    pub(crate) reports: Vec<ReportTable>,
    pub(crate) active_report: Option<ReportSelection>,
    pub(crate) stats: Vec<ReactorStatistic>,
    pub(crate) query: String,
    pub(crate) ui: InteractionState,
    pub(crate) data_ver: u64,
}

impl Default for NuclearMap {
    fn default() -> Self {
        NuclearMap::new()
    }
}

impl NuclearMap {
    pub fn new() -> Self {
        NuclearMap::with_config(MapConfig::default())
    }

    /// `config` is taken as given; use `set_config` to validate.
    pub fn with_config(config: MapConfig) -> Self {
        let zoom = geometry::tolerance::clamp(1.0, config.min_zoom, config.max_zoom);
        let ui = InteractionState::new(zoom, config.initial_center, config.spiderify_zoom_threshold);
        NuclearMap {
            scale: ColorScale::default(),
            countries: Vec::new(),
            plants: Vec::new(),
            waste: Vec::new(),
            plant_groups: Grouping { precision: config.grid_precision, ..Default::default() },
            waste_groups: Grouping { precision: config.grid_precision, ..Default::default() },
            reports: Vec::new(),
            active_report: None,
            stats: Vec::new(),
            query: String::new(),
            ui,
            data_ver: 1,
            config,
        }
    }

    pub fn data_version(&self) -> u64 {
        self.data_ver
    }

    fn bump(&mut self) {
        self.data_ver = self.data_ver.wrapping_add(1);
    }

    fn layers(&self) -> Layers<'_> {
        Layers { plants: &self.plant_groups, waste: &self.waste_groups }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MapConfig) -> Result<(), IngestError> {
        config.validate()?;
        let regroup = config.grid_precision != self.config.grid_precision;
        self.ui.spiderify_zoom_threshold = config.spiderify_zoom_threshold;
        self.ui.zoom = geometry::tolerance::clamp(self.ui.zoom, config.min_zoom, config.max_zoom);
        self.config = config;
        if regroup {
            self.regroup(FeatureKind::Plant);
            self.regroup(FeatureKind::WasteFacility);
        }
        self.bump();
        Ok(())
    }

    fn regroup(&mut self, layer: FeatureKind) {
        let precision = self.config.grid_precision;
        match layer {
            FeatureKind::Plant => self.plant_groups = group(&self.plants, precision),
            FeatureKind::WasteFacility => self.waste_groups = group(&self.waste, precision),
        }
        let layers = Layers { plants: &self.plant_groups, waste: &self.waste_groups };
        self.ui.retain_valid(layer, &layers);
    }

    pub fn grouping(&self, layer: FeatureKind) -> &Grouping {
        self.layers().of(layer)
    }

    // Loading. A failed load leaves the previous rows in place; a successful
    // one replaces them whole.

    pub fn load_countries(&mut self, v: Value, mode: Mode) -> Result<LoadSummary, IngestError> {
        let Loaded { rows, skipped } = ingest::countries_from_json(v, mode)?;
        let summary = LoadSummary { loaded: rows.len(), skipped, ungeolocated: 0 };
        self.countries = rows;
        self.bump();
        Ok(summary)
    }

    pub fn load_features(&mut self, layer: FeatureKind, v: Value, mode: Mode) -> Result<LoadSummary, IngestError> {
        let Loaded { rows, skipped } = match layer {
            FeatureKind::Plant => ingest::plants_from_json(v, mode)?,
            FeatureKind::WasteFacility => ingest::waste_facilities_from_json(v, mode)?,
        };
        let summary = LoadSummary {
            loaded: rows.len(),
            skipped,
            ungeolocated: rows.iter().filter(|f| f.position.is_none()).count(),
        };
        match layer {
            FeatureKind::Plant => self.plants = rows,
            FeatureKind::WasteFacility => self.waste = rows,
        }
        self.regroup(layer);
        self.bump();
        Ok(summary)
    }

    /// Replaces the report tables. The active report is re-derived from the new
    /// table with the same id, or cleared if it is gone.
    pub fn load_reports(&mut self, v: Value, mode: Mode) -> Result<LoadSummary, IngestError> {
        let loaded = ingest::report_tables_from_json(v, mode)?;
        Ok(self.install_reports(loaded))
    }

    pub fn load_reports_flat(&mut self, tables: Value, data: Value, mode: Mode) -> Result<LoadSummary, IngestError> {
        let loaded = ingest::report_tables_from_flat_json(tables, data, mode)?;
        Ok(self.install_reports(loaded))
    }

    fn install_reports(&mut self, loaded: Loaded<ReportTable>) -> LoadSummary {
        let summary = LoadSummary { loaded: loaded.rows.len(), skipped: loaded.skipped, ungeolocated: 0 };
        self.reports = loaded.rows;
        let active_id = self.active_report.as_ref().map(|r| r.table_id.clone());
        self.active_report = None;
        if let Some(id) = active_id {
            if let Err(e) = self.select_report(&id) {
                log::debug!("active report dropped on reload: {}", e);
            }
        }
        self.bump();
        summary
    }

    pub fn load_reactor_stats(&mut self, v: Value, mode: Mode) -> Result<LoadSummary, IngestError> {
        let Loaded { rows, skipped } = ingest::reactor_stats_from_json(v, mode)?;
        let summary = LoadSummary { loaded: rows.len(), skipped, ungeolocated: 0 };
        self.stats = rows;
        self.bump();
        Ok(summary)
    }

    // Reports and search

    pub fn report_tables(&self) -> &[ReportTable] {
        &self.reports
    }

    pub fn active_report(&self) -> Option<&ReportSelection> {
        self.active_report.as_ref()
    }

    pub fn select_report(&mut self, id: &str) -> Result<(), IngestError> {
        let table = self.reports.iter().find(|t| t.id == id).ok_or_else(|| IngestError::unknown_report(id))?;
        self.active_report = Some(ReportSelection::from_table(table)?);
        Ok(())
    }

    pub fn clear_report(&mut self) {
        self.active_report = None;
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    // Countries

    pub fn countries(&self) -> &[CountryRow] {
        &self.countries
    }

    pub fn country(&self, iso3: &str) -> Option<&CountryRow> {
        self.countries.iter().find(|c| iso::same_country(&c.iso3, iso3))
    }

    /// Paint for one boundary feature. `raw_iso3` and `name` come from the
    /// boundary data; `continent` too when it has one, otherwise the country
    /// row's region is used.
    pub fn country_style(&self, raw_iso3: &str, name: &str, continent: Option<&str>) -> Result<CountryStyle, ScaleError> {
        let iso3 = iso::normalize_iso3(raw_iso3, name);
        let row = self.country(&iso3);
        let fill = fill_for(&iso3, self.active_report.as_ref(), &self.scale, |_| {
            continent.map(str::to_string).or_else(|| row.and_then(|c| c.region.clone()))
        })?;
        let focused = self.ui.focused_iso3.as_deref().is_some_and(|f| iso::same_country(f, &iso3));
        Ok(CountryStyle {
            fill: apply_search(fill, name, &iso3, &self.query),
            hover: palette::COUNTRY_HOVER,
            pressed: palette::COUNTRY_PRESSED,
            stroke: palette::COUNTRY_STROKE,
            matches_query: matches_query(name, &iso3, &self.query),
            has_data: row.is_some(),
            focused,
            iso3,
        })
    }

    pub fn legend(&self) -> Vec<(&'static str, Color)> {
        palette::CONTINENTS.to_vec()
    }

    // Markers

    pub fn feature(&self, f: FeatureRef) -> Option<&PointFeature> {
        let rows = match f.kind {
            FeatureKind::Plant => &self.plants,
            FeatureKind::WasteFacility => &self.waste,
        };
        rows.iter().find(|p| p.id == f.id)
    }

    pub fn glyphs(&self, layer: FeatureKind) -> Vec<MarkerGlyph> {
        markers::build_glyphs(layer, self.grouping(layer), &self.ui, self.config.base_offset(layer))
    }

    /// Plants are drawn first, waste facilities on top.
    pub fn all_glyphs(&self) -> Vec<MarkerGlyph> {
        let mut out = self.glyphs(FeatureKind::Plant);
        out.extend(self.glyphs(FeatureKind::WasteFacility));
        out
    }

    pub fn pick<P: GeoProjector + ?Sized>(&self, proj: &P, x: f64, y: f64, tol: f64) -> Option<MarkerPick> {
        algorithms::picking::pick_impl(&self.all_glyphs(), proj, x, y, tol)
    }

    // Interaction

    pub fn interaction(&self) -> &InteractionState {
        &self.ui
    }

    /// Routes an event through the marker state machine. View changes are
    /// clamped to the configured zoom range; non-finite views are ignored.
    pub fn handle_event(&mut self, event: MapEvent) -> Transition {
        let event = match event {
            MapEvent::ViewChanged { zoom, center } => {
                if !zoom.is_finite() || !center.lon.is_finite() || !center.lat.is_finite() {
                    log::warn!("ignoring non-finite view change");
                    return Transition::Ignored;
                }
                let zoom = geometry::tolerance::clamp(zoom, self.config.min_zoom, self.config.max_zoom);
                MapEvent::ViewChanged { zoom, center }
            }
            other => other,
        };
        let layers = Layers { plants: &self.plant_groups, waste: &self.waste_groups };
        self.ui.apply(&event, &layers)
    }

    pub fn set_view(&mut self, zoom: f64, center: LonLat) -> Transition {
        self.handle_event(MapEvent::ViewChanged { zoom, center })
    }

    pub fn selected_feature(&self) -> Option<&PointFeature> {
        self.ui.selected_feature().and_then(|f| self.feature(f))
    }

    pub fn selected_country(&self) -> Option<&CountryRow> {
        self.ui.selected_country().and_then(|iso| self.country(iso))
    }

    // Statistics

    pub fn reactor_stats(&self) -> &[ReactorStatistic] {
        &self.stats
    }

    pub fn top_reactor_stats(&self, n: usize) -> Vec<ReactorStatistic> {
        stats::top_by_capacity(&self.stats, n)
    }

    pub fn unit_totals(&self) -> stats::UnitTotals {
        stats::unit_totals(&self.stats)
    }
}
