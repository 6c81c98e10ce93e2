//! The grid layer.
//!
//! Ties a [`CoverageSource`] to the renderer: loads the domain, resolves the
//! time/vertical subset, loads the range, resolves the palette extent and
//! keeps an immutable [`RenderContext`] snapshot that tiles are drawn from.
//!
//! Every load takes a generation number. A completion is applied only if no
//! newer load has started and the layer is still attached, so a slow stale
//! response can never overwrite a newer one. Every `LoadStart` is paired with
//! a `LoadEnd` while the layer stays attached, applied or not.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use grid_common::time::{from_axis_value, to_axis_value};
use grid_common::{
    AxisId, AxisIndices, Domain, GridError, GridRange, LatLonBounds, Palette, PaletteExtent,
    PaletteExtentSpec, Parameter, TileCoord, TileImage,
};
use projection::MapProjection;
use renderer::{resolve_palette_extent, ColorMode, ContinuousLegend, LegendTemplate, RenderContext};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::config::{LayerOptions, RedrawMode};
use crate::error::Result;
use crate::events::LayerEvent;
use crate::source::CoverageSource;
use crate::subset::{resolve_subset, AxisSubset, SubsetPreference};

/// Buffered notifications per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 64;

/// Output of one pipeline run, not yet applied.
struct Loaded {
    domain: Arc<Domain>,
    subset: AxisSubset,
    range: GridRange,
}

/// Mutable layer state. Replaced field-wise under the write lock.
struct LayerState {
    subset: AxisSubset,
    palette: Palette,
    /// `None` for categorical parameters.
    extent_spec: Option<PaletteExtentSpec>,
    extent: Option<PaletteExtent>,
    domain: Option<Arc<Domain>>,
    range: Option<GridRange>,
    context: Option<Arc<RenderContext>>,
}

/// A coverage parameter drawn as map tiles.
pub struct GridLayer {
    source: Arc<dyn CoverageSource>,
    parameter: Parameter,
    redraw_mode: RedrawMode,
    tile_size: usize,
    state: RwLock<LayerState>,
    generation: AtomicU64,
    attached: AtomicBool,
    /// `Added` was sent since the layer was last attached.
    added: AtomicBool,
    events: broadcast::Sender<LayerEvent>,
}

impl GridLayer {
    /// Build a layer. Nothing is loaded until [`GridLayer::add`].
    ///
    /// Fails on an unknown parameter, a palette whose size does not match the
    /// categories, a palette extent for a categorical parameter, or missing
    /// category colours when no palette is given.
    pub fn new(source: Arc<dyn CoverageSource>, options: LayerOptions) -> Result<Self> {
        options.validate()?;

        let parameter = source
            .parameters()
            .get(&options.parameter)
            .cloned()
            .ok_or_else(|| GridError::ParameterNotFound(options.parameter.clone()))?;

        let palette = match (options.palette, parameter.categories()) {
            (Some(palette), Some(categories)) => {
                palette.ensure_matches_categories(categories)?;
                palette
            }
            (Some(palette), None) => palette,
            (None, Some(categories)) => Palette::from_categories(categories)?,
            (None, None) => Palette::default_continuous(),
        };

        let extent_spec = match (options.palette_extent, parameter.is_categorical()) {
            (Some(_), true) => {
                return Err(GridError::InvalidOperation(format!(
                    "palette extent given for categorical parameter '{}'",
                    parameter.key
                ))
                .into());
            }
            (None, true) => None,
            (spec, false) => Some(spec.unwrap_or_default()),
        };
        let extent = match extent_spec {
            Some(PaletteExtentSpec::Explicit(extent)) => Some(extent),
            _ => None,
        };

        let pref = SubsetPreference {
            t: options.time.as_ref().map(to_axis_value),
            z: options.vertical,
        };

        debug!(
            parameter = %parameter.key,
            categorical = parameter.is_categorical(),
            steps = palette.steps(),
            "Created grid layer"
        );

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            source,
            parameter,
            redraw_mode: options.redraw,
            tile_size: options.tile_size,
            state: RwLock::new(LayerState {
                subset: AxisSubset::unresolved(pref),
                palette,
                extent_spec,
                extent,
                domain: None,
                range: None,
                context: None,
            }),
            generation: AtomicU64::new(0),
            attached: AtomicBool::new(false),
            added: AtomicBool::new(false),
            events,
        })
    }

    /// Receive notifications from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LayerEvent> {
        self.events.subscribe()
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Number of loads started so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Attach the layer and load the current subset.
    ///
    /// Emits `LoadStart`, then `LoadEnd` and `Added` on success, or `Error`
    /// and `LoadEnd { ok: false }` on failure. `Added` is sent once per
    /// attachment, so a layer added again after `remove` sends it again.
    pub async fn add(&self) -> Result<()> {
        self.attached.store(true, Ordering::SeqCst);
        let generation = self.next_generation();
        self.run_pipeline(generation).await.map(|_| ())
    }

    /// Detach the layer. Loads still in flight complete as no-ops.
    pub fn remove(&self) {
        if self.attached.swap(false, Ordering::SeqCst) {
            self.added.store(false, Ordering::SeqCst);
            self.next_generation();
            debug!(parameter = %self.parameter.key, "Grid layer removed");
            let _ = self.events.send(LayerEvent::Removed);
        }
    }

    /// Select the time step nearest to `time`, or the first step for `None`.
    pub async fn set_time(&self, time: Option<DateTime<Utc>>) -> Result<()> {
        let t = time.as_ref().map(to_axis_value);
        self.change_subset(AxisId::T, t).await
    }

    /// Select the vertical level nearest to `vertical`, or the first for `None`.
    pub async fn set_vertical(&self, vertical: Option<f64>) -> Result<()> {
        self.change_subset(AxisId::Z, vertical).await
    }

    async fn change_subset(&self, axis: AxisId, pref: Option<f64>) -> Result<()> {
        {
            let mut state = self.write_state();
            match axis {
                AxisId::T => state.subset.t.coord_pref = pref,
                _ => state.subset.z.coord_pref = pref,
            }
        }
        if !self.is_attached() {
            return Ok(());
        }

        let generation = self.next_generation();
        if self.run_pipeline(generation).await? {
            self.emit(LayerEvent::AxisChanged { axis });
            self.redraw_on_change();
        }
        Ok(())
    }

    /// Replace the palette.
    ///
    /// For categorical parameters it must have one colour per category.
    pub fn set_palette(&self, palette: Palette) -> Result<()> {
        if let Some(categories) = self.parameter.categories() {
            palette.ensure_matches_categories(categories)?;
        }
        {
            let mut state = self.write_state();
            state.palette = palette;
            self.rebuild_context(&mut state)?;
        }
        self.emit(LayerEvent::PaletteChanged);
        self.redraw_on_change();
        Ok(())
    }

    /// Replace the palette extent policy and resolve it against the current
    /// subset.
    pub fn set_palette_extent(&self, spec: PaletteExtentSpec) -> Result<()> {
        if self.parameter.is_categorical() {
            return Err(GridError::InvalidOperation(format!(
                "palette extent does not apply to categorical parameter '{}'",
                self.parameter.key
            ))
            .into());
        }
        {
            let mut state = self.write_state();
            let extent = self.resolve_extent(Some(&spec), state.range.as_ref())?;
            state.extent_spec = Some(spec);
            state.extent = extent;
            self.rebuild_context(&mut state)?;
        }
        self.emit(LayerEvent::PaletteExtentChanged);
        self.redraw_on_change();
        Ok(())
    }

    /// Ask the host to draw the tiles again.
    pub fn redraw(&self) {
        self.emit(LayerEvent::Redraw);
    }

    /// Geographic bounds of the loaded grid.
    pub fn bounds(&self) -> Option<LatLonBounds> {
        self.snapshot().map(|ctx| ctx.bbox().to_lat_lon_bounds())
    }

    /// Draw one tile from the current snapshot. `None` until loaded.
    pub fn render_tile(
        &self,
        projection: &dyn MapProjection,
        tile: TileCoord,
    ) -> Option<TileImage> {
        let ctx = self.snapshot()?;
        Some(ctx.render_tile(projection, tile, self.tile_size))
    }

    /// Draw many tiles in parallel from one snapshot.
    pub fn render_tiles(
        &self,
        projection: &dyn MapProjection,
        tiles: &[TileCoord],
    ) -> Option<Vec<TileImage>> {
        let ctx = self.snapshot()?;
        Some(ctx.render_tiles(projection, tiles, self.tile_size))
    }

    /// Legend of the current palette and extent.
    ///
    /// `None` until an extent is known. Categorical parameters have none.
    pub fn legend(&self, template: &LegendTemplate) -> Result<Option<ContinuousLegend>> {
        let state = self.read_state();
        match state.extent {
            Some(extent) => Ok(Some(ContinuousLegend::new(
                &self.parameter,
                &state.palette,
                extent,
                template,
            )?)),
            None if self.parameter.is_categorical() => Err(GridError::InvalidOperation(format!(
                "parameter '{}' is categorical",
                self.parameter.key
            ))
            .into()),
            None => Ok(None),
        }
    }

    /// Time of the drawn slice.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.read_state().subset.t.coord.and_then(from_axis_value)
    }

    /// Vertical coordinate of the drawn slice.
    pub fn vertical(&self) -> Option<f64> {
        self.read_state().subset.z.coord
    }

    pub fn palette(&self) -> Palette {
        self.read_state().palette.clone()
    }

    pub fn palette_extent(&self) -> Option<PaletteExtent> {
        self.read_state().extent
    }

    pub fn palette_extent_spec(&self) -> Option<PaletteExtentSpec> {
        self.read_state().extent_spec
    }

    /// Available time steps; empty before load or without a time axis.
    pub fn time_slices(&self) -> Vec<DateTime<Utc>> {
        self.axis_values(AxisId::T)
            .into_iter()
            .filter_map(from_axis_value)
            .collect()
    }

    /// Available vertical levels; empty before load or without a z axis.
    pub fn vertical_slices(&self) -> Vec<f64> {
        self.axis_values(AxisId::Z)
    }

    fn axis_values(&self, axis: AxisId) -> Vec<f64> {
        let state = self.read_state();
        state
            .domain
            .as_ref()
            .and_then(|d| d.axis(axis))
            .map(|a| a.values().to_vec())
            .unwrap_or_default()
    }

    fn snapshot(&self) -> Option<Arc<RenderContext>> {
        self.read_state().context.clone()
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.is_attached() && self.generation.load(Ordering::SeqCst) == generation
    }

    fn emit(&self, event: LayerEvent) {
        if !self.is_attached() {
            return;
        }
        debug!(parameter = %self.parameter.key, event = event.name(), "Layer event");
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn redraw_on_change(&self) {
        if self.redraw_mode == RedrawMode::OnChange {
            self.emit(LayerEvent::Redraw);
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, LayerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LayerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the pipeline for `generation` and apply its result if still
    /// current.
    ///
    /// Returns whether the result was applied. A superseded load still ends
    /// with `LoadEnd` but sends no `Error`.
    async fn run_pipeline(&self, generation: u64) -> Result<bool> {
        self.emit(LayerEvent::LoadStart);

        let pref = self.read_state().subset.preference();
        let cached = self.read_state().domain.clone();

        let outcome = match self.load(pref, cached).await {
            Ok(loaded) => self.apply(generation, loaded),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(true) => {
                self.emit(LayerEvent::LoadEnd { ok: true });
                if self.is_attached() && !self.added.swap(true, Ordering::SeqCst) {
                    self.emit(LayerEvent::Added);
                }
                Ok(true)
            }
            Ok(false) => {
                self.emit(LayerEvent::LoadEnd { ok: true });
                Ok(false)
            }
            Err(err) if !self.is_current(generation) => {
                debug!(generation, error = %err, "Dropping failure of superseded load");
                self.emit(LayerEvent::LoadEnd { ok: false });
                Ok(false)
            }
            Err(err) => {
                error!(parameter = %self.parameter.key, error = %err, "Grid layer load failed");
                self.emit(LayerEvent::Error {
                    cause: err.to_string(),
                });
                self.emit(LayerEvent::LoadEnd { ok: false });
                Err(err)
            }
        }
    }

    /// Load domain → validate reference system → resolve subset → load range.
    async fn load(&self, pref: SubsetPreference, cached: Option<Arc<Domain>>) -> Result<Loaded> {
        let domain = match cached {
            Some(domain) => domain,
            None => {
                let domain = self.source.load_domain().await?;
                domain.ensure_grid()?;
                domain.ensure_geodetic()?;
                Arc::new(domain)
            }
        };

        let subset = resolve_subset(&domain, pref)?;
        let source = self.source.subset_by_index(&subset.indices()).await?;
        let range = source
            .load_range(&self.parameter.key)
            .await?
            .grid_view(&AxisIndices::default())?;

        Ok(Loaded {
            domain,
            subset,
            range,
        })
    }

    /// Resolve the extent and swap in a new snapshot.
    fn apply(&self, generation: u64, loaded: Loaded) -> Result<bool> {
        let mut state = self.write_state();
        if !self.is_current(generation) {
            debug!(
                generation,
                current = self.generation(),
                "Dropping stale load"
            );
            return Ok(false);
        }

        let extent = self.resolve_extent(state.extent_spec.as_ref(), Some(&loaded.range))?;
        let mode = ColorMode::for_parameter(&self.parameter, state.palette.clone(), extent)?;
        let context = RenderContext::new(&loaded.domain, loaded.range.clone(), mode)?;

        info!(
            parameter = %self.parameter.key,
            generation,
            t = ?loaded.subset.t.idx,
            z = ?loaded.subset.z.idx,
            bbox = ?context.bbox(),
            "Grid layer subset loaded"
        );

        state.subset = loaded.subset;
        state.extent = extent;
        state.domain = Some(loaded.domain);
        state.range = Some(loaded.range);
        state.context = Some(Arc::new(context));
        Ok(true)
    }

    fn resolve_extent(
        &self,
        spec: Option<&PaletteExtentSpec>,
        range: Option<&GridRange>,
    ) -> Result<Option<PaletteExtent>> {
        let Some(spec) = spec else {
            return Ok(None);
        };
        match (spec, range) {
            (_, Some(range)) => Ok(Some(resolve_palette_extent(spec, &self.parameter, range)?)),
            (PaletteExtentSpec::Explicit(extent), None) => Ok(Some(*extent)),
            (PaletteExtentSpec::Subset, None) => Ok(None),
            (PaletteExtentSpec::Fov, None) => {
                Err(GridError::NotImplemented("'fov' palette extent".to_string()).into())
            }
        }
    }

    /// Rebuild the snapshot after a palette or extent change.
    fn rebuild_context(&self, state: &mut LayerState) -> Result<()> {
        if let (Some(domain), Some(range)) = (&state.domain, &state.range) {
            let mode = ColorMode::for_parameter(&self.parameter, state.palette.clone(), state.extent)?;
            state.context = Some(Arc::new(RenderContext::new(domain, range.clone(), mode)?));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CoverageJsonSource;
    use test_utils::{grid, land_cover_coverage_json, temperature_coverage_json, time};

    fn temperature_source() -> Arc<dyn CoverageSource> {
        Arc::new(
            CoverageJsonSource::from_json(&temperature_coverage_json(
                &grid::SIMPLE_10X10,
                &time::SIX_HOURLY,
            ))
            .unwrap(),
        )
    }

    fn land_cover_source() -> Arc<dyn CoverageSource> {
        Arc::new(
            CoverageJsonSource::from_json(&land_cover_coverage_json(&grid::SIMPLE_10X10, None))
                .unwrap(),
        )
    }

    #[test]
    fn test_unknown_parameter() {
        let err = GridLayer::new(temperature_source(), LayerOptions::new("RH"))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            crate::LayerError::Grid(GridError::ParameterNotFound(_))
        ));
    }

    #[test]
    fn test_categorical_rejects_extent_and_bad_palette() {
        let options = LayerOptions::new("LC").with_palette_extent(PaletteExtentSpec::Subset);
        assert!(GridLayer::new(land_cover_source(), options).is_err());

        let options = LayerOptions::new("LC").with_palette(Palette::default_continuous());
        let err = GridLayer::new(land_cover_source(), options).err().unwrap();
        assert!(matches!(
            err,
            crate::LayerError::Grid(GridError::PaletteCategoryMismatch { .. })
        ));
    }

    #[test]
    fn test_default_palettes() {
        let layer = GridLayer::new(temperature_source(), LayerOptions::new("TMP")).unwrap();
        assert_eq!(layer.palette().steps(), 256);
        assert_eq!(layer.palette_extent_spec(), Some(PaletteExtentSpec::Subset));
        assert_eq!(layer.palette_extent(), None);

        let layer = GridLayer::new(land_cover_source(), LayerOptions::new("LC")).unwrap();
        assert_eq!(layer.palette().steps(), 4);
        assert_eq!(layer.palette_extent_spec(), None);
    }

    #[test]
    fn test_explicit_extent_known_before_load() {
        let spec = PaletteExtentSpec::explicit(0.0, 1.0).unwrap();
        let options = LayerOptions::new("TMP").with_palette_extent(spec);
        let layer = GridLayer::new(temperature_source(), options).unwrap();
        assert_eq!(layer.palette_extent(), Some(PaletteExtent::new(0.0, 1.0)));
    }

    #[tokio::test]
    async fn test_nothing_drawn_before_add() {
        let layer = GridLayer::new(temperature_source(), LayerOptions::new("TMP")).unwrap();
        assert!(layer.bounds().is_none());
        assert!(layer
            .render_tile(&projection::Equirectangular, TileCoord::new(0, 0, 0))
            .is_none());
        assert!(layer.time_slices().is_empty());

        // Preferences set while detached are kept for the first load
        layer.set_time(Some(from_axis_value(time::SIX_HOURLY_MS[2]).unwrap())).await.unwrap();
        assert_eq!(layer.generation(), 0);
        layer.add().await.unwrap();
        assert_eq!(layer.time(), from_axis_value(time::SIX_HOURLY_MS[2]));
    }
}
