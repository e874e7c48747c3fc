//! Scene adapter
//!
//! Owns everything a frame reads (backend, model group, camera, controls)
//! inside one [`RenderContext`] and runs the file pipeline against it:
//! clear the previous model, import, materialize, fit the camera. Teardown
//! takes the whole context out in one step, so after [`SceneAdapter::dispose`]
//! no frame can observe half-released state.

use cv_core::{
    BoundingBox, CadFormat, CadImporter, ImportError, ImportResult, Materialized, SkippedMesh,
    TessellationParams, import_bytes, materialize,
};

use crate::camera::{Camera, CameraFit};
use crate::controls::OrbitControls;
use crate::scene::{ModelGroup, SceneBackend};

/// Errors surfaced by the scene adapter
#[derive(Debug, Clone, thiserror::Error)]
pub enum ViewerError {
    /// An import is already outstanding
    #[error("An import is already in progress")]
    Busy,

    /// The adapter has been torn down
    #[error("Viewer has been disposed")]
    Disposed,

    /// The import pipeline failed
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Frame callback state
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    running: bool,
    frames: u64,
}

impl FrameLoop {
    /// A loop that is scheduling frames
    pub fn started() -> Self {
        Self {
            running: true,
            frames: 0,
        }
    }

    /// Whether frames are still being scheduled
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Stop scheduling frames
    pub fn cancel(&mut self) {
        self.running = false;
    }
}

/// Per-frame state, valid until teardown
pub struct RenderContext<B: SceneBackend> {
    /// GPU backend
    pub backend: B,
    /// Meshes on display
    pub model: ModelGroup<B>,
    /// Scene camera
    pub camera: Camera,
    /// Orbit controller, if interaction is enabled
    pub controls: Option<OrbitControls>,
    frame_loop: FrameLoop,
}

impl<B: SceneBackend> RenderContext<B> {
    /// Frame callback state
    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    fn fit_camera(&mut self) -> Option<CameraFit> {
        let bounds = self.model.bounds();
        let fit = self.camera.fit_to_bounds(bounds.as_ref());
        self.sync_controls();
        fit
    }

    fn sync_controls(&mut self) {
        if let Some(controls) = self.controls.as_mut() {
            controls.set_target(self.camera.target);
            controls.sync_from_camera(&self.camera);
        }
    }
}

/// What the last successful import put on screen
#[derive(Debug, Clone, Default)]
pub struct SceneSummary {
    /// Meshes added to the model group
    pub mesh_count: usize,
    /// Records that could not be materialized
    pub skipped: Vec<SkippedMesh>,
    /// Triangles on display
    pub triangle_count: usize,
    /// Union bounds of the model
    pub bounds: Option<BoundingBox>,
    /// Camera framing, `None` when the default pose was used
    pub fit: Option<CameraFit>,
}

/// Drives the import pipeline and owns the render context
pub struct SceneAdapter<B: SceneBackend> {
    context: Option<RenderContext<B>>,
    busy: bool,
    last_result: Option<ImportResult>,
}

impl<B: SceneBackend> SceneAdapter<B> {
    /// Create an adapter around a backend; the frame loop starts immediately
    pub fn new(backend: B, camera: Camera, controls_enabled: bool) -> Self {
        let controls = controls_enabled.then(|| OrbitControls::new(&camera));
        Self {
            context: Some(RenderContext {
                backend,
                model: ModelGroup::new(),
                camera,
                controls,
                frame_loop: FrameLoop::started(),
            }),
            busy: false,
            last_result: None,
        }
    }

    /// The render context, `None` after teardown
    pub fn context(&self) -> Option<&RenderContext<B>> {
        self.context.as_ref()
    }

    /// Mutable render context, `None` after teardown
    pub fn context_mut(&mut self) -> Option<&mut RenderContext<B>> {
        self.context.as_mut()
    }

    /// Whether an import is outstanding
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the adapter has been torn down
    pub fn is_disposed(&self) -> bool {
        self.context.is_none()
    }

    /// Whether frames are still being rendered
    pub fn is_running(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|ctx| ctx.frame_loop.is_running())
    }

    /// The last kernel result, successful or not
    pub fn last_result(&self) -> Option<&ImportResult> {
        self.last_result.as_ref()
    }

    /// Claim the pipeline for a new file and clear the previous model.
    ///
    /// Rejected with [`ViewerError::Busy`] while another import is
    /// outstanding; the running import and its scene are left untouched.
    pub fn begin_import(&mut self) -> Result<(), ViewerError> {
        if self.busy {
            tracing::warn!("Import rejected: another import is in progress");
            return Err(ViewerError::Busy);
        }
        let ctx = self.context.as_mut().ok_or(ViewerError::Disposed)?;

        let removed = ctx.model.clear(&mut ctx.backend);
        if removed > 0 {
            tracing::info!("Cleared previous model ({} meshes)", removed);
        }
        self.last_result = None;
        self.busy = true;
        Ok(())
    }

    /// Complete the import claimed by [`SceneAdapter::begin_import`].
    ///
    /// A failed import leaves the scene cleared.
    pub fn finish_import(
        &mut self,
        outcome: Result<ImportResult, ImportError>,
    ) -> Result<SceneSummary, ViewerError> {
        if !self.busy {
            tracing::warn!("finish_import called without a pending import");
        }
        self.busy = false;

        if self.context.is_none() {
            tracing::debug!("Import finished after teardown, result discarded");
            return Err(ViewerError::Disposed);
        }

        match outcome {
            Ok(result) => {
                let summary = self.show_result(&result)?;
                self.last_result = Some(result);
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.last_result = e.result().cloned();
                Err(ViewerError::Import(e))
            }
        }
    }

    /// Run the whole pipeline for one in-memory file
    ///
    /// An unsupported extension is rejected before the current model is
    /// touched.
    pub fn process_file<I: CadImporter + ?Sized>(
        &mut self,
        importer: &I,
        file_name: &str,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<SceneSummary, ViewerError> {
        if CadFormat::from_file_name(file_name).is_none() {
            let err = ImportError::UnsupportedFormat(file_name.to_string());
            tracing::warn!("{}", err);
            return Err(ViewerError::Import(err));
        }
        self.begin_import()?;
        let outcome = import_bytes(importer, file_name, data, params);
        self.finish_import(outcome)
    }

    /// Materialize a successful result into the model group and frame it
    pub fn show_result(&mut self, result: &ImportResult) -> Result<SceneSummary, ViewerError> {
        let ctx = self.context.as_mut().ok_or(ViewerError::Disposed)?;

        let Materialized { meshes, skipped } = materialize(result);
        for mesh in &meshes {
            ctx.model.add(&mut ctx.backend, mesh);
        }

        let fit = ctx.fit_camera();
        let summary = SceneSummary {
            mesh_count: ctx.model.len(),
            skipped,
            triangle_count: ctx.model.triangle_count(),
            bounds: ctx.model.bounds(),
            fit,
        };

        tracing::info!(
            "Scene updated: {} meshes, {} skipped, {} triangles",
            summary.mesh_count,
            summary.skipped.len(),
            summary.triangle_count
        );
        Ok(summary)
    }

    /// Frame the current model, or reset the camera if there is none
    pub fn fit_camera(&mut self) -> Option<CameraFit> {
        self.context.as_mut().and_then(|ctx| ctx.fit_camera())
    }

    /// Return the camera to the default pose
    pub fn reset_camera(&mut self) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.camera.reset();
            ctx.sync_controls();
        }
    }

    /// Remove the current model without importing anything
    pub fn clear_model(&mut self) -> usize {
        self.last_result = None;
        self.context
            .as_mut()
            .map_or(0, |ctx| ctx.model.clear(&mut ctx.backend))
    }

    /// Viewport size changed
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.camera.update_aspect(width, height);
            ctx.backend.resize(width, height);
        }
    }

    /// Orbit the camera by a drag delta in pixels
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        if let Some(ctx) = self.context.as_mut()
            && let Some(controls) = ctx.controls.as_mut()
        {
            controls.rotate(&mut ctx.camera, delta_x, delta_y);
        }
    }

    /// Pan the camera by a drag delta in pixels
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        if let Some(ctx) = self.context.as_mut()
            && let Some(controls) = ctx.controls.as_mut()
        {
            controls.pan(&mut ctx.camera, delta_x, delta_y);
        }
    }

    /// Zoom the camera; positive moves closer
    pub fn zoom(&mut self, delta: f32) {
        if let Some(ctx) = self.context.as_mut()
            && let Some(controls) = ctx.controls.as_mut()
        {
            controls.zoom(&mut ctx.camera, delta);
        }
    }

    /// Run one frame against the render context.
    ///
    /// Returns `None` without calling `draw` once the frame loop has been
    /// cancelled.
    pub fn render_frame<R>(&mut self, draw: impl FnOnce(&mut RenderContext<B>) -> R) -> Option<R> {
        let ctx = self.context.as_mut()?;
        if !ctx.frame_loop.is_running() {
            return None;
        }
        ctx.frame_loop.frames += 1;
        Some(draw(ctx))
    }

    /// Tear everything down. Safe to call more than once.
    ///
    /// Order: stop the frame loop, release every mesh, release the backend
    /// and controller, then drop the camera and model group.
    pub fn dispose(&mut self) {
        let Some(mut ctx) = self.context.take() else {
            return;
        };

        ctx.frame_loop.cancel();
        let removed = ctx.model.clear(&mut ctx.backend);
        ctx.backend.release();
        ctx.controls = None;
        drop(ctx);

        self.busy = false;
        self.last_result = None;
        tracing::info!("Scene disposed ({} meshes released)", removed);
    }
}

impl<B: SceneBackend> Drop for SceneAdapter<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use cv_core::{
        CadImporter, ImporterError, MeshGeometry, MeshMaterial, MeshRecord, SkipReason,
    };
    use glam::Vec3;

    use super::*;
    use crate::camera::DEFAULT_CAMERA_POSITION;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        CreateGeometry(u32),
        CreateMaterial(u32),
        DisposeGeometry(u32),
        DisposeMaterial(u32),
        Resize(u32, u32),
        Release,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct MockMaterial {
        id: u32,
        color: [f32; 3],
        double_sided: bool,
    }

    /// Records every backend call
    #[derive(Default)]
    struct MockBackend {
        log: Rc<RefCell<Vec<Event>>>,
        next_id: u32,
    }

    impl MockBackend {
        fn next(&mut self) -> u32 {
            self.next_id += 1;
            self.next_id
        }
    }

    impl SceneBackend for MockBackend {
        type Geometry = u32;
        type Material = MockMaterial;

        fn create_geometry(&mut self, _geometry: &MeshGeometry) -> u32 {
            let id = self.next();
            self.log.borrow_mut().push(Event::CreateGeometry(id));
            id
        }

        fn create_material(&mut self, material: &MeshMaterial) -> MockMaterial {
            let id = self.next();
            self.log.borrow_mut().push(Event::CreateMaterial(id));
            MockMaterial {
                id,
                color: material.color,
                double_sided: material.double_sided,
            }
        }

        fn dispose_geometry(&mut self, geometry: u32) {
            self.log.borrow_mut().push(Event::DisposeGeometry(geometry));
        }

        fn dispose_material(&mut self, material: MockMaterial) {
            self.log
                .borrow_mut()
                .push(Event::DisposeMaterial(material.id));
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.log.borrow_mut().push(Event::Resize(width, height));
        }

        fn release(&mut self) {
            self.log.borrow_mut().push(Event::Release);
        }
    }

    /// Returns a canned result for every format
    struct FixedImporter(Result<ImportResult, ImporterError>);

    impl FixedImporter {
        fn reply(&self) -> Result<ImportResult, ImporterError> {
            self.0.clone()
        }
    }

    impl CadImporter for FixedImporter {
        fn read_step(
            &self,
            _data: &[u8],
            _params: &TessellationParams,
        ) -> Result<ImportResult, ImporterError> {
            self.reply()
        }

        fn read_iges(
            &self,
            _data: &[u8],
            _params: &TessellationParams,
        ) -> Result<ImportResult, ImporterError> {
            self.reply()
        }

        fn read_brep(
            &self,
            _data: &[u8],
            _params: &TessellationParams,
        ) -> Result<ImportResult, ImporterError> {
            self.reply()
        }
    }

    fn adapter() -> (SceneAdapter<MockBackend>, Rc<RefCell<Vec<Event>>>) {
        let backend = MockBackend::default();
        let log = backend.log.clone();
        (SceneAdapter::new(backend, Camera::new(1.0), true), log)
    }

    fn red_triangle() -> MeshRecord {
        MeshRecord::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2],
        )
        .with_name("tri")
        .with_color([255, 0, 0])
    }

    fn unit_cube_corners() -> MeshRecord {
        MeshRecord::new(
            vec![
                -0.5, -0.5, -0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, //
                -0.5, -0.5, 0.5, 0.5, 0.5, 0.5, -0.5, 0.5, 0.5,
            ],
            vec![0, 1, 2, 3, 4, 5],
        )
    }

    fn run(
        adapter: &mut SceneAdapter<MockBackend>,
        meshes: Vec<MeshRecord>,
    ) -> Result<SceneSummary, ViewerError> {
        let importer = FixedImporter(Ok(ImportResult::succeeded(meshes)));
        adapter.process_file(&importer, "model.step", b"ISO-10303-21;", &Default::default())
    }

    fn count(log: &Rc<RefCell<Vec<Event>>>, pred: impl Fn(&Event) -> bool) -> usize {
        log.borrow().iter().filter(|e| pred(*e)).count()
    }

    #[test]
    fn test_red_triangle_end_to_end() {
        let (mut adapter, _log) = adapter();
        let summary = run(&mut adapter, vec![red_triangle()]).unwrap();

        assert_eq!(summary.mesh_count, 1);
        assert_eq!(summary.triangle_count, 1);
        assert!(summary.skipped.is_empty());

        let bounds = summary.bounds.unwrap();
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));

        let ctx = adapter.context().unwrap();
        let mesh = ctx.model.iter().next().unwrap();
        assert_eq!(mesh.name, "tri");
        assert_eq!(mesh.material.color, [1.0, 0.0, 0.0]);
        assert!(mesh.material.double_sided);

        assert_ne!(ctx.camera.position, DEFAULT_CAMERA_POSITION);
        assert_eq!(ctx.camera.target, Vec3::new(0.5, 0.5, 0.0));
        assert!(summary.fit.is_some());
        assert!(adapter.last_result().unwrap().success);
    }

    #[test]
    fn test_unit_cube_camera_pose() {
        let (mut adapter, _log) = adapter();
        let summary = run(&mut adapter, vec![unit_cube_corners()]).unwrap();

        let camera = &adapter.context().unwrap().camera;
        let d = 0.5 / (camera.fov / 2.0).tan();
        assert_relative_eq!(summary.fit.unwrap().distance, d, epsilon = 1e-5);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.5 * d, d), 1e-5));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_empty_result_resets_camera() {
        let (mut adapter, _log) = adapter();
        run(&mut adapter, vec![red_triangle()]).unwrap();

        let summary = run(&mut adapter, Vec::new()).unwrap();
        assert_eq!(summary.mesh_count, 0);
        assert!(summary.fit.is_none());

        let camera = &adapter.context().unwrap().camera;
        assert_eq!(camera.position, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_invalid_records_are_skipped() {
        let (mut adapter, log) = adapter();
        let mut no_index = red_triangle();
        no_index.index = None;
        let mut no_position = red_triangle();
        no_position.attributes.position = None;

        let summary = run(&mut adapter, vec![no_index, red_triangle(), no_position]).unwrap();

        assert_eq!(summary.mesh_count, 1);
        let reasons: Vec<_> = summary.skipped.iter().map(|s| &s.reason).collect();
        assert_eq!(
            reasons,
            vec![&SkipReason::MissingIndex, &SkipReason::MissingPosition]
        );
        assert_eq!(count(&log, |e| matches!(e, Event::CreateGeometry(_))), 1);
    }

    #[test]
    fn test_all_invalid_behaves_like_empty() {
        let (mut adapter, _log) = adapter();
        let mut record = red_triangle();
        record.index = None;

        let summary = run(&mut adapter, vec![record]).unwrap();
        assert_eq!(summary.mesh_count, 0);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(
            adapter.context().unwrap().camera.position,
            DEFAULT_CAMERA_POSITION
        );
    }

    #[test]
    fn test_reimport_disposes_previous_model() {
        let (mut adapter, log) = adapter();
        run(&mut adapter, vec![red_triangle(), unit_cube_corners()]).unwrap();
        assert_eq!(count(&log, |e| matches!(e, Event::DisposeGeometry(_))), 0);

        run(&mut adapter, vec![red_triangle()]).unwrap();
        assert_eq!(count(&log, |e| matches!(e, Event::DisposeGeometry(_))), 2);
        assert_eq!(count(&log, |e| matches!(e, Event::DisposeMaterial(_))), 2);
        assert_eq!(adapter.context().unwrap().model.len(), 1);
    }

    #[test]
    fn test_teardown_disposes_each_handle_once_in_order() {
        let (mut adapter, log) = adapter();
        run(&mut adapter, vec![red_triangle(), unit_cube_corners()]).unwrap();
        log.borrow_mut().clear();

        adapter.dispose();
        adapter.dispose();
        drop(adapter);

        let events = log.borrow().clone();
        assert_eq!(
            events,
            vec![
                Event::DisposeGeometry(1),
                Event::DisposeMaterial(2),
                Event::DisposeGeometry(3),
                Event::DisposeMaterial(4),
                Event::Release,
            ]
        );
    }

    #[test]
    fn test_drop_tears_down() {
        let (mut adapter, log) = adapter();
        run(&mut adapter, vec![red_triangle()]).unwrap();
        drop(adapter);

        assert_eq!(count(&log, |e| *e == Event::Release), 1);
        assert_eq!(count(&log, |e| matches!(e, Event::DisposeGeometry(_))), 1);
    }

    #[test]
    fn test_frames_stop_after_dispose() {
        let (mut adapter, _log) = adapter();
        assert!(adapter.is_running());
        assert_eq!(adapter.render_frame(|ctx| ctx.model.len()), Some(0));
        assert_eq!(
            adapter.render_frame(|ctx| ctx.frame_loop().frames()),
            Some(2)
        );

        adapter.dispose();
        assert!(!adapter.is_running());
        assert!(adapter.is_disposed());
        assert!(adapter.render_frame(|_| ()).is_none());
    }

    #[test]
    fn test_clearing_empty_model_is_noop() {
        let (mut adapter, log) = adapter();
        assert_eq!(adapter.clear_model(), 0);
        adapter.begin_import().unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_second_import_is_rejected_while_busy() {
        let (mut adapter, log) = adapter();
        run(&mut adapter, vec![red_triangle()]).unwrap();

        adapter.begin_import().unwrap();
        let disposed = count(&log, |e| matches!(e, Event::DisposeGeometry(_)));

        let err = run(&mut adapter, vec![red_triangle()]).unwrap_err();
        assert!(matches!(err, ViewerError::Busy));
        assert!(adapter.is_busy());
        assert_eq!(
            count(&log, |e| matches!(e, Event::DisposeGeometry(_))),
            disposed
        );

        adapter
            .finish_import(Ok(ImportResult::succeeded(vec![red_triangle()])))
            .unwrap();
        assert!(!adapter.is_busy());
        run(&mut adapter, vec![red_triangle()]).unwrap();
    }

    #[test]
    fn test_failed_import_leaves_scene_cleared() {
        let (mut adapter, _log) = adapter();
        run(&mut adapter, vec![red_triangle()]).unwrap();

        let importer = FixedImporter(Ok(ImportResult::failed("bad header")));
        let err = adapter
            .process_file(&importer, "model.igs", b"", &Default::default())
            .unwrap_err();

        assert_eq!(err.to_string(), "Import failed: bad header");
        assert!(adapter.context().unwrap().model.is_empty());
        assert!(!adapter.is_busy());
        assert_eq!(adapter.last_result().unwrap().error.as_deref(), Some("bad header"));
    }

    #[test]
    fn test_kernel_error_is_reported() {
        let (mut adapter, _log) = adapter();
        let importer = FixedImporter(Err(ImporterError::Kernel("segfault".into())));
        let err = adapter
            .process_file(&importer, "model.brep", b"", &Default::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Import failed: segfault");
        assert!(adapter.last_result().is_none());
    }

    #[test]
    fn test_unsupported_extension_keeps_current_scene() {
        let (mut adapter, log) = adapter();
        run(&mut adapter, vec![red_triangle()]).unwrap();
        let events_before = log.borrow().len();
        let position = adapter.context().unwrap().camera.position;

        let importer = FixedImporter(Ok(ImportResult::succeeded(vec![unit_cube_corners()])));
        let err = adapter
            .process_file(&importer, "model.stl", b"", &Default::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Import(ImportError::UnsupportedFormat(_))
        ));
        assert!(!adapter.is_busy());

        let ctx = adapter.context().unwrap();
        assert_eq!(ctx.model.len(), 1);
        assert_eq!(ctx.camera.position, position);
        assert_eq!(log.borrow().len(), events_before);
        assert!(adapter.last_result().unwrap().success);
    }

    #[test]
    fn test_fit_resynchronizes_controls() {
        let (mut adapter, _log) = adapter();
        run(&mut adapter, vec![red_triangle()]).unwrap();

        let (position, target) = {
            let ctx = adapter.context().unwrap();
            assert_eq!(ctx.controls.as_ref().unwrap().target, ctx.camera.target);
            (ctx.camera.position, ctx.camera.target)
        };

        // A zero drag must leave the fitted pose where it is.
        adapter.orbit(0.0, 0.0);
        let ctx = adapter.context().unwrap();
        assert!(ctx.camera.position.abs_diff_eq(position, 1e-4));
        assert_eq!(ctx.camera.target, target);
    }

    #[test]
    fn test_point_sized_model_resynchronizes_controls() {
        let (mut adapter, _log) = adapter();
        run(&mut adapter, vec![red_triangle()]).unwrap();

        let point = MeshRecord::new([2.0, 3.0, 4.0].repeat(3), vec![0, 1, 2]);
        let summary = run(&mut adapter, vec![point]).unwrap();
        assert_eq!(summary.mesh_count, 1);

        let ctx = adapter.context().unwrap();
        let target = Vec3::new(2.0, 3.0, 4.0);
        assert_eq!(ctx.camera.target, target);
        assert!(ctx.camera.view_matrix().is_finite());

        let controls = ctx.controls.as_ref().unwrap();
        assert_eq!(controls.target, target);
        assert_relative_eq!(
            controls.distance(),
            (ctx.camera.position - target).length(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_resize_updates_aspect_and_backend() {
        let (mut adapter, log) = adapter();
        adapter.resize(1600, 800);
        assert_eq!(adapter.context().unwrap().camera.aspect, 2.0);
        assert_eq!(log.borrow().last(), Some(&Event::Resize(1600, 800)));
    }

    #[test]
    fn test_use_after_dispose() {
        let (mut adapter, log) = adapter();
        adapter.dispose();

        assert!(matches!(
            run(&mut adapter, vec![red_triangle()]),
            Err(ViewerError::Disposed)
        ));
        assert!(adapter.fit_camera().is_none());
        adapter.resize(10, 10);
        assert_eq!(adapter.clear_model(), 0);
        assert_eq!(count(&log, |e| *e == Event::Release), 1);
    }

    #[test]
    fn test_import_finishing_after_dispose_is_discarded() {
        let (mut adapter, _log) = adapter();
        adapter.begin_import().unwrap();
        adapter.dispose();

        let err = adapter
            .finish_import(Ok(ImportResult::succeeded(vec![red_triangle()])))
            .unwrap_err();
        assert!(matches!(err, ViewerError::Disposed));
    }
}
