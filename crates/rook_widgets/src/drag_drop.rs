use std::any::Any;
use std::sync::Arc;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Drop-zone classifier
// ---------------------------------------------------------------------------

/// Where a drop lands relative to the hovered row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropZone {
    /// Insert as a sibling above the target.
    Before,
    /// Reparent under the target.
    Inside,
    /// Insert as a sibling below the target.
    After,
}

/// Fractional thresholds of the row height splitting it into before/inside/after
/// bands. A provider picks its bands via [`DragDropProvider::zone_bands`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneBands {
    pub before: f32,
    pub after: f32,
}

impl ZoneBands {
    /// Generic split: top quarter inserts before, bottom 15% after.
    pub const DEFAULT: Self = Self {
        before: 0.25,
        after: 0.85,
    };

    /// Reorder-oriented split: thin insert bands, wide reparent band.
    pub const REORDER: Self = Self {
        before: 0.15,
        after: 0.85,
    };

    /// Classify a pointer position against a row rectangle.
    ///
    /// Total over all inputs: a pointer above the row classifies `Before`,
    /// below it `After`. Offsets exactly on a threshold classify `Inside`.
    pub fn classify(&self, pointer_y: f32, row_top: f32, row_height: f32) -> DropZone {
        let offset = pointer_y - row_top;
        if offset < self.before * row_height {
            DropZone::Before
        } else if offset > self.after * row_height {
            DropZone::After
        } else {
            DropZone::Inside
        }
    }
}

impl Default for ZoneBands {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Provider contract
// ---------------------------------------------------------------------------

/// Opaque payload a provider produces during [`DragDropProvider::evaluate_drop`]
/// and consumes in [`DragDropProvider::perform_drop`]. Carrying the evaluated
/// decision forward avoids recomputing it against possibly-stale state at
/// commit time.
pub type DropData = Box<dyn Any + Send + Sync>;

/// A validated hover: dragged entity, resolved target, resolved zone.
#[derive(Clone, Copy, Debug)]
pub struct DropRequest {
    pub dragged: Entity,
    pub target: Entity,
    pub zone: DropZone,
}

/// Successful evaluation result.
pub struct DropPlan {
    /// Indicator the UI should show. Usually the requested zone, but a
    /// provider may override it (a sort-locked tree always shows `Inside`).
    pub visual: DropZone,
    /// Payload handed back to the same provider on commit.
    pub data: DropData,
}

/// Per-section drag-and-drop policy. Implementors decide what may be dragged,
/// whether a hover is a valid drop, and how to apply the mutation.
pub trait DragDropProvider: Send + Sync + 'static {
    /// Thresholds used to classify hovers over this section's rows.
    fn zone_bands(&self) -> ZoneBands {
        ZoneBands::DEFAULT
    }

    /// Whether a drag may start on this entity. Checked once at drag start.
    fn can_drag(&self, world: &World, entity: Entity) -> bool {
        let _ = (world, entity);
        true
    }

    /// Validate a hover and plan the mutation. `None` means the hover is not
    /// a valid drop. Called continuously while hovering; must not mutate.
    fn evaluate_drop(&self, world: &World, request: &DropRequest) -> Option<DropPlan>;

    /// Apply the mutation planned by `evaluate_drop`. Called once on release.
    fn perform_drop(&self, world: &mut World, request: &DropRequest, data: DropData);
}

/// Marks a tree section container and carries its drag-and-drop policy.
/// Rows resolve their section by walking up the UI hierarchy.
#[derive(Component, Clone)]
pub struct TreeSection {
    pub provider: Arc<dyn DragDropProvider>,
    /// Section-level drag gate, one of the layered `can_drag` checks.
    pub drag_enabled: bool,
}

impl TreeSection {
    pub fn new(provider: impl DragDropProvider) -> Self {
        Self {
            provider: Arc::new(provider),
            drag_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Consumer overrides
// ---------------------------------------------------------------------------

/// A commit about to run, exposed to the consumer interception hook.
pub struct DropIntercept {
    pub dragged: Entity,
    pub target: Entity,
    pub zone: DropZone,
    prevented: bool,
}

impl DropIntercept {
    /// Swallow the drop: the provider mutation will not run and no drop
    /// result is published. The session still resets to idle.
    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    pub fn is_prevented(&self) -> bool {
        self.prevented
    }
}

/// Optional consumer-supplied callbacks layered on top of the provider's own
/// checks. All layers must approve for a drag or drop to proceed.
#[derive(Resource, Default)]
pub struct DragDropOverrides {
    pub can_drag: Option<Arc<dyn Fn(&World, Entity) -> bool + Send + Sync>>,
    pub can_drop: Option<Arc<dyn Fn(&World, &DropRequest) -> bool + Send + Sync>>,
    /// Interception hook run before the provider mutation on commit.
    pub on_drop: Option<Arc<dyn Fn(&World, &mut DropIntercept) + Send + Sync>>,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Fully-validated hover sub-state. Exists only as a whole: target, zone,
/// payload and provider are populated together or not at all.
pub struct HoverState {
    /// Resolved drop target (the redirect rule may differ from the hovered row).
    pub target: Entity,
    /// Resolved zone indicator.
    pub zone: DropZone,
    /// The row source the pointer is actually over (equals `target` unless
    /// redirected). Used to clear hover when the pointer leaves that row.
    pub via: Entity,
    /// Payload produced by `evaluate_drop`, consumed by `perform_drop`.
    pub data: DropData,
    /// Provider that produced `data` and will run the mutation.
    pub provider: Arc<dyn DragDropProvider>,
}

/// State of the single active drag gesture. One session per rendered tree;
/// all transitions run synchronously inside pointer-event handling.
#[derive(Resource, Default)]
pub struct DragSession {
    dragged: Option<Entity>,
    hover: Option<HoverState>,
}

impl DragSession {
    pub fn dragged(&self) -> Option<Entity> {
        self.dragged
    }

    pub fn hover(&self) -> Option<&HoverState> {
        self.hover.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.dragged.is_none() && self.hover.is_none()
    }

    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    /// Unconditional return to idle. Safe to call at any time.
    pub fn reset(&mut self) {
        self.dragged = None;
        self.hover = None;
    }
}

/// Outcome of the most recently committed (non-prevented) drop. Cleared at
/// the start of the next drag. Lets host UI react (flash, scroll into view)
/// without re-deriving the drop.
#[derive(Resource, Default)]
pub struct LastDropResult(pub Option<DropOutcome>);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropOutcome {
    pub dragged: Entity,
    pub target: Entity,
    pub zone: DropZone,
}

// ---------------------------------------------------------------------------
// Coordinator entry points
// ---------------------------------------------------------------------------

/// Geometry and context for one hover update, gathered by the UI layer.
pub struct HoverInput {
    /// Scene entity whose row the pointer is over.
    pub target: Entity,
    /// Section container entity carrying the [`TreeSection`].
    pub section: Entity,
    pub row_top: f32,
    pub row_height: f32,
    pub pointer_y: f32,
    /// First visible child of an expanded target, if any. Enables the
    /// after-expanded-row redirect.
    pub first_visible_child: Option<Entity>,
}

/// Try to start a drag on `entity` within `section`. Runs the layered
/// `can_drag` checks; on approval commits the session to the dragging state
/// and clears any stale drop result. Returns whether the drag started.
pub fn begin_drag(world: &mut World, entity: Entity, section: Entity) -> bool {
    let Some(section_ref) = world.get::<TreeSection>(section) else {
        return false;
    };
    if !section_ref.drag_enabled {
        return false;
    }
    let provider = section_ref.provider.clone();
    if !provider.can_drag(world, entity) {
        return false;
    }
    let overrides = world.resource::<DragDropOverrides>();
    if let Some(can_drag) = &overrides.can_drag {
        if !can_drag(world, entity) {
            return false;
        }
    }

    world.resource_mut::<LastDropResult>().0 = None;
    let mut session = world.resource_mut::<DragSession>();
    session.dragged = Some(entity);
    session.hover = None;
    true
}

/// Re-resolve the hover sub-state from a pointer update. Any missing piece
/// (no active drag, hovering the dragged row, no section policy, failed
/// validation) degrades to "no valid drop" by clearing the hover sub-state.
pub fn update_hover(world: &mut World, input: HoverInput) {
    let Some(dragged) = world.resource::<DragSession>().dragged else {
        return;
    };
    if input.target == dragged {
        world.resource_mut::<DragSession>().clear_hover();
        return;
    }
    let Some(section) = world.get::<TreeSection>(input.section).cloned() else {
        world.resource_mut::<DragSession>().clear_hover();
        return;
    };
    let provider = section.provider;

    let mut target = input.target;
    let mut zone = provider
        .zone_bands()
        .classify(input.pointer_y, input.row_top, input.row_height);

    // Dropping "after" a row that currently shows its children below it is
    // ambiguous with "as first child"; redirect to before that first child.
    if zone == DropZone::After {
        if let Some(child) = input.first_visible_child {
            target = child;
            zone = DropZone::Before;
        }
    }

    if target == dragged || is_descendant(world, target, dragged) {
        world.resource_mut::<DragSession>().clear_hover();
        return;
    }

    let request = DropRequest {
        dragged,
        target,
        zone,
    };
    let Some(plan) = provider.evaluate_drop(world, &request) else {
        world.resource_mut::<DragSession>().clear_hover();
        return;
    };
    let overrides = world.resource::<DragDropOverrides>();
    if let Some(can_drop) = &overrides.can_drop {
        if !can_drop(world, &request) {
            world.resource_mut::<DragSession>().clear_hover();
            return;
        }
    }

    world.resource_mut::<DragSession>().hover = Some(HoverState {
        target,
        zone: plan.visual,
        via: input.target,
        data: plan.data,
        provider,
    });
}

/// Clear the hover sub-state if it was produced by hovering `row_source`.
pub fn leave_hover(world: &mut World, row_source: Entity) {
    let session = world.resource::<DragSession>();
    let leaving = session
        .hover()
        .is_some_and(|h| h.via == row_source || h.target == row_source);
    if leaving {
        world.resource_mut::<DragSession>().clear_hover();
    }
}

/// Commit the active session on pointer release. If a validated hover exists,
/// the interception hook runs first and may prevent the drop; otherwise the
/// provider mutation runs and the outcome is published. The session always
/// resets to idle.
pub fn commit_drop(world: &mut World) {
    let dragged = world.resource::<DragSession>().dragged;
    let hover = world.resource_mut::<DragSession>().hover.take();

    if let (Some(dragged), Some(hover)) = (dragged, hover) {
        let request = DropRequest {
            dragged,
            target: hover.target,
            zone: hover.zone,
        };

        let mut intercept = DropIntercept {
            dragged,
            target: request.target,
            zone: request.zone,
            prevented: false,
        };
        if let Some(hook) = world
            .resource::<DragDropOverrides>()
            .on_drop
            .clone()
        {
            hook(world, &mut intercept);
        }

        if !intercept.is_prevented() {
            hover.provider.perform_drop(world, &request, hover.data);
            world.resource_mut::<LastDropResult>().0 = Some(DropOutcome {
                dragged,
                target: request.target,
                zone: request.zone,
            });
        }
    }

    world.resource_mut::<DragSession>().reset();
}

/// Abort the active session without mutating anything. Idempotent.
pub fn cancel_drag(world: &mut World) {
    if world.resource::<DragSession>().is_idle() {
        return;
    }
    world.resource_mut::<DragSession>().reset();
}

/// Walk up the parent chain: is `entity` below `ancestor`?
pub fn is_descendant(world: &World, entity: Entity, ancestor: Entity) -> bool {
    let mut current = entity;
    while let Some(&ChildOf(parent)) = world.get::<ChildOf>(current) {
        if parent == ancestor {
            return true;
        }
        current = parent;
    }
    false
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct DragDropPlugin;

impl Plugin for DragDropPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DragSession>()
            .init_resource::<LastDropResult>()
            .init_resource::<DragDropOverrides>()
            .add_systems(Update, cancel_on_escape)
            .add_observer(cancel_on_pointer_loss);
    }
}

fn cancel_on_escape(keyboard: Res<ButtonInput<KeyCode>>, mut session: ResMut<DragSession>) {
    if keyboard.just_pressed(KeyCode::Escape) && !session.is_idle() {
        session.reset();
    }
}

fn cancel_on_pointer_loss(_cancel: On<Pointer<Cancel>>, mut session: ResMut<DragSession>) {
    if !session.is_idle() {
        session.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // === Classifier ===

    #[test]
    fn classify_default_bands() {
        let bands = ZoneBands::DEFAULT;
        assert_eq!(bands.classify(24.9, 0.0, 100.0), DropZone::Before);
        assert_eq!(bands.classify(25.0, 0.0, 100.0), DropZone::Inside);
        assert_eq!(bands.classify(50.0, 0.0, 100.0), DropZone::Inside);
        assert_eq!(bands.classify(85.0, 0.0, 100.0), DropZone::Inside);
        assert_eq!(bands.classify(85.1, 0.0, 100.0), DropZone::After);
    }

    #[test]
    fn classify_reorder_bands() {
        let bands = ZoneBands::REORDER;
        assert_eq!(bands.classify(14.9, 0.0, 100.0), DropZone::Before);
        assert_eq!(bands.classify(15.0, 0.0, 100.0), DropZone::Inside);
        assert_eq!(bands.classify(84.0, 0.0, 100.0), DropZone::Inside);
        assert_eq!(bands.classify(86.0, 0.0, 100.0), DropZone::After);
    }

    #[test]
    fn classify_clamps_out_of_range() {
        let bands = ZoneBands::DEFAULT;
        // Above the row top and below the row bottom still classify.
        assert_eq!(bands.classify(-50.0, 0.0, 100.0), DropZone::Before);
        assert_eq!(bands.classify(250.0, 0.0, 100.0), DropZone::After);
    }

    #[test]
    fn classify_respects_row_offset() {
        let bands = ZoneBands::DEFAULT;
        assert_eq!(bands.classify(210.0, 200.0, 100.0), DropZone::Before);
        assert_eq!(bands.classify(250.0, 200.0, 100.0), DropZone::Inside);
        assert_eq!(bands.classify(295.0, 200.0, 100.0), DropZone::After);
    }

    // === Provider fixture ===

    #[derive(Default)]
    struct RecordingProvider {
        reject_all: bool,
        deny_drag: bool,
        drops: Arc<Mutex<Vec<(Entity, Entity, DropZone)>>>,
    }

    impl DragDropProvider for RecordingProvider {
        fn can_drag(&self, _world: &World, _entity: Entity) -> bool {
            !self.deny_drag
        }

        fn evaluate_drop(&self, _world: &World, request: &DropRequest) -> Option<DropPlan> {
            if self.reject_all {
                return None;
            }
            Some(DropPlan {
                visual: request.zone,
                data: Box::new(request.zone),
            })
        }

        fn perform_drop(&self, _world: &mut World, request: &DropRequest, data: DropData) {
            let zone = *data.downcast::<DropZone>().expect("payload round-trip");
            assert_eq!(zone, request.zone);
            self.drops
                .lock()
                .unwrap()
                .push((request.dragged, request.target, request.zone));
        }
    }

    struct Fixture {
        world: World,
        section: Entity,
        drops: Arc<Mutex<Vec<(Entity, Entity, DropZone)>>>,
    }

    fn fixture_with(provider: RecordingProvider) -> Fixture {
        let drops = provider.drops.clone();
        let mut world = World::new();
        world.init_resource::<DragSession>();
        world.init_resource::<LastDropResult>();
        world.init_resource::<DragDropOverrides>();
        let section = world.spawn(TreeSection::new(provider)).id();
        Fixture {
            world,
            section,
            drops,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingProvider::default())
    }

    fn hover_input(target: Entity, section: Entity, pointer_y: f32) -> HoverInput {
        HoverInput {
            target,
            section,
            row_top: 0.0,
            row_height: 20.0,
            pointer_y,
            first_visible_child: None,
        }
    }

    // === Session transitions ===

    #[test]
    fn begin_drag_commits_session_and_clears_stale_result() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn_empty().id();
        f.world.resource_mut::<LastDropResult>().0 = Some(DropOutcome {
            dragged: a,
            target: b,
            zone: DropZone::Inside,
        });

        assert!(begin_drag(&mut f.world, a, f.section));
        assert_eq!(f.world.resource::<DragSession>().dragged(), Some(a));
        assert!(f.world.resource::<DragSession>().hover().is_none());
        assert!(f.world.resource::<LastDropResult>().0.is_none());
    }

    #[test]
    fn begin_drag_suppressed_by_provider() {
        let mut f = fixture_with(RecordingProvider {
            deny_drag: true,
            ..Default::default()
        });
        let a = f.world.spawn_empty().id();
        assert!(!begin_drag(&mut f.world, a, f.section));
        assert!(f.world.resource::<DragSession>().is_idle());
    }

    #[test]
    fn begin_drag_suppressed_by_section_gate() {
        let mut f = fixture();
        f.world
            .get_mut::<TreeSection>(f.section)
            .unwrap()
            .drag_enabled = false;
        let a = f.world.spawn_empty().id();
        assert!(!begin_drag(&mut f.world, a, f.section));
        assert!(f.world.resource::<DragSession>().is_idle());
    }

    #[test]
    fn begin_drag_suppressed_by_override() {
        let mut f = fixture();
        f.world.resource_mut::<DragDropOverrides>().can_drag =
            Some(Arc::new(|_world, _entity| false));
        let a = f.world.spawn_empty().id();
        assert!(!begin_drag(&mut f.world, a, f.section));
        assert!(f.world.resource::<DragSession>().is_idle());
    }

    #[test]
    fn hover_populates_fully_or_not_at_all() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn_empty().id();
        begin_drag(&mut f.world, a, f.section);

        update_hover(&mut f.world, hover_input(b, f.section, 10.0));
        let session = f.world.resource::<DragSession>();
        let hover = session.hover().expect("valid hover populates");
        assert_eq!(hover.target, b);
        assert_eq!(hover.zone, DropZone::Inside);
        assert_eq!(hover.via, b);

        // Hovering the dragged row itself clears everything at once.
        update_hover(&mut f.world, hover_input(a, f.section, 10.0));
        assert!(f.world.resource::<DragSession>().hover().is_none());
        assert_eq!(f.world.resource::<DragSession>().dragged(), Some(a));
    }

    #[test]
    fn hover_without_active_drag_is_ignored() {
        let mut f = fixture();
        let b = f.world.spawn_empty().id();
        update_hover(&mut f.world, hover_input(b, f.section, 10.0));
        assert!(f.world.resource::<DragSession>().is_idle());
    }

    #[test]
    fn hover_rejected_by_provider_clears_state() {
        let mut f = fixture_with(RecordingProvider {
            reject_all: true,
            ..Default::default()
        });
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn_empty().id();
        begin_drag(&mut f.world, a, f.section);
        update_hover(&mut f.world, hover_input(b, f.section, 10.0));
        assert!(f.world.resource::<DragSession>().hover().is_none());
    }

    #[test]
    fn cycle_check_rejects_descendants() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn(ChildOf(a)).id();
        let c = f.world.spawn(ChildOf(b)).id();

        assert!(is_descendant(&f.world, c, a));
        assert!(!is_descendant(&f.world, a, c));

        begin_drag(&mut f.world, a, f.section);
        update_hover(&mut f.world, hover_input(c, f.section, 10.0));
        assert!(
            f.world.resource::<DragSession>().hover().is_none(),
            "drop onto own descendant must be invalid"
        );
    }

    #[test]
    fn redirect_after_expanded_row_targets_first_child() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn_empty().id();
        let child = f.world.spawn(ChildOf(b)).id();
        begin_drag(&mut f.world, a, f.section);

        let mut input = hover_input(b, f.section, 19.0); // bottom band
        input.first_visible_child = Some(child);
        update_hover(&mut f.world, input);

        let session = f.world.resource::<DragSession>();
        let hover = session.hover().expect("redirected hover is valid");
        assert_eq!(hover.target, child);
        assert_eq!(hover.zone, DropZone::Before);
        assert_eq!(hover.via, b);

        commit_drop(&mut f.world);
        let drops = f.drops.lock().unwrap();
        assert_eq!(drops.as_slice(), &[(a, child, DropZone::Before)]);
    }

    #[test]
    fn commit_runs_mutation_and_publishes_result() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn_empty().id();
        begin_drag(&mut f.world, a, f.section);
        update_hover(&mut f.world, hover_input(b, f.section, 10.0));
        commit_drop(&mut f.world);

        assert!(f.world.resource::<DragSession>().is_idle());
        assert_eq!(
            f.drops.lock().unwrap().as_slice(),
            &[(a, b, DropZone::Inside)]
        );
        assert_eq!(
            f.world.resource::<LastDropResult>().0,
            Some(DropOutcome {
                dragged: a,
                target: b,
                zone: DropZone::Inside,
            })
        );
    }

    #[test]
    fn prevented_commit_skips_mutation_but_still_resets() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn_empty().id();
        f.world.resource_mut::<DragDropOverrides>().on_drop =
            Some(Arc::new(|_world, intercept| intercept.prevent_default()));

        begin_drag(&mut f.world, a, f.section);
        update_hover(&mut f.world, hover_input(b, f.section, 18.0));
        commit_drop(&mut f.world);

        assert!(f.world.resource::<DragSession>().is_idle());
        assert!(f.drops.lock().unwrap().is_empty(), "mutation must not run");
        assert!(f.world.resource::<LastDropResult>().0.is_none());
    }

    #[test]
    fn commit_without_hover_only_resets() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        begin_drag(&mut f.world, a, f.section);
        commit_drop(&mut f.world);
        assert!(f.world.resource::<DragSession>().is_idle());
        assert!(f.drops.lock().unwrap().is_empty());
        assert!(f.world.resource::<LastDropResult>().0.is_none());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn_empty().id();
        begin_drag(&mut f.world, a, f.section);
        update_hover(&mut f.world, hover_input(b, f.section, 10.0));

        cancel_drag(&mut f.world);
        assert!(f.world.resource::<DragSession>().is_idle());
        cancel_drag(&mut f.world);
        assert!(f.world.resource::<DragSession>().is_idle());
        assert!(f.drops.lock().unwrap().is_empty(), "cancel never mutates");
    }

    #[test]
    fn leave_hover_clears_redirected_state_from_origin_row() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn_empty().id();
        let child = f.world.spawn(ChildOf(b)).id();
        begin_drag(&mut f.world, a, f.section);

        let mut input = hover_input(b, f.section, 19.0);
        input.first_visible_child = Some(child);
        update_hover(&mut f.world, input);
        assert!(f.world.resource::<DragSession>().hover().is_some());

        // Leaving an unrelated row changes nothing.
        leave_hover(&mut f.world, a);
        assert!(f.world.resource::<DragSession>().hover().is_some());

        // Leaving the row that produced the redirect clears it.
        leave_hover(&mut f.world, b);
        assert!(f.world.resource::<DragSession>().hover().is_none());
        assert_eq!(f.world.resource::<DragSession>().dragged(), Some(a));
    }

    #[test]
    fn consumer_can_drop_override_vetoes() {
        let mut f = fixture();
        let a = f.world.spawn_empty().id();
        let b = f.world.spawn_empty().id();
        f.world.resource_mut::<DragDropOverrides>().can_drop =
            Some(Arc::new(|_world, request| {
                request.zone != DropZone::Inside
            }));

        begin_drag(&mut f.world, a, f.section);
        update_hover(&mut f.world, hover_input(b, f.section, 10.0));
        assert!(
            f.world.resource::<DragSession>().hover().is_none(),
            "override veto must clear hover"
        );

        update_hover(&mut f.world, hover_input(b, f.section, 2.0));
        assert!(f.world.resource::<DragSession>().hover().is_some());
    }
}
