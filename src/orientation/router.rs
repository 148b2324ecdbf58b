use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    render::{RenderEvent, RenderSink},
    schedule::DelayedTask,
    settings::Settings,
};

use super::{resolve_orientation, Orientation, RawOrientation, ToolView};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// The activation contract every tool exposes to the router.
#[async_trait]
pub trait ToolEngine: Send + Sync {
    /// The tool's view just became visible.
    async fn activate(&self);
    /// The tool's view is being hidden; release anything that should not run unseen.
    async fn deactivate(&self);
}

/// One engine per view.
pub struct Engines {
    pub alarm: Arc<dyn ToolEngine>,
    pub stopwatch: Arc<dyn ToolEngine>,
    pub timer: Arc<dyn ToolEngine>,
    pub weather: Arc<dyn ToolEngine>,
}

impl Engines {
    fn for_view(&self, view: ToolView) -> &Arc<dyn ToolEngine> {
        match view {
            ToolView::Alarm => &self.alarm,
            ToolView::Stopwatch => &self.stopwatch,
            ToolView::Timer => &self.timer,
            ToolView::Weather => &self.weather,
        }
    }
}

#[derive(Default)]
struct RouterState {
    current: Option<(Orientation, ToolView)>,
    pending: Option<DelayedTask>,
}

/// Turns orientation readings into view switches.
///
/// The router is the only writer of the active view. It never touches engine internals; it
/// only calls [`ToolEngine::activate`] and [`ToolEngine::deactivate`].
#[derive(Clone)]
pub struct OrientationRouter {
    state: Arc<Mutex<RouterState>>,
    engines: Arc<Engines>,
    sink: Arc<dyn RenderSink>,
    orientation_debounce: Duration,
    resize_debounce: Duration,
}

impl OrientationRouter {
    pub fn new(engines: Engines, sink: Arc<dyn RenderSink>, settings: &Settings) -> Self {
        Self {
            state: Arc::new(Mutex::new(RouterState::default())),
            engines: Arc::new(engines),
            sink,
            orientation_debounce: settings.orientation_debounce(),
            resize_debounce: settings.resize_debounce(),
        }
    }

    pub async fn active_view(&self) -> Option<ToolView> {
        self.state.lock().await.current.map(|(_, view)| view)
    }

    pub async fn current_orientation(&self) -> Option<Orientation> {
        self.state.lock().await.current.map(|(orientation, _)| orientation)
    }

    /// Debounced entry point for platform orientation signals. A newer signal inside the
    /// window replaces the pending one.
    pub async fn on_orientation_changed(&self, raw: RawOrientation) {
        let delay = if raw.is_dimension_heuristic() {
            self.resize_debounce
        } else {
            self.orientation_debounce
        };

        let mut state = self.state.lock().await;
        if let Some(previous) = state.pending.take() {
            previous.cancel();
        }

        log_debug!("orientation signal {raw:?}, settling for {}ms", delay.as_millis());

        let router = self.clone();
        state.pending = Some(DelayedTask::spawn(delay, move |token| async move {
            let mut state = router.state.lock().await;
            if token.is_cancelled() {
                return;
            }
            state.pending = None;
            router.switch_locked(&mut state, &raw).await;
        }));
    }

    /// Applies a reading immediately, bypassing the debounce. Used for the initial detection.
    pub async fn apply(&self, raw: &RawOrientation) -> ToolView {
        let mut state = self.state.lock().await;
        if let Some(pending) = state.pending.take() {
            pending.cancel();
        }
        self.switch_locked(&mut state, raw).await
    }

    async fn switch_locked(&self, state: &mut RouterState, raw: &RawOrientation) -> ToolView {
        let orientation = resolve_orientation(raw);
        let view = orientation.view();

        if let Some((current, current_view)) = state.current {
            if current == orientation {
                return current_view;
            }
            log_info!("orientation {current:?} -> {orientation:?}");
            if current_view != view {
                self.engines.for_view(current_view).deactivate().await;
            }
        } else {
            log_info!("initial orientation {orientation:?}");
        }

        state.current = Some((orientation, view));
        self.engines.for_view(view).activate().await;

        self.sink.emit(RenderEvent::ViewChanged {
            view,
            orientation,
            label: view.label().to_string(),
        });
        log_info!("switched to {}", view.label());
        view
    }
}
