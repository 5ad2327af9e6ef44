use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::registry::ComponentInstance;
use crate::runtime::RuntimeHandle;
use crate::store::SharedStore;

/// What hooks can reach while a function component renders.
pub(crate) struct RenderFrame {
    pub(crate) runtime: RuntimeHandle,
    pub(crate) store: SharedStore,
    pub(crate) instance: Rc<ComponentInstance>,
    pub(crate) cursor: Cell<usize>,
    /// Slot count before this render, `None` on the first render.
    pub(crate) expected_slots: Option<usize>,
}

impl RenderFrame {
    pub(crate) fn new(runtime: RuntimeHandle, store: SharedStore, instance: Rc<ComponentInstance>) -> Self {
        let expected_slots = (instance.render_count() > 1).then(|| instance.hook_count());
        Self {
            runtime,
            store,
            instance,
            cursor: Cell::new(0),
            expected_slots,
        }
    }

    pub(crate) fn advance(&self) -> usize {
        let index = self.cursor.get();
        self.cursor.set(index + 1);
        index
    }
}

// Thread-local stack of render frames; nested renders push on top.
thread_local! {
    static FRAME_STACK: RefCell<Vec<Rc<RenderFrame>>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the frame stack on drop.
#[must_use = "RenderFrameGuard pops the frame stack on drop"]
pub(crate) struct RenderFrameGuard {
    frame: Rc<RenderFrame>,
}

impl RenderFrameGuard {
    pub(crate) fn frame(&self) -> &RenderFrame {
        &self.frame
    }
}

impl Drop for RenderFrameGuard {
    fn drop(&mut self) {
        FRAME_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub(crate) fn enter(frame: RenderFrame) -> RenderFrameGuard {
    let frame = Rc::new(frame);
    FRAME_STACK.with(|stack| {
        stack.borrow_mut().push(Rc::clone(&frame));
    });
    RenderFrameGuard { frame }
}

/// Runs `f` against the innermost render frame.
///
/// # Panics
/// Panics, naming `hook`, when no function component is rendering.
pub(crate) fn with_frame<R>(hook: &'static str, f: impl FnOnce(&RenderFrame) -> R) -> R {
    let frame = FRAME_STACK.with(|stack| stack.borrow().last().cloned());
    match frame {
        Some(frame) => f(&frame),
        None => panic!("{hook} must be called while a function component is rendering"),
    }
}

/// Whether a function component is currently rendering on this thread.
pub fn is_rendering() -> bool {
    FRAME_STACK.with(|stack| !stack.borrow().is_empty())
}
