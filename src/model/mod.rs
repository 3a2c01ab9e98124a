//! Benchmark entities: one model per strategy, each with observable `X`, `Y`
//! and `Z` properties, behind the shared [`TestModel`] interface.

#[macro_use]
mod macros;

use crate::notify::{Bindable, CachedNotifier, StackedNotifier, StandardNotifier};

/// Name notified when `X` changes.
pub const PROPERTY_X: &str = "X";
/// Name notified when `Y` changes.
pub const PROPERTY_Y: &str = "Y";
/// Name notified when `Z` changes.
pub const PROPERTY_Z: &str = "Z";

/// The observation interface the benchmark driver works against.
///
/// Models are default-constructible with every property at zero.
pub trait TestModel: Bindable + Default + 'static {
    /// Display name used in reports.
    const NAME: &'static str;

    /// Current `X`.
    fn x(&self) -> i32;
    /// Sets `X`, notifying on change. Returns whether the value changed.
    fn set_x(&self, value: i32) -> bool;
    /// Current `Y`.
    fn y(&self) -> i32;
    /// Sets `Y`, notifying on change. Returns whether the value changed.
    fn set_y(&self, value: i32) -> bool;
    /// Current `Z`.
    fn z(&self) -> i32;
    /// Sets `Z`, notifying on change. Returns whether the value changed.
    fn set_z(&self, value: i32) -> bool;
}

test_model! {
    /// Model notified through [`StandardNotifier`].
    pub struct StandardTestModel uses StandardNotifier = StandardNotifier::new();
}

test_model! {
    /// Model notified through [`CachedNotifier`] and the global record cache.
    pub struct CachedTestModel uses CachedNotifier = CachedNotifier::new();
}

test_model! {
    /// Model notified through a per-instance [`StackedNotifier`].
    pub struct StackedTestModel uses StackedNotifier = StackedNotifier::new();
}

test_model! {
    /// Model notified through a [`StackedNotifier`] using the thread's stack.
    pub struct ThreadStackedTestModel uses StackedNotifier = StackedNotifier::per_thread();
}

/// Reacts to one notification the way the benchmark observer does: `X`
/// drives `Y = X + 1` and `Y` drives `Z = Y + 1`.
///
/// Returns `false` if the relation that must hold when `name` is notified is
/// violated (`Y == X + 1` for `Y`, `Z == Y + 1` for `Z`).
pub fn chain_step<M: TestModel>(model: &M, name: &str) -> bool {
    tracing::trace!(
        model = M::NAME,
        property = name,
        x = model.x(),
        y = model.y(),
        z = model.z(),
        "chain step"
    );
    match name {
        PROPERTY_X => {
            model.set_y(model.x().wrapping_add(1));
            true
        }
        PROPERTY_Y => {
            let holds = model.y() == model.x().wrapping_add(1);
            model.set_z(model.y().wrapping_add(1));
            holds
        }
        PROPERTY_Z => model.z() == model.y().wrapping_add(1),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChangeRecord;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn assert_zeroed<M: TestModel>() {
        let model = M::default();
        assert_eq!((model.x(), model.y(), model.z()), (0, 0, 0));
        assert_eq!(model.observer_count(), 0);
    }

    #[test]
    fn test_models_start_zeroed() {
        assert_zeroed::<StandardTestModel>();
        assert_zeroed::<CachedTestModel>();
        assert_zeroed::<StackedTestModel>();
        assert_zeroed::<ThreadStackedTestModel>();
    }

    #[test]
    fn test_model_names() {
        assert_eq!(StandardTestModel::NAME, "StandardTestModel");
        assert_eq!(CachedTestModel::NAME, "CachedTestModel");
        assert_eq!(StackedTestModel::NAME, "StackedTestModel");
        assert_eq!(ThreadStackedTestModel::NAME, "ThreadStackedTestModel");
    }

    #[test]
    fn test_chain_step_propagates() {
        let model = StackedTestModel::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        model.subscribe(move |sender: &StackedTestModel, record: &dyn ChangeRecord| {
            let name = record.property_name();
            assert!(chain_step(sender, name));
            log.borrow_mut().push(name.to_owned());
        });

        assert!(model.set_x(1));
        assert_eq!((model.x(), model.y(), model.z()), (1, 2, 3));
        // Innermost callbacks finish first.
        assert_eq!(*seen.borrow(), ["Z", "Y", "X"]);
    }

    #[test]
    fn test_chain_step_detects_broken_relation() {
        let model = StandardTestModel::default();
        model.set_x(5);
        model.set_y(1);
        assert!(!chain_step(&model, PROPERTY_Y));
        assert_eq!(model.z(), 2);
        assert!(chain_step(&model, PROPERTY_Z));
        assert!(chain_step(&model, "W"));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_chain_step_traces_each_notification() {
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(log.clone())
            .finish();

        let model = StandardTestModel::default();
        model.subscribe(|sender: &StandardTestModel, record: &dyn ChangeRecord| {
            chain_step(sender, record.property_name());
        });
        tracing::subscriber::with_default(subscriber, || {
            model.set_x(1);
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let steps: Vec<&str> = output.lines().filter(|l| l.contains("chain step")).collect();
        assert_eq!(steps.len(), 3, "{output}");
        assert!(steps[0].contains("x=1 y=0 z=0"), "{output}");
        assert!(steps[2].contains("x=1 y=2 z=3"), "{output}");
        assert!(steps.iter().all(|l| l.contains("StandardTestModel")));
    }

    #[test]
    fn test_debug_lists_properties() {
        let model = CachedTestModel::default();
        model.set_z(9);
        let rendered = format!("{model:?}");
        assert!(rendered.starts_with("CachedTestModel { x: 0, y: 0, z: 9"));
    }
}
